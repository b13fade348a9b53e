// Result classification
// Turns raw phase results and captured error chains into normalized outcomes

pub mod chain;
pub mod classifier;
pub mod types;

pub use chain::{detail_lines, Cause, Chain, ErrorKind, Frame, RaisedError};
pub use classifier::{classify, classify_collection, Phase, PhaseReport};
pub use types::{Failure, FailureKind, Outcome};

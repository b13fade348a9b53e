// Report synthesis
// Renders marker-delimited feedback blocks and the final grade line

pub mod sink;
pub mod synthesizer;

pub use sink::{ReportSink, WriterSink};
pub use synthesizer::{ReportSynthesizer, CLOSE_MARKER, GRADE_TAG, OPEN_MARKER};

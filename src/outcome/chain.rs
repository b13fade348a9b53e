//! Captured error chains and the pure functions that reduce them to a
//! pointer at the learner's faulty line.
//!
//! A runner hands over the error that escaped a test together with the error
//! that caused it, recursively. Extraction always goes to the root cause and
//! then to the deepest frame of that root cause, so framework frames on the
//! outer errors never reach the report.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Prefixes that mark the interesting lines of a rendered traceback entry:
/// the failing source line (`>`) and the error explanation (`E`).
const DETAIL_PREFIXES: [char; 2] = ['>', 'E'];

/// Whether an error came from a checked condition or escaped unexpectedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A checked condition did not hold.
    Assertion,
    /// Any other error propagated out of the test.
    #[default]
    Raised,
}

/// One stack frame of a captured error. Frames are ordered outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Source file as reported by the runner (may include directories).
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// An error raised while running or collecting a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaisedError {
    /// Assertion or unexpected error.
    #[serde(default)]
    pub kind: ErrorKind,
    /// Stringified error.
    pub message: String,
    /// Traceback frames, outermost first.
    #[serde(default)]
    pub frames: Vec<Frame>,
    /// Rendered traceback lines for this error, as the runner printed them.
    #[serde(default)]
    pub repr_lines: Vec<String>,
    /// The error this one was raised from.
    #[serde(default)]
    pub cause: Option<Box<RaisedError>>,
}

impl RaisedError {
    /// Creates an assertion error with the given message.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Assertion, message)
    }

    /// Creates a non-assertion error with the given message.
    pub fn raised(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Raised, message)
    }

    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            frames: Vec::new(),
            repr_lines: Vec::new(),
            cause: None,
        }
    }

    /// Appends a frame below the existing ones.
    pub fn with_frame(mut self, file: impl Into<String>, line: u32) -> Self {
        self.frames.push(Frame::new(file, line));
        self
    }

    /// Sets the rendered traceback lines.
    pub fn with_repr_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repr_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Records the error this one was raised from.
    pub fn caused_by(mut self, cause: RaisedError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Iterates the chain from this error down to its root cause.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// The deepest error in the chain.
    pub fn root_cause(&self) -> &RaisedError {
        let mut current = self;
        while let Some(cause) = current.cause.as_deref() {
            current = cause;
        }
        current
    }

    /// The deepest frame of this error's own traceback.
    pub fn innermost_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

/// Iterator over an error chain, outermost error first.
pub struct Chain<'a> {
    next: Option<&'a RaisedError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a RaisedError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause.as_deref();
        Some(current)
    }
}

/// Learner-facing pointer to the line that actually failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// File name without directories.
    pub file: String,
    /// Line of the deepest frame of the root cause.
    pub line: u32,
    /// Stringified root cause.
    pub message: String,
}

impl Cause {
    /// Extracts the root cause and its deepest frame.
    ///
    /// Returns `None` when the root cause carries no frames, since there is
    /// then nothing to point the learner at.
    pub fn from_error(error: &RaisedError) -> Option<Self> {
        let root = error.root_cause();
        let frame = root.innermost_frame()?;
        Some(Self {
            file: file_name(&frame.file),
            line: frame.line,
            message: root.message.clone(),
        })
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

/// Collects the assertion and diff lines of the whole chain, root cause
/// first, each prefixed for display.
pub fn detail_lines(error: &RaisedError) -> Vec<String> {
    let chain: Vec<&RaisedError> = error.chain().collect();
    chain
        .iter()
        .rev()
        .flat_map(|e| e.repr_lines.iter())
        .filter(|line| line.starts_with(DETAIL_PREFIXES))
        .map(|line| format!("> {}", line))
        .collect()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

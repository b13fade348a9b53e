//! Runner event logs and their replay through a [`Session`].
//!
//! A runner that lives in another process records its callbacks as JSON
//! lines, one event per line, tagged by `"event"`:
//!
//! ```text
//! {"event": "discovered", "node": {"kind": "test", "node_id": "t.py::test_a", "original_name": "test_a"}, "weight": 2}
//! {"event": "collection_finished"}
//! {"event": "completed", "test": {...}, "phase": "call", "report": {"status": "passed"}, "suggestions": []}
//! {"event": "session_finished"}
//! ```
//!
//! [`replay`] feeds the events to a session and writes both reports to a
//! [`ReportSink`]. Logs cut short by a crashed runner still produce a
//! complete report.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EventLogError;
use crate::outcome::{Phase, PhaseReport};
use crate::report::ReportSink;
use crate::scoring::{GradeFormatter, SessionGrade};
use crate::session::{CollectedNode, CollectionFailure, Session, Suggestions, TestIdentity};

/// One runner callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Discovered {
        node: CollectedNode,
        #[serde(default)]
        weight: Option<u32>,
    },
    CollectionFailed {
        failure: CollectionFailure,
    },
    CollectionFinished,
    Completed {
        test: TestIdentity,
        phase: Phase,
        report: PhaseReport,
        #[serde(default)]
        suggestions: Vec<String>,
    },
    Interrupted,
    SessionFinished,
}

/// Parsed event log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    pub events: Vec<SessionEvent>,
}

impl EventLog {
    /// Loads a JSON-lines event log from disk.
    pub fn from_path(path: &Path) -> Result<Self, EventLogError> {
        let content = fs::read_to_string(path).map_err(|source| EventLogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses JSON lines, skipping blank lines.
    pub fn parse(content: &str) -> Result<Self, EventLogError> {
        let mut events = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event = serde_json::from_str(line).map_err(|source| EventLogError::Malformed {
                line: index + 1,
                source,
            })?;
            events.push(event);
        }
        debug!(events = events.len(), "Parsed event log");
        Ok(Self { events })
    }

    /// Serializes the log back to JSON lines.
    pub fn to_json_lines(&self) -> Result<String, EventLogError> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl IntoIterator for EventLog {
    type Item = SessionEvent;
    type IntoIter = std::vec::IntoIter<SessionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Drives `session` through `events`, writing reports to `sink`.
///
/// The pre-run report is written at `collection_finished`, or before the
/// first completed test when the runner never sent that event. The post-run
/// report is written at `session_finished`, or at the end of the log.
/// Events after `session_finished` are ignored.
pub fn replay<I, S>(
    session: &mut Session,
    events: I,
    sink: &mut S,
    formatter: Option<&dyn GradeFormatter>,
) -> io::Result<SessionGrade>
where
    I: IntoIterator<Item = SessionEvent>,
    S: ReportSink + ?Sized,
{
    let mut collection_reported = false;
    let mut finished = false;

    for event in events {
        if finished {
            warn!(?event, "Ignoring event after session end");
            continue;
        }
        match event {
            SessionEvent::Discovered { node, weight } => session.on_node_discovered(node, weight),
            SessionEvent::CollectionFailed { failure } => session.on_collection_failed(failure),
            SessionEvent::CollectionFinished => {
                if !collection_reported {
                    sink.write_lines(&session.on_collection_finish())?;
                    collection_reported = true;
                }
            }
            SessionEvent::Completed {
                test,
                phase,
                report,
                suggestions,
            } => {
                if !collection_reported {
                    sink.write_lines(&session.on_collection_finish())?;
                    collection_reported = true;
                }
                session.on_test_completed(test, phase, report, Suggestions::from(suggestions));
            }
            SessionEvent::Interrupted => session.on_interrupt(),
            SessionEvent::SessionFinished => {
                if !collection_reported {
                    sink.write_lines(&session.on_collection_finish())?;
                    collection_reported = true;
                }
                sink.write_lines(&session.on_session_end(formatter))?;
                finished = true;
            }
        }
    }

    if !finished {
        warn!("Event log ended without session_finished; reporting partial results");
        if !collection_reported {
            sink.write_lines(&session.on_collection_finish())?;
        }
        sink.write_lines(&session.on_session_end(formatter))?;
    }

    Ok(session.grade())
}

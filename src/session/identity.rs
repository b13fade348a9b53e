//! Identity of discovered tests and resolution of their displayed description.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::TemplateError;

/// Identity of one test variant, fixed at discovery time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestIdentity {
    /// Unique id of the executed node (e.g. `test_sum.py::test_add[1-2]`).
    pub node_id: String,
    /// Bare test name, without parameterization.
    pub original_name: String,
    /// Family shared by all variants; defaults to `original_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Doc text of the test, optionally a `{name}` template over `parameters`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameters of this variant.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
}

impl TestIdentity {
    /// Creates an unparameterized test whose family is its own name.
    pub fn new(node_id: impl Into<String>, original_name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            original_name: original_name.into(),
            family: None,
            description: None,
            parameters: BTreeMap::new(),
        }
    }

    /// Sets the family id.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Sets the doc text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a parameter of this variant.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// The family this variant is graded with.
    pub fn family(&self) -> &str {
        self.family.as_deref().unwrap_or(&self.original_name)
    }

    /// The label shown to the learner.
    ///
    /// Uses the trimmed doc text, expanded against the parameters when the
    /// test is parameterized, and falls back to the bare test name. A
    /// template that cannot be expanded is shown unexpanded.
    pub fn resolve_description(&self) -> String {
        let Some(doc) = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|doc| !doc.is_empty())
        else {
            return self.original_name.clone();
        };

        if self.parameters.is_empty() {
            return doc.to_string();
        }

        match expand_template(doc, &self.parameters) {
            Ok(expanded) => expanded,
            Err(e) => {
                warn!(node_id = %self.node_id, "Keeping unexpanded description: {}", e);
                doc.to_string()
            }
        }
    }
}

/// A node reported by the runner's discovery phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectedNode {
    /// A runnable test variant.
    Test(TestIdentity),
    /// A structural grouping node (module, class); never graded.
    Container { name: String },
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}|[{}]")
            .expect("placeholder pattern is valid")
    })
}

/// Expands `{name}` placeholders from `parameters`. `{{` and `}}` produce
/// literal braces.
pub fn expand_template(
    template: &str,
    parameters: &BTreeMap<String, Value>,
) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        rendered.push_str(&template[last..whole.start()]);
        match (whole.as_str(), caps.get(1)) {
            ("{{", _) => rendered.push('{'),
            ("}}", _) => rendered.push('}'),
            (_, Some(name)) => {
                let value = parameters
                    .get(name.as_str())
                    .ok_or_else(|| TemplateError::UnknownParameter(name.as_str().to_string()))?;
                rendered.push_str(&display_value(value));
            }
            (brace, None) => {
                return Err(TemplateError::UnbalancedBrace {
                    brace: brace.chars().next().unwrap_or('{'),
                    offset: whole.start(),
                });
            }
        }
        last = whole.end();
    }

    rendered.push_str(&template[last..]);
    Ok(rendered)
}

/// Renders a parameter the way learners see it in their own test code:
/// `True`/`False`/`None`, `[1, 2]`, quoted strings inside containers.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => literal(other),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.contains('\'') && !s.contains('"') => format!("\"{}\"", s),
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("'{}': {}", key, literal(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kinds of parameter a task can ask its assignee to fill in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ParameterKind {
    Number,
    Text,
    DateTime,
    Dropdown {
        #[serde(default)]
        options: Vec<String>,
    },
    Boolean,
    Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameter {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
}

impl ParameterKind {
    /// Whether `value` is an acceptable submission for this kind.
    /// `null` is handled by [`TaskParameter::accepts`].
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Number, Value::Number(_)) => true,
            (Self::Text | Self::Comment, Value::String(_)) => true,
            (Self::DateTime, Value::String(raw)) => DateTime::parse_from_rfc3339(raw).is_ok(),
            (Self::Dropdown { options }, Value::String(choice)) => options.contains(choice),
            (Self::Boolean, Value::Bool(_)) => true,
            _ => false,
        }
    }
}

impl TaskParameter {
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return !self.required;
        }
        self.kind.accepts(value)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload produced by a backend.
///
/// Text, sequences and mappings are the shapes that downstream synthesis
/// merges specially; anything else travels as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelOutput {
    Text(String),
    Sequence(Vec<Value>),
    Mapping(Map<String, Value>),
    Other(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Text,
    Sequence,
    Mapping,
    Other,
}

impl ModelOutput {
    pub fn text(s: impl Into<String>) -> Self {
        ModelOutput::Text(s.into())
    }

    pub fn kind(&self) -> OutputKind {
        match self {
            ModelOutput::Text(_) => OutputKind::Text,
            ModelOutput::Sequence(_) => OutputKind::Sequence,
            ModelOutput::Mapping(_) => OutputKind::Mapping,
            ModelOutput::Other(_) => OutputKind::Other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ModelOutput::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ModelOutput::Other(Value::Null))
    }

    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    pub fn into_value(self) -> Value {
        match self {
            ModelOutput::Text(s) => Value::String(s),
            ModelOutput::Sequence(items) => Value::Array(items),
            ModelOutput::Mapping(map) => Value::Object(map),
            ModelOutput::Other(value) => value,
        }
    }
}

impl Default for ModelOutput {
    fn default() -> Self {
        ModelOutput::Other(Value::Null)
    }
}

impl From<Value> for ModelOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ModelOutput::Text(s),
            Value::Array(items) => ModelOutput::Sequence(items),
            Value::Object(map) => ModelOutput::Mapping(map),
            other => ModelOutput::Other(other),
        }
    }
}

impl From<ModelOutput> for Value {
    fn from(output: ModelOutput) -> Self {
        output.into_value()
    }
}

impl From<String> for ModelOutput {
    fn from(s: String) -> Self {
        ModelOutput::Text(s)
    }
}

impl From<&str> for ModelOutput {
    fn from(s: &str) -> Self {
        ModelOutput::Text(s.to_string())
    }
}

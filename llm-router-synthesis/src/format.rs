use llm_router_core::{ModelOutput, OutputFormat};
use serde_json::Value;

use crate::error::{Result, SynthesisError};

/// Substrings that mark a text payload as source code.
pub const CODE_INDICATORS: &[&str] = &[
    "```", "fn ", "function ", "def ", "class ", "import ", "#include", "=>", "};", "();",
];

const OPENERS: &[char] = &['{', '[', '('];
const CLOSERS: &[char] = &['}', ']', ')'];

pub fn looks_like_code(text: &str) -> bool {
    CODE_INDICATORS.iter().any(|indicator| text.contains(indicator))
}

fn is_nested_value(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => items.iter().any(Value::is_object),
        _ => false,
    }
}

/// Output holds objects inside a mapping or a sequence.
pub fn is_nested(output: &ModelOutput) -> bool {
    match output {
        ModelOutput::Mapping(map) => map.values().any(is_nested_value),
        ModelOutput::Sequence(items) => items.iter().any(Value::is_object),
        ModelOutput::Text(_) | ModelOutput::Other(_) => false,
    }
}

pub fn infer_format(output: &ModelOutput) -> OutputFormat {
    match output {
        ModelOutput::Text(text) if looks_like_code(text) => OutputFormat::Code,
        ModelOutput::Text(_) => OutputFormat::Text,
        ModelOutput::Mapping(_) | ModelOutput::Sequence(_) if is_nested(output) => OutputFormat::Structured,
        _ => OutputFormat::Json,
    }
}

/// Picks the format to render `output` in. A requested `Structured` format
/// falls back to `Json` when the output is flat.
pub fn resolve_format(output: &ModelOutput, preferred: Option<OutputFormat>) -> OutputFormat {
    match preferred {
        Some(OutputFormat::Structured) if !is_nested(output) => OutputFormat::Json,
        Some(format) => format,
        None => infer_format(output),
    }
}

/// Reshapes `output` for `format`.
pub fn reshape(output: &ModelOutput, format: OutputFormat, indent_width: usize) -> Result<ModelOutput> {
    match format {
        OutputFormat::Code => match output {
            ModelOutput::Text(code) => Ok(ModelOutput::Text(indent_code(code, indent_width))),
            _ => Err(SynthesisError::Format {
                format,
                reason: "code format needs text output".to_string(),
            }),
        },
        OutputFormat::Json => match output {
            ModelOutput::Text(text) => serde_json::from_str::<Value>(text)
                .map(ModelOutput::from)
                .map_err(|e| SynthesisError::Format {
                    format,
                    reason: e.to_string(),
                }),
            other => Ok(other.clone()),
        },
        OutputFormat::Structured | OutputFormat::Text => Ok(normalize_output(output)),
    }
}

/// Re-indents code by tracking bracket depth line by line. Fence lines are
/// left at column zero.
pub fn indent_code(code: &str, indent_width: usize) -> String {
    let mut level: usize = 0;
    let mut lines = Vec::new();

    for raw in code.lines() {
        let line = raw.trim();
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }
        if line.starts_with("```") {
            lines.push(line.to_string());
            continue;
        }

        let leading_close = line.starts_with(CLOSERS);
        if leading_close {
            level = level.saturating_sub(1);
        }
        lines.push(format!("{}{}", " ".repeat(level * indent_width), line));

        let opens = line.chars().filter(|c| OPENERS.contains(c)).count();
        let mut closes = line.chars().filter(|c| CLOSERS.contains(c)).count();
        if leading_close {
            closes -= 1;
        }
        level = (level + opens).saturating_sub(closes);
    }

    lines.join("\n")
}

pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_text(s)),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), normalize_value(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn normalize_output(output: &ModelOutput) -> ModelOutput {
    match output {
        ModelOutput::Text(text) => ModelOutput::Text(normalize_text(text)),
        ModelOutput::Sequence(items) => ModelOutput::Sequence(items.iter().map(normalize_value).collect()),
        ModelOutput::Mapping(map) => ModelOutput::Mapping(
            map.iter()
                .map(|(key, value)| (key.clone(), normalize_value(value)))
                .collect(),
        ),
        ModelOutput::Other(value) => ModelOutput::Other(normalize_value(value)),
    }
}

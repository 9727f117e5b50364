//! Structural validation of the raw configuration document.
//!
//! Only shape is checked here: required fields, field types and the closed
//! set of metric kinds. Anything that needs to look at more than one value
//! at a time (uniqueness, bucket ordering) belongs to [`crate::builder`].

use std::fmt;

use serde_json::{Map, Value};

/// Metric kinds accepted in the `type` field.
pub const KINDS: [&str; 3] = ["counter", "gauge", "histogram"];

const ROOT_FIELDS: &[&str] = &["metrics"];
const METRIC_FIELDS: &[&str] = &["name", "type", "labels", "help", "buckets"];

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location in the document, e.g. `$.metrics[0].type`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors produced by [`validate`].
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    /// The bytes are not a well-formed JSON document.
    #[error("config is not well-formed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The document is JSON but does not match the schema. Never empty.
    #[error("config does not match the metrics schema:\n{}", list(.0))]
    Invalid(Vec<Violation>),
}

fn list(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("- {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A document that passed [`validate`]. Only this module can construct one,
/// so the builder never sees unchecked input.
#[derive(Debug, Clone)]
pub struct ValidatedDocument(Value);

impl ValidatedDocument {
    pub(crate) fn into_value(self) -> Value {
        self.0
    }
}

/// Parses `raw` and checks it against the metrics schema.
///
/// Every violation in the document is collected before returning, in
/// document order.
pub fn validate(raw: &[u8]) -> Result<ValidatedDocument, SchemaError> {
    let value: Value = serde_json::from_slice(raw)?;
    let mut violations = Vec::new();
    check_root(&value, &mut violations);

    if violations.is_empty() {
        Ok(ValidatedDocument(value))
    } else {
        Err(SchemaError::Invalid(violations))
    }
}

fn check_root(value: &Value, out: &mut Vec<Violation>) {
    let Some(root) = expect_object(value, "$", out) else {
        return;
    };
    unknown_fields(root, ROOT_FIELDS, "$", out);

    match root.get("metrics") {
        None => out.push(violation("$", "missing required field `metrics`")),
        Some(Value::Array(entries)) => {
            for (i, entry) in entries.iter().enumerate() {
                check_metric(entry, &format!("$.metrics[{i}]"), out);
            }
        }
        Some(other) => out.push(mismatch("$.metrics", "an array", other)),
    }
}

fn check_metric(value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(entry) = expect_object(value, path, out) else {
        return;
    };
    unknown_fields(entry, METRIC_FIELDS, path, out);

    match entry.get("name") {
        None => out.push(violation(path, "missing required field `name`")),
        Some(Value::String(_)) => {}
        Some(other) => out.push(mismatch(&format!("{path}.name"), "a string", other)),
    }

    let kind_path = format!("{path}.type");
    match entry.get("type") {
        None => out.push(violation(path, "missing required field `type`")),
        Some(Value::String(kind)) if KINDS.contains(&kind.as_str()) => {}
        Some(Value::String(kind)) => out.push(violation(
            &kind_path,
            format!("\"{kind}\" is not one of {}", KINDS.join(", ")),
        )),
        Some(other) => out.push(mismatch(&kind_path, "a string", other)),
    }

    if let Some(help) = entry.get("help") {
        if !help.is_string() {
            out.push(mismatch(&format!("{path}.help"), "a string", help));
        }
    }

    if let Some(labels) = entry.get("labels") {
        check_array(labels, &format!("{path}.labels"), "a string", Value::is_string, out);
    }

    if let Some(buckets) = entry.get("buckets") {
        check_array(buckets, &format!("{path}.buckets"), "a number", Value::is_number, out);
    }
}

fn check_array(
    value: &Value,
    path: &str,
    element: &str,
    accepts: fn(&Value) -> bool,
    out: &mut Vec<Violation>,
) {
    let Value::Array(items) = value else {
        out.push(mismatch(path, "an array", value));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        if !accepts(item) {
            out.push(mismatch(&format!("{path}[{i}]"), element, item));
        }
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            out.push(mismatch(path, "an object", other));
            None
        }
    }
}

fn unknown_fields(map: &Map<String, Value>, known: &[&str], path: &str, out: &mut Vec<Violation>) {
    for key in map.keys() {
        if !known.contains(&key.as_str()) {
            out.push(violation(&format!("{path}.{key}"), "unknown field"));
        }
    }
}

fn violation(path: &str, message: impl Into<String>) -> Violation {
    Violation {
        path: path.to_string(),
        message: message.into(),
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> Violation {
    violation(path, format!("expected {expected}, found {}", type_name(found)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

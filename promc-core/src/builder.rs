//! Turns a schema-valid document into a [`MetricSetDocument`].
//!
//! Checks run per metric in document order and stop at the first failure.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::ident::{self, normalize};
use crate::model::{MetricKind, MetricSetDocument, MetricSpec};
use crate::schema::ValidatedDocument;

/// Label reserved for histogram bucket bounds.
pub const BUCKET_LABEL: &str = "le";

/// Semantic errors produced by [`build`]. Each one names the metric at fault.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to decode validated config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid package name `{package}`: {reason}")]
    InvalidPackage {
        package: String,
        reason: &'static str,
    },
    #[error("invalid metric name `{metric}`: {reason}")]
    InvalidName {
        metric: String,
        reason: &'static str,
    },
    #[error("duplicate metric name `{metric}`")]
    DuplicateMetric { metric: String },
    #[error("metric `{metric}`: invalid label `{label}`: {reason}")]
    InvalidLabel {
        metric: String,
        label: String,
        reason: &'static str,
    },
    #[error("metric `{metric}`: duplicate label `{label}`")]
    DuplicateLabel { metric: String, label: String },
    #[error("metric `{metric}`: histogram requires a non-empty `buckets` list")]
    MissingBuckets { metric: String },
    #[error("metric `{metric}`: `buckets` is only allowed on histograms, not on a {kind}")]
    UnexpectedBuckets { metric: String, kind: &'static str },
    #[error(
        "metric `{metric}`: buckets must be strictly increasing, found {previous} before {value} at index {index}"
    )]
    UnorderedBuckets {
        metric: String,
        index: usize,
        previous: f64,
        value: f64,
    },
    #[error("metric `{metric}`: `{first}` and `{second}` both normalize to `{ident}`")]
    IdentifierCollision {
        metric: String,
        first: String,
        second: String,
        ident: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Deserialize)]
struct RawMetric {
    name: String,
    #[serde(rename = "type")]
    kind: RawKind,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    help: String,
    buckets: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawDocument {
    metrics: Vec<RawMetric>,
}

/// Builds the metric set from `document`, namespaced under `package`.
///
/// Metrics keep their document order. Besides per-metric checks, the
/// normalized identifier of every metric must be unique across the set
/// because all generated items share one module.
pub fn build(document: ValidatedDocument, package: &str) -> Result<MetricSetDocument, BuildError> {
    check_package(package)?;

    let raw: RawDocument = serde_json::from_value(document.into_value())?;
    let mut metrics = Vec::with_capacity(raw.metrics.len());
    let mut names: HashSet<String> = HashSet::with_capacity(raw.metrics.len());
    // normalized identifier -> raw metric name that produced it
    let mut idents: HashMap<String, String> = HashMap::new();

    for entry in raw.metrics {
        let spec = build_metric(entry)?;

        if !names.insert(spec.name.clone()) {
            return Err(BuildError::DuplicateMetric { metric: spec.name });
        }
        let ident = normalize(&spec.name);
        if let Some(first) = idents.get(&ident) {
            return Err(BuildError::IdentifierCollision {
                metric: spec.name.clone(),
                first: first.clone(),
                second: spec.name,
                ident,
            });
        }
        idents.insert(ident, spec.name.clone());
        metrics.push(spec);
    }

    debug!(package, metrics = metrics.len(), "built metric set");
    Ok(MetricSetDocument::new(package.to_string(), metrics))
}

fn build_metric(raw: RawMetric) -> Result<MetricSpec, BuildError> {
    let RawMetric {
        name,
        kind,
        labels,
        help,
        buckets,
    } = raw;

    if let Some(reason) = name_reason(&name) {
        return Err(BuildError::InvalidName { metric: name, reason });
    }

    let kind = match (kind, buckets) {
        (RawKind::Histogram, Some(buckets)) if !buckets.is_empty() => {
            check_buckets(&name, &buckets)?;
            MetricKind::Histogram { buckets }
        }
        (RawKind::Histogram, _) => return Err(BuildError::MissingBuckets { metric: name }),
        (RawKind::Counter, Some(b)) if !b.is_empty() => {
            return Err(BuildError::UnexpectedBuckets { metric: name, kind: "counter" });
        }
        (RawKind::Gauge, Some(b)) if !b.is_empty() => {
            return Err(BuildError::UnexpectedBuckets { metric: name, kind: "gauge" });
        }
        (RawKind::Counter, _) => MetricKind::Counter,
        (RawKind::Gauge, _) => MetricKind::Gauge,
    };

    check_labels(&name, &kind, &labels)?;

    Ok(MetricSpec {
        name,
        kind,
        labels,
        help,
    })
}

fn name_reason(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Some("must not be empty"),
        Some(c) if c.is_ascii_digit() => return Some("must not start with a digit"),
        Some(_) => {}
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Some("must contain only lowercase letters, digits and underscores");
    }
    ident::unusable_reason(&normalize(name))
}

fn check_buckets(metric: &str, buckets: &[f64]) -> Result<(), BuildError> {
    for (index, pair) in buckets.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(BuildError::UnorderedBuckets {
                metric: metric.to_string(),
                index: index + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    Ok(())
}

fn check_labels(metric: &str, kind: &MetricKind, labels: &[String]) -> Result<(), BuildError> {
    // normalized field name -> label key that produced it
    let mut fields: HashMap<String, &str> = HashMap::new();

    for label in labels {
        if let Some(reason) = label_reason(label, kind) {
            return Err(BuildError::InvalidLabel {
                metric: metric.to_string(),
                label: label.clone(),
                reason,
            });
        }
        if fields.values().any(|seen| *seen == label.as_str()) {
            return Err(BuildError::DuplicateLabel {
                metric: metric.to_string(),
                label: label.clone(),
            });
        }
        let field = normalize(label);
        if let Some(first) = fields.get(&field) {
            return Err(BuildError::IdentifierCollision {
                metric: metric.to_string(),
                first: first.to_string(),
                second: label.clone(),
                ident: field,
            });
        }
        fields.insert(field, label);
    }
    Ok(())
}

fn label_reason(label: &str, kind: &MetricKind) -> Option<&'static str> {
    match label.chars().next() {
        None => return Some("must not be empty"),
        Some(c) if c.is_ascii_digit() => return Some("must not start with a digit"),
        Some(_) => {}
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("must contain only letters, digits and underscores");
    }
    if label.starts_with("__") {
        return Some("names starting with `__` are reserved");
    }
    if label == BUCKET_LABEL && matches!(kind, MetricKind::Histogram { .. }) {
        return Some("`le` is reserved for histogram bucket bounds");
    }
    ident::unusable_reason(&normalize(label))
}

fn check_package(package: &str) -> Result<(), BuildError> {
    let reason = match package.chars().next() {
        None => Some("must not be empty"),
        Some(c) if !(c.is_ascii_lowercase() || c == '_') => {
            Some("must start with a lowercase letter or underscore")
        }
        Some(_) if !package
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') =>
        {
            Some("must contain only lowercase letters, digits and underscores")
        }
        Some(_) if ident::is_keyword(package) => Some("is a Rust keyword"),
        Some(_) => None,
    };
    match reason {
        Some(reason) => Err(BuildError::InvalidPackage {
            package: package.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

//! In-memory representation of a validated metric set.

use std::fmt;

/// What a metric measures. Buckets only exist on histograms, so a bucket
/// list attached to any other kind cannot be represented past the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    Counter,
    Gauge,
    /// Upper bounds, strictly increasing and never empty.
    Histogram { buckets: Vec<f64> },
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram { .. } => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The accessor surface a metric gets, one variant per kind and label
/// presence combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Counter,
    LabeledCounter,
    Gauge,
    LabeledGauge,
    Histogram,
    LabeledHistogram,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Counter,
        Shape::LabeledCounter,
        Shape::Gauge,
        Shape::LabeledGauge,
        Shape::Histogram,
        Shape::LabeledHistogram,
    ];

    pub fn is_labeled(self) -> bool {
        matches!(
            self,
            Shape::LabeledCounter | Shape::LabeledGauge | Shape::LabeledHistogram
        )
    }

    /// Verb prefixed to the metric identifier to name its accessor.
    pub fn verb(self) -> &'static str {
        match self {
            Shape::Counter | Shape::LabeledCounter => "Inc",
            Shape::Gauge | Shape::LabeledGauge => "Set",
            Shape::Histogram | Shape::LabeledHistogram => "Observe",
        }
    }
}

/// One declared metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub name: String,
    pub kind: MetricKind,
    /// Label keys in declared order.
    pub labels: Vec<String>,
    /// Free text, empty when the config omits it.
    pub help: String,
}

impl MetricSpec {
    pub fn shape(&self) -> Shape {
        let labeled = !self.labels.is_empty();
        match (&self.kind, labeled) {
            (MetricKind::Counter, false) => Shape::Counter,
            (MetricKind::Counter, true) => Shape::LabeledCounter,
            (MetricKind::Gauge, false) => Shape::Gauge,
            (MetricKind::Gauge, true) => Shape::LabeledGauge,
            (MetricKind::Histogram { .. }, false) => Shape::Histogram,
            (MetricKind::Histogram { .. }, true) => Shape::LabeledHistogram,
        }
    }

    pub fn buckets(&self) -> Option<&[f64]> {
        match &self.kind {
            MetricKind::Histogram { buckets } => Some(buckets),
            _ => None,
        }
    }
}

/// The whole generation unit. Built once by [`crate::builder::build`] and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSetDocument {
    package: String,
    metrics: Vec<MetricSpec>,
}

impl MetricSetDocument {
    pub(crate) fn new(package: String, metrics: Vec<MetricSpec>) -> Self {
        Self { package, metrics }
    }

    /// Namespace the generated code is declared under.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Metrics in document order.
    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: MetricKind, labels: &[&str]) -> MetricSpec {
        MetricSpec {
            name: "m".to_string(),
            kind,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            help: String::new(),
        }
    }

    #[test]
    fn test_shape_covers_every_combination() {
        let hist = || MetricKind::Histogram { buckets: vec![1.0] };
        let shapes = [
            spec(MetricKind::Counter, &[]).shape(),
            spec(MetricKind::Counter, &["a"]).shape(),
            spec(MetricKind::Gauge, &[]).shape(),
            spec(MetricKind::Gauge, &["a"]).shape(),
            spec(hist(), &[]).shape(),
            spec(hist(), &["a"]).shape(),
        ];
        assert_eq!(shapes, Shape::ALL);
    }

    #[test]
    fn test_verbs() {
        assert_eq!(Shape::Counter.verb(), "Inc");
        assert_eq!(Shape::LabeledGauge.verb(), "Set");
        assert_eq!(Shape::LabeledHistogram.verb(), "Observe");
        assert!(Shape::LabeledGauge.is_labeled());
        assert!(!Shape::Histogram.is_labeled());
    }

    #[test]
    fn test_buckets_only_on_histograms() {
        assert_eq!(spec(MetricKind::Gauge, &[]).buckets(), None);
        let h = spec(MetricKind::Histogram { buckets: vec![0.5, 1.0] }, &[]);
        assert_eq!(h.buckets(), Some(&[0.5, 1.0][..]));
    }
}

//! Core of the promc metrics generator.
//!
//! A config document flows through three steps before any code is emitted:
//!
//! 1. [`schema::validate`] checks the document's structure and reports every
//!    violation at once.
//! 2. [`builder::build`] decodes it into a [`MetricSetDocument`] and enforces
//!    the semantic rules (unique names and labels, histogram buckets,
//!    identifier collisions).
//! 3. [`ident::normalize`] derives the CamelCase identifiers the emitter uses.
//!
//! ```
//! use promc_core::{builder, schema, Shape};
//!
//! let raw = br#"{"metrics":[{"name":"http_requests_total","type":"counter","labels":["method"]}]}"#;
//! let document = builder::build(schema::validate(raw)?, "metrics")?;
//!
//! assert_eq!(document.metrics()[0].shape(), Shape::LabeledCounter);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod ident;
pub mod model;
pub mod schema;

pub use builder::{BuildError, build};
pub use model::{MetricKind, MetricSetDocument, MetricSpec, Shape};
pub use schema::{SchemaError, ValidatedDocument, Violation, validate};

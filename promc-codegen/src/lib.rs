//! Source generation for the promc metrics generator.
//!
//! [`render`] turns a [`promc_core::MetricSetDocument`] into a formatted
//! Rust module targeting the `prometheus` crate. [`build_info`] renders the
//! companion module carrying the generator's own version.
//!
//! ```
//! use promc_core::{build, validate};
//!
//! let raw = br#"{"metrics":[{"name":"jobs_total","type":"counter","help":"Jobs run"}]}"#;
//! let document = build(validate(raw)?, "metrics")?;
//! let source = promc_codegen::render(&document)?;
//!
//! assert!(source.contains("pub fn IncJobsTotal(&self)"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod build_info;
pub mod canonical;
pub mod emit;

pub use canonical::{MalformedSource, canonicalize};
pub use emit::{emit, render};

/// First line of every generated file.
pub const BANNER: &str = "// Code generated by promc; DO NOT EDIT.\n";

//! # promc
//!
//! Generates Rust accessors for Prometheus metrics from a JSON config.
//!
//! ```json
//! {
//!   "metrics": [
//!     { "name": "http_requests_total", "type": "counter",
//!       "labels": ["method", "status"], "help": "HTTP requests served" },
//!     { "name": "request_duration_seconds", "type": "histogram",
//!       "labels": ["method"], "buckets": [0.05, 0.1, 0.5, 1.0] },
//!     { "name": "uptime_seconds", "type": "gauge" }
//!   ]
//! }
//! ```
//!
//! Running `promc -c metrics.json -o src/metrics.rs -p metrics` writes a
//! module that the host program uses like this:
//!
//! ```text
//! let registry = prometheus::Registry::new();
//! let m = metrics::register(&registry)?;
//!
//! m.IncHttpRequestsTotal(metrics::HttpRequestsTotalLabels { Method: "GET", Status: "200" });
//! m.ObserveRequestDurationSeconds(metrics::RequestDurationSecondsLabels { Method: "GET" }, 0.042);
//! m.SetUptimeSeconds(12.0);
//! ```
//!
//! Generation is all-or-nothing: a config that fails validation produces no
//! output, and the destination file is only replaced once the whole module
//! has been rendered.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use promc_codegen::MalformedSource;
use promc_core::{BuildError, SchemaError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[doc(hidden)]
pub use promc_codegen as codegen;

#[doc(hidden)]
pub use promc_core as core;

/// Errors produced while generating a metrics module.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The config file could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The config does not match the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The config is structurally fine but semantically invalid.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The generator produced source that does not parse.
    #[error("internal generator error, please report it: {0}")]
    Internal(#[from] MalformedSource),
    /// The output file could not be written.
    #[error("failed to write output file {path:?}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Runs the whole pipeline over `config` in memory and returns the formatted
/// module, namespaced under `package`.
pub fn generate(config: &[u8], package: &str) -> Result<String, Error> {
    let validated = promc_core::validate(config)?;
    debug!("config matches schema");
    let document = promc_core::build(validated, package)?;
    Ok(promc_codegen::render(&document)?)
}

/// Reads `config`, generates the module and replaces `output` with it.
///
/// Nothing is written unless generation succeeds, and the replacement is
/// atomic: `output` holds either its previous contents or the complete new
/// module.
pub fn run(config: &Path, output: &Path, package: &str) -> Result<(), Error> {
    let raw = fs::read(config).map_err(|source| Error::ReadConfig {
        path: config.to_path_buf(),
        source,
    })?;
    let source = generate(&raw, package)?;
    write_atomically(output, source.as_bytes()).map_err(|source| Error::WriteOutput {
        path: output.to_path_buf(),
        source,
    })?;
    info!(output = %output.display(), package, "wrote metrics module");
    Ok(())
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

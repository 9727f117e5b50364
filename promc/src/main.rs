use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

mod version {
    include!(concat!(env!("OUT_DIR"), "/version.rs"));
}

/// Generates Prometheus metric accessors from a JSON metrics config.
#[derive(Parser)]
#[command(name = "promc", version = version::VERSION, about, long_about = None)]
struct Args {
    /// path to the JSON metrics config
    #[arg(short, long)]
    config: PathBuf,
    /// path of the Rust source file to write
    #[arg(short, long)]
    output: PathBuf,
    /// module the generated code is declared in
    #[arg(short, long)]
    package: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish()
        .init();

    let args = Args::parse();
    debug!(
        version = version::VERSION,
        commit = version::COMMIT,
        "starting promc"
    );

    match promc::run(&args.config, &args.output, &args.package) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

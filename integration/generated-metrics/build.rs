use std::path::PathBuf;
use std::{env, fs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let config = manifest_dir.join("metrics.json");
    println!("cargo:rerun-if-changed={}", config.display());

    promc::run(&config, &out_dir.join("metrics.rs"), "metrics")?;
    Ok(())
}

use std::path::PathBuf;
use std::{env, fs};

use promc_codegen::build_info::{self, BuildInfo};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let head = manifest_dir.join("../.git/HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
    println!("cargo:rerun-if-changed=build.rs");

    let info = BuildInfo::from_git(&manifest_dir);
    fs::write(out_dir.join("version.rs"), build_info::render(&info)?)?;
    Ok(())
}

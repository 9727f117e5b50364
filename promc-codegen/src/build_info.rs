//! The generator's own build identity, rendered as a tiny generated module.

use std::path::Path;
use std::process::Command;

use quote::quote;

use crate::BANNER;
use crate::canonical::{MalformedSource, canonicalize};

/// Placeholder for anything git could not tell us.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Most recent tag reachable from `HEAD`.
    pub version: String,
    /// Full hash of `HEAD`.
    pub commit: String,
}

impl BuildInfo {
    /// Asks git about the repository containing `dir`. Either value falls back
    /// to [`UNKNOWN`] when git is missing or the directory is not a checkout.
    pub fn from_git(dir: &Path) -> Self {
        Self {
            version: git(dir, &["describe", "--tags", "--abbrev=0"]),
            commit: git(dir, &["rev-parse", "HEAD"]),
        }
    }
}

fn git(dir: &Path, args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|out| out.trim().to_string())
        .filter(|out| !out.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn emit(info: &BuildInfo) -> String {
    let BuildInfo { version, commit } = info;
    quote! {
        /// Source-control tag the generator was built from.
        pub const VERSION: &str = #version;
        /// Commit the generator was built from.
        pub const COMMIT: &str = #commit;
    }
    .to_string()
}

pub fn render(info: &BuildInfo) -> Result<String, MalformedSource> {
    Ok(format!("{BANNER}\n{}", canonicalize(&emit(info))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let info = BuildInfo {
            version: "v1.2.0".to_string(),
            commit: "0123abcd".to_string(),
        };
        let out = render(&info).unwrap();
        assert!(out.starts_with(BANNER));
        assert!(out.contains("pub const VERSION: &str = \"v1.2.0\";"));
        assert!(out.contains("pub const COMMIT: &str = \"0123abcd\";"));
    }

    #[test]
    fn test_escapes_values() {
        let info = BuildInfo {
            version: "v\"1".to_string(),
            commit: UNKNOWN.to_string(),
        };
        let out = render(&info).unwrap();
        assert!(out.contains(r#"pub const VERSION: &str = "v\"1";"#));
    }

    #[test]
    fn test_from_git_outside_checkout() {
        let dir = std::env::temp_dir().join("promc-build-info-no-git");
        std::fs::create_dir_all(&dir).unwrap();
        let info = BuildInfo::from_git(&dir);
        assert!(!info.version.is_empty());
        assert!(!info.commit.is_empty());
    }
}

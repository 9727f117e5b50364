//! Deterministic formatting of emitted source.

/// Emitted text that does not parse as a Rust file. This is always a bug in
/// the generator, never a problem with the user's config.
#[derive(thiserror::Error, Debug)]
#[error("generated source is malformed at {line}:{column}: {message}")]
pub struct MalformedSource {
    /// 1-based line in `source`.
    pub line: usize,
    /// 0-based column in `source`.
    pub column: usize,
    pub message: String,
    /// The text that failed to parse.
    pub text: String,
}

/// Parses `raw` as a Rust file and pretty-prints it.
///
/// Only presentation changes; items come out in the order they went in. The
/// printed text is parsed again so a printer defect aborts instead of
/// producing a file that does not compile.
pub fn canonicalize(raw: &str) -> Result<String, MalformedSource> {
    let file = parse(raw)?;
    let pretty = prettyplease::unparse(&file);
    parse(&pretty)?;
    Ok(pretty)
}

fn parse(text: &str) -> Result<syn::File, MalformedSource> {
    syn::parse_file(text).map_err(|err| {
        let start = err.span().start();
        MalformedSource {
            line: start.line,
            column: start.column,
            message: err.to_string(),
            text: text.to_string(),
        }
    })
}

//! Maps snake_case tokens from the config onto CamelCase identifiers.
//!
//! Casing is plain ASCII so the result never depends on the locale of the
//! machine running the generator.

/// Word separator inside metric names and label keys.
pub const SEPARATOR: char = '_';

/// Converts `token` into a CamelCase identifier.
///
/// Each underscore-delimited segment gets its first character upper-cased and
/// the rest lower-cased, then the segments are concatenated. Empty segments
/// (leading, trailing or doubled underscores) contribute nothing, so distinct
/// tokens can normalize to the same identifier; callers must check for that.
///
/// ```
/// use promc_core::ident::normalize;
///
/// assert_eq!(normalize("http_requests_total"), "HttpRequestsTotal");
/// assert_eq!(normalize("HTTP_status"), "HttpStatus");
/// ```
pub fn normalize(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for segment in token.split(SEPARATOR) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars.map(|c| c.to_ascii_lowercase()));
        }
    }
    out
}

/// Why a normalized identifier cannot be emitted as a Rust identifier.
pub fn unusable_reason(ident: &str) -> Option<&'static str> {
    match ident.chars().next() {
        None => Some("normalizes to an empty identifier"),
        Some(c) if !c.is_ascii_alphabetic() => {
            Some("normalizes to an identifier not starting with a letter")
        }
        Some(_) if ident == "Self" => Some("normalizes to the reserved identifier `Self`"),
        Some(_) => None,
    }
}

// Strict, reserved and weak keywords that cannot name a module.
const KEYWORDS: &[&str] = &[
    "_", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Reports whether `word` is a Rust keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

//! LaTeX markup for listings.
//!
//! Free text (title, description, complexity) is escaped. Code goes inside
//! an `lstlisting` environment verbatim; the only markup it receives is the
//! `@...@` escape-to-LaTeX wrapper around hash prefixes and custom type names.

use crate::normalizer::HASH_LEN;

/// Short type aliases used throughout the library sources.
pub const CUSTOM_TYPES: &[&str] = &[
    "ll", "ull", "ld", "i64", "u64", "p64", "pii", "pll", "v64", "vll", "vi", "vii", "vvi",
];

pub const BEGIN_LISTING: &str = "\\begin{lstlisting}";
pub const END_LISTING: &str = "\\end{lstlisting}";

/// Escape LaTeX special characters in free text.
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '^' => out.push_str("\\^{}"),
            '_' => out.push_str("\\_"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Wrap every identifier that is exactly one of [`CUSTOM_TYPES`] in `\typ`.
pub fn inject_type_markup(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if is_ident_char(c) {
            let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
            let token = &rest[..end];
            if CUSTOM_TYPES.contains(&token) {
                out.push_str("@\\typ{");
                out.push_str(token);
                out.push_str("}@");
            } else {
                out.push_str(token);
            }
            rest = &rest[end..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

pub fn hash_prefix(hash: &str) -> String {
    format!("@\\hashprefix{{{} }}@", hash)
}

/// Prefix for comment lines inside an open block, as wide as a real one.
pub fn blank_hash_prefix() -> String {
    format!("@\\hashprefix{{{}}}@", " ".repeat(HASH_LEN + 1))
}

pub fn section(title: &str, file_hash: &str) -> String {
    format!("\\codesection{{{}}}{{{}}}", title, file_hash)
}

pub fn description(text: &str) -> String {
    format!("\\codedesc{{{}}}", text)
}

pub fn complexity(text: &str) -> String {
    format!("\\complexity{{{}}}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("a_b & 50% $x$ #1"), "a\\_b \\& 50\\% \\$x\\$ \\#1");
        assert_eq!(escape_latex("x^2 ~ {y}"), "x\\^{}2 \\textasciitilde{} \\{y\\}");
    }

    #[test]
    fn test_escape_backslash_is_not_reescaped() {
        assert_eq!(escape_latex("a\\b"), "a\\textbackslash{}b");
    }

    #[test]
    fn test_inject_type_markup() {
        assert_eq!(
            inject_type_markup("ll f(vll& v, int all) {"),
            "@\\typ{ll}@ f(@\\typ{vll}@& v, int all) {"
        );
    }

    #[test]
    fn test_inject_type_markup_exact_tokens_only() {
        assert_eq!(inject_type_markup("ll_x xll 1ll"), "ll_x xll 1ll");
        assert_eq!(inject_type_markup("vector<vi> ä vii"), "vector<@\\typ{vi}@> ä @\\typ{vii}@");
    }

    #[test]
    fn test_prefixes_have_equal_width_content() {
        assert_eq!(hash_prefix("abc"), "@\\hashprefix{abc }@");
        assert_eq!(blank_hash_prefix(), "@\\hashprefix{    }@");
    }

    #[test]
    fn test_directives() {
        assert_eq!(section("DSU", "1f2"), "\\codesection{DSU}{1f2}");
        assert_eq!(description("d"), "\\codedesc{d}");
        assert_eq!(complexity("O(1)"), "\\complexity{O(1)}");
    }
}

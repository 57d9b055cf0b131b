use std::collections::BTreeSet;

/// Header flag that suppresses the listing entirely.
pub const NO_PRINT: &str = "noprint";

/// Header flag that disables per-region hash prefixes.
pub const NO_HASH: &str = "nohash";

/// Line-comment marker that introduces header lines.
pub const LINE_COMMENT: &str = "//";

const COMPLEXITY_MARKER: &str = "complexity:";

/// Metadata read from the leading comment block of a source file.
///
/// The header looks like this:
///
/// ```text
/// // Segment Tree [nohash]
/// //
/// // Point update, range query over a monoid.
/// //
/// // complexity: O(log N) per op, O(N) memory
/// ```
///
/// Parsing never fails: a missing or malformed header degrades to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMetadata {
    /// Listing title, the file stem when the header has none
    pub name: String,
    /// Tokens from the bracketed list on the title line
    pub flags: BTreeSet<String>,
    /// Remaining non-empty header lines joined with single spaces
    pub description: String,
    /// Text after the last `complexity:` line
    pub complexity: String,
}

impl HeaderMetadata {
    /// Parse the header from a file's lines. `stem` is used as the name
    /// when the header does not provide one.
    pub fn parse<S: AsRef<str>>(lines: &[S], stem: &str) -> Self {
        let header_lines: Vec<&str> = lines
            .iter()
            .map(|line| line.as_ref().trim())
            .take_while(|line| line.starts_with(LINE_COMMENT))
            .map(|line| line[LINE_COMMENT.len()..].trim())
            .collect();

        let mut header = HeaderMetadata {
            name: stem.to_string(),
            ..Default::default()
        };

        let Some((title, rest)) = header_lines.split_first() else {
            return header;
        };

        let (name, flags) = split_title(title);
        if !name.is_empty() {
            header.name = name.to_string();
        }
        header.flags = flags;

        let mut description = Vec::new();
        for line in rest {
            if let Some(complexity) = strip_complexity_marker(line) {
                header.complexity = complexity.trim().to_string();
            } else if !line.is_empty() {
                description.push(*line);
            }
        }
        header.description = description.join(" ");

        header
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_noprint(&self) -> bool {
        self.has_flag(NO_PRINT)
    }

    pub fn is_nohash(&self) -> bool {
        self.has_flag(NO_HASH)
    }
}

/// Split `Name [a, b]` into the name and its flags. A line without a
/// trailing bracketed list is all name.
fn split_title(title: &str) -> (&str, BTreeSet<String>) {
    match title.find('[') {
        Some(idx) if title.ends_with(']') => {
            let flags = title[idx + 1..title.len() - 1]
                .split(',')
                .map(str::trim)
                .filter(|flag| !flag.is_empty())
                .map(str::to_string)
                .collect();
            (title[..idx].trim(), flags)
        }
        _ => (title.trim(), BTreeSet::new()),
    }
}

fn strip_complexity_marker(line: &str) -> Option<&str> {
    let prefix = line.get(..COMPLEXITY_MARKER.len())?;
    if prefix.eq_ignore_ascii_case(COMPLEXITY_MARKER) {
        Some(&line[COMPLEXITY_MARKER.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_header() {
        let lines = [
            "// Disjoint Set Union (Union-Find)",
            "//",
            "// Supports find with path compression",
            "// and union by size.",
            "//",
            "// complexity: O(alpha(N)) amortized per op, O(N)",
            "",
            "struct dsu {",
        ];
        let header = HeaderMetadata::parse(&lines, "dsu");

        assert_eq!(header.name, "Disjoint Set Union (Union-Find)");
        assert!(header.flags.is_empty());
        assert_eq!(
            header.description,
            "Supports find with path compression and union by size."
        );
        assert_eq!(header.complexity, "O(alpha(N)) amortized per op, O(N)");
    }

    #[test]
    fn test_flags() {
        let header = HeaderMetadata::parse(&["// Foo [noprint, , nohash ]"], "foo");
        assert_eq!(header.name, "Foo");
        assert!(header.is_noprint());
        assert!(header.is_nohash());
        assert_eq!(header.flags.len(), 2);
    }

    #[test]
    fn test_brackets_not_at_end_are_part_of_name() {
        let header =
            HeaderMetadata::parse(&["// Quadratic Field Extension (Z_p[sqrt(D)])"], "quad");
        assert_eq!(header.name, "Quadratic Field Extension (Z_p[sqrt(D)])");
        assert!(header.flags.is_empty());
    }

    #[test]
    fn test_no_header_defaults_to_stem() {
        let header = HeaderMetadata::parse(&["int main() {}", "// late comment"], "main");
        assert_eq!(header.name, "main");
        assert!(header.flags.is_empty());
        assert!(header.description.is_empty());
        assert!(header.complexity.is_empty());
    }

    #[test]
    fn test_empty_title_defaults_to_stem() {
        let header = HeaderMetadata::parse(&["//", "// something"], "stem");
        assert_eq!(header.name, "stem");
        assert_eq!(header.description, "something");
    }

    #[test]
    fn test_blank_line_ends_header() {
        let lines = ["// Title", "", "// not part of the header"];
        let header = HeaderMetadata::parse(&lines, "x");
        assert!(header.description.is_empty());
    }

    #[test]
    fn test_complexity_is_case_insensitive_and_last_wins() {
        let lines = ["// T", "// Complexity: O(N)", "// COMPLEXITY:   O(1) "];
        let header = HeaderMetadata::parse(&lines, "t");
        assert_eq!(header.complexity, "O(1)");
        assert!(header.description.is_empty());
    }

    #[test]
    fn test_unknown_flags_are_kept_but_inert() {
        let header = HeaderMetadata::parse(&["// Foo [shiny]"], "foo");
        assert!(header.has_flag("shiny"));
        assert!(!header.is_noprint());
        assert!(!header.is_nohash());
    }
}

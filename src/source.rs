use crate::header::{HeaderMetadata, LINE_COMMENT};
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One line of the code body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// Zero-based index within the code body
    pub index: usize,
    pub text: String,
    /// Blank, or starts with `//` or `/*`
    pub is_comment: bool,
}

/// A source file split into header metadata and code body.
///
/// Immutable once read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    header: HeaderMetadata,
    code: Vec<CodeLine>,
}

impl SourceFile {
    /// Read and split a file from disk.
    ///
    /// # Errors
    ///
    /// Returns `File not found: <path>` if the file does not exist, or the
    /// underlying I/O error otherwise.
    pub async fn read(path: &Path) -> Result<Self> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                anyhow::bail!("File not found: {}", path.display())
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        Ok(Self::from_text(path, text))
    }

    /// Build a source file from text already in memory.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();

        let lines: Vec<&str> = text.lines().collect();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let header = HeaderMetadata::parse(&lines, stem);
        let code = code_body(&lines);

        Self {
            path,
            text,
            header,
            code,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw file contents
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn header(&self) -> &HeaderMetadata {
        &self.header
    }

    pub fn code(&self) -> &[CodeLine] {
        &self.code
    }

    /// The name of the file including its extension
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Code body lines joined with `\n`, no trailing newline
    pub fn code_text(&self) -> String {
        self.code
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Blank, or a line or block comment.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(LINE_COMMENT) || trimmed.starts_with("/*")
}

/// Drop the leading run of blank and `//` lines; everything after the first
/// other line is the code body.
fn code_body(lines: &[&str]) -> Vec<CodeLine> {
    lines
        .iter()
        .skip_while(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || trimmed.starts_with(LINE_COMMENT)
        })
        .enumerate()
        .map(|(index, text)| CodeLine {
            index,
            text: text.to_string(),
            is_comment: is_comment_line(text),
        })
        .collect()
}

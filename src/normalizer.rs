use crate::config::{ListingConfig, PreprocessorConfig};
use anyhow::{Context, Result};
use md5::{Digest, Md5};
use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Number of hex characters kept from the digest.
pub const HASH_LEN: usize = 3;

/// Lines starting with this marker only matter to the raw source and are
/// dropped before hashing.
pub const DIRECTIVE_MARKER: &str = "#w";

/// An external C-family preprocessor.
///
/// Text goes in on stdin, the expanded text comes back on stdout.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessorConfig,
}

impl fmt::Display for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config.program)
    }
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self { config }
    }

    /// Run the preprocessor over `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The executable cannot be found or spawned
    /// - Writing stdin or collecting output fails
    /// - The process exits unsuccessfully
    pub async fn run(&self, input: &str) -> Result<String> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to execute preprocessor '{}'\nArgs: {:?}",
                    self.config.program, self.config.args
                )
            })?;

        // Feed stdin from its own task so a full stdout pipe cannot stall the write.
        let mut stdin = child
            .stdin
            .take()
            .context("Preprocessor stdin was not captured")?;
        let input = input.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for preprocessor '{}'", self))?;

        // A preprocessor may exit before consuming all input; its exit status decides.
        if let Ok(Err(e)) = writer.await {
            log::trace!("{}: stdin write ended early: {}", self, e);
        }

        if !output.status.success() {
            anyhow::bail!("Preprocessor '{}' exited with {}", self, output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Normalizes code text for hashing.
///
/// Directive lines are removed, the remainder is expanded by the first
/// preprocessor in the chain that succeeds, and all whitespace is dropped.
/// When every preprocessor fails the filtered text is hashed as is, so a
/// missing toolchain only weakens hash fidelity.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    chain: Vec<Preprocessor>,
}

impl Normalizer {
    pub fn new(chain: Vec<Preprocessor>) -> Self {
        Self { chain }
    }

    pub fn from_config(config: &ListingConfig) -> Self {
        Self::new(
            config
                .preprocessors
                .iter()
                .cloned()
                .map(Preprocessor::new)
                .collect(),
        )
    }

    /// A normalizer with no preprocessors: only directive removal and
    /// whitespace compaction apply.
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Run the fallback chain over `text`, returning the first success or
    /// `text` itself.
    pub async fn expand(&self, text: &str) -> String {
        for preprocessor in &self.chain {
            match preprocessor.run(text).await {
                Ok(out) => return out,
                Err(e) => log::debug!("Preprocessor '{}' failed: {:#}", preprocessor, e),
            }
        }
        text.to_string()
    }

    /// Hash input for `text`: directives removed, macros expanded,
    /// whitespace stripped.
    pub async fn normalize(&self, text: &str) -> String {
        let filtered = strip_directives(text);
        let expanded = self.expand(&filtered).await;
        compact(&expanded)
    }

    /// Short digest of the normalized form of `text`.
    pub async fn hash(&self, text: &str) -> String {
        short_digest(&self.normalize(text).await)
    }
}

/// Remove directive lines, rejoining the rest with a trailing newline.
pub fn strip_directives(text: &str) -> String {
    let mut filtered = text
        .lines()
        .filter(|line| !line.starts_with(DIRECTIVE_MARKER))
        .collect::<Vec<_>>()
        .join("\n");
    filtered.push('\n');
    filtered
}

pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// First `HASH_LEN` hex characters of the MD5 of `text`.
pub fn short_digest(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(HASH_LEN);
    hex
}

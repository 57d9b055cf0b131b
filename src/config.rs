use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Configuration for the listing generator.
///
/// Usually deserialized from a TOML file passed with `--config`. Every field
/// has a default, so an empty file (or no file at all) yields a working
/// configuration that tries `clang` and then `cpp` for normalization.
///
/// # Example
///
/// ```toml
/// print_all = false
/// check_embedded_hash = true
/// jobs = 4
///
/// [[preprocessors]]
/// program = "${LLVM_HOME}/bin/clang"
/// args = ["-E", "-x", "c++", "-dD", "-P", "-"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Render files flagged `noprint` anyway
    pub print_all: bool,

    /// Warn when a file's content hash is not written anywhere in the file
    pub check_embedded_hash: bool,

    /// Maximum number of files rendered concurrently (defaults to the CPU count)
    pub jobs: Option<usize>,

    /// External preprocessors, tried in order until one succeeds
    pub preprocessors: Vec<PreprocessorConfig>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            print_all: false,
            check_embedded_hash: false,
            jobs: None,
            preprocessors: default_preprocessors(),
        }
    }
}

/// One external preprocessor invocation.
///
/// The program receives the text on stdin and must write the expanded text
/// to stdout. Both fields support `${VAR}` environment variable expansion.
///
/// # Security
///
/// Program paths are validated to prevent command injection. Paths cannot
/// contain shell metacharacters or use parent directory traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Executable name or path
    pub program: String,

    /// Arguments passed before stdin is read
    #[serde(default)]
    pub args: Vec<String>,
}

impl PreprocessorConfig {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Validate the configuration for security and correctness
    pub fn validate(&self) -> Result<()> {
        if self.program.is_empty() {
            anyhow::bail!("Preprocessor program cannot be empty");
        }

        let dangerous_chars = [';', '|', '&', '`', '\n', '\r'];
        for ch in dangerous_chars {
            if self.program.contains(ch) {
                anyhow::bail!(
                    "Preprocessor program contains invalid character '{}': {}",
                    ch.escape_default(),
                    self.program
                );
            }
        }

        let program_path = Path::new(&self.program);
        for component in program_path.components() {
            if matches!(component, std::path::Component::ParentDir) {
                anyhow::bail!("Preprocessor program cannot contain '..': {}", self.program);
            }
        }

        Ok(())
    }
}

/// `clang` first, plain `cpp` as the fallback.
fn default_preprocessors() -> Vec<PreprocessorConfig> {
    vec![
        PreprocessorConfig::new("clang", &["-E", "-x", "c++", "-dD", "-P", "-"]),
        PreprocessorConfig::new("cpp", &["-dD", "-P", "-fpreprocessed", "-"]),
    ]
}

impl ListingConfig {
    /// Load configuration from a TOML file, or the defaults when `path` is `None`.
    ///
    /// Environment variables are expanded and every preprocessor is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };

        Ok(config)
    }

    /// Parse configuration from TOML text, expanding and validating it
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: ListingConfig = toml::from_str(content)?;

        for (i, preprocessor) in config.preprocessors.iter_mut().enumerate() {
            preprocessor.program = expand_env_vars(&preprocessor.program);
            for arg in preprocessor.args.iter_mut() {
                *arg = expand_env_vars(arg);
            }

            preprocessor
                .validate()
                .with_context(|| format!("Invalid configuration for preprocessor #{}", i))?;
        }

        if config.jobs == Some(0) {
            anyhow::bail!("jobs must be at least 1");
        }

        Ok(config)
    }

    /// Concurrency bound for batch rendering
    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Expand environment variables in a string
/// Supports ${VAR_NAME} syntax
/// This function processes the string in a single pass to avoid re-processing expanded values
fn expand_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_name = String::new();
            let mut found_close = false;

            for ch in chars.by_ref() {
                if ch == '}' {
                    found_close = true;
                    break;
                }
                var_name.push(ch);
            }

            if found_close {
                match env::var(&var_name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        log::warn!(
                            "Environment variable '{}' not found, leaving unexpanded",
                            var_name
                        );
                        result.push_str("${");
                        result.push_str(&var_name);
                        result.push('}');
                    }
                }
            } else {
                // No closing brace found, treat as literal
                result.push_str("${");
                result.push_str(&var_name);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

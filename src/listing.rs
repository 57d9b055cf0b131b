use crate::config::ListingConfig;
use crate::markup;
use crate::normalizer::Normalizer;
use crate::region::{scan_regions, HashSlot};
use crate::source::SourceFile;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

/// Per-call rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingOptions {
    /// Title to use instead of the header name
    pub custom_title: Option<String>,
    /// Emit per-region hash prefixes; forced off by the `nohash` flag
    pub show_hash: bool,
    /// Emit the description and complexity directives
    pub show_description: bool,
    /// Extra material outside the library; never checked for an embedded hash
    pub appendix: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            custom_title: None,
            show_hash: true,
            show_description: true,
            appendix: false,
        }
    }
}

impl ListingOptions {
    /// Options for appendix-style files, titled by their file name.
    pub fn appendix(path: &Path) -> Self {
        Self {
            custom_title: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            appendix: true,
            ..Self::default()
        }
    }
}

/// Turns annotated source files into LaTeX listings.
///
/// # Overview
///
/// For each file the generator parses the header, drops the file entirely
/// when it is flagged `noprint`, hashes the code body, and emits the
/// listing. Every code line gets the hash of the brace-balanced region
/// ending on it, so an edit anywhere inside a block changes the hash shown
/// on the block's closing line.
///
/// # Example
///
/// ```no_run
/// use code_listing::{ListingConfig, ListingGenerator, ListingOptions};
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let generator = ListingGenerator::new(&ListingConfig::default());
/// let tex = generator
///     .render_file(Path::new("src/structures/dsu.cpp"), &ListingOptions::default())
///     .await?;
/// print!("{}", tex);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ListingGenerator {
    normalizer: Normalizer,
    print_all: bool,
    check_embedded_hash: bool,
    jobs: usize,
}

impl ListingGenerator {
    pub fn new(config: &ListingConfig) -> Self {
        Self::with_normalizer(config, Normalizer::from_config(config))
    }

    /// Use `normalizer` instead of the chain named in `config`.
    pub fn with_normalizer(config: &ListingConfig, normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            print_all: config.print_all,
            check_embedded_hash: config.check_embedded_hash,
            jobs: config.jobs(),
        }
    }

    /// Read `path` and render it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable. Everything
    /// after reading recovers on its own.
    pub async fn render_file(&self, path: &Path, options: &ListingOptions) -> Result<String> {
        let source = SourceFile::read(path).await?;
        Ok(self.render(&source, options).await)
    }

    /// Render an already-read source file. Returns an empty string for
    /// `noprint` files unless `print_all` is set.
    pub async fn render(&self, source: &SourceFile, options: &ListingOptions) -> String {
        let header = source.header();

        if header.is_noprint() && !self.print_all {
            log::info!("Skipping {} (noprint)", source.path().display());
            return String::new();
        }

        let show_hash = options.show_hash && !header.is_nohash();

        let title = options.custom_title.as_deref().unwrap_or(&header.name);
        let file_hash = self.normalizer.hash(&source.code_text()).await;

        if self.checks_embedded_hash(source, options) && !source.text().contains(&file_hash) {
            log::warn!(
                "Hash {} not found in {}",
                file_hash,
                source.path().display()
            );
        }

        let mut output = vec![markup::section(&markup::escape_latex(title), &file_hash)];

        if options.show_description && !header.description.is_empty() {
            output.push(markup::description(&markup::escape_latex(
                &header.description,
            )));
        }

        if options.show_description && !header.complexity.is_empty() {
            output.push(markup::complexity(&markup::escape_latex(
                &header.complexity,
            )));
        }

        output.push(markup::BEGIN_LISTING.to_string());

        let code = source.code();
        for region in scan_regions(code) {
            let line = &code[region.index];
            let body = if line.is_comment {
                line.text.clone()
            } else {
                markup::inject_type_markup(&line.text)
            };

            let prefix = match region.slot {
                _ if !show_hash => String::new(),
                HashSlot::None => String::new(),
                HashSlot::Placeholder => markup::blank_hash_prefix(),
                HashSlot::Region { start, end } => {
                    let hash = self.normalizer.hash(&region_text(source, start, end)).await;
                    markup::hash_prefix(&hash)
                }
            };

            output.push(format!("{}{}", prefix, body));
        }

        output.push(markup::END_LISTING.to_string());
        output.push(String::new());

        log::debug!(
            "Rendered {} ({} code lines)",
            source.path().display(),
            code.len()
        );

        output.join("\n")
    }

    /// Whether `source` must carry its own file hash somewhere in its text.
    fn checks_embedded_hash(&self, source: &SourceFile, options: &ListingOptions) -> bool {
        self.check_embedded_hash && !options.appendix && !source.header().is_nohash()
    }

    /// Render several files, at most `jobs` at a time. Results come back in
    /// the order of `paths`; one file failing does not stop the others.
    pub async fn render_batch(
        &self,
        paths: &[PathBuf],
        options: &ListingOptions,
    ) -> Vec<(PathBuf, Result<String>)> {
        stream::iter(paths)
            .map(|path| async move {
                let result = self.render_file(path, options).await;
                (path.clone(), result)
            })
            .buffered(self.jobs)
            .collect::<Vec<_>>()
            .await
    }
}

/// Lines `start..=end` of the code body, newline-terminated.
fn region_text(source: &SourceFile, start: usize, end: usize) -> String {
    let mut text = source.code()[start..=end]
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    text.push('\n');
    text
}

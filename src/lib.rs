//! code-listing library
//!
//! Turns annotated C++ source files into LaTeX code listings with
//! per-region integrity hashes. The primary interface is the `code-listing`
//! binary, but the library can be driven directly by document build scripts.
//!
//! ## Public API
//!
//! The main entry point is [`ListingGenerator`], configured by
//! [`ListingConfig`] and called with [`ListingOptions`].
//!
//! Building blocks:
//! - [`HeaderMetadata`] - Title, flags, description and complexity from a file header
//! - [`SourceFile`] - A file split into header and code body
//! - [`Normalizer`] - Preprocessor fallback chain and short hashes
//! - [`scan_regions`] - Brace-balanced hash regions per line

mod config;
mod header;
mod listing;
mod markup;
mod normalizer;
mod region;
mod reporting;
mod source;

pub use config::{ListingConfig, PreprocessorConfig};
pub use header::{HeaderMetadata, NO_HASH, NO_PRINT};
pub use listing::{ListingGenerator, ListingOptions};
pub use markup::{escape_latex, inject_type_markup, CUSTOM_TYPES};
pub use normalizer::{short_digest, Normalizer, Preprocessor, HASH_LEN};
pub use region::{scan_regions, HashSlot, LineRegion};
pub use reporting::{print_summary, report_failures, BatchSummary};
pub use source::{is_comment_line, CodeLine, SourceFile};

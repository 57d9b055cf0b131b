//! Common test utilities for integration tests
//!
//! This module contains shared test fixtures and helper functions used across
//! integration tests. These utilities are not compiled into the library.

#![allow(dead_code)]

use anyhow::Result;
use code_listing::{ListingConfig, ListingGenerator, Normalizer};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test fixture with automatic cleanup
///
/// Creates a temporary copy of a fixture library, so tests can edit files
/// and run in parallel without interfering with each other.
pub struct TestFixture {
    _dir: TempDir,
    root: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture from the default library directory
    pub fn new() -> Result<Self> {
        Self::new_from("tests/fixtures/library")
    }

    /// Create a new test fixture from a specific source directory
    pub fn new_from(source: impl AsRef<Path>) -> Result<Self> {
        let dir = TempDir::new()?;
        copy_dir_all(source.as_ref(), dir.path())?;

        Ok(Self {
            root: dir.path().to_path_buf(),
            _dir: dir,
        })
    }

    /// Path of a file relative to the fixture root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write (or overwrite) a file in the fixture
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Generator that never spawns a preprocessor, so results do not depend on
/// the toolchain installed on the test machine.
pub fn passthrough_generator(config: &ListingConfig) -> ListingGenerator {
    ListingGenerator::with_normalizer(config, Normalizer::passthrough())
}

/// The hash prefix on the listing line whose code part is exactly `code`
pub fn prefix_of<'a>(listing: &'a str, code: &str) -> Option<&'a str> {
    listing.lines().find_map(|line| {
        let rest = line.strip_prefix("@\\hashprefix{")?;
        let (hash, tail) = rest.split_once("}@")?;
        (tail == code).then_some(hash)
    })
}

/// Recursively copy all files and directories from src to dst
fn copy_dir_all(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(&dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        if ty.is_dir() {
            copy_dir_all(entry.path(), dst.as_ref().join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.as_ref().join(entry.file_name()))?;
        }
    }
    Ok(())
}

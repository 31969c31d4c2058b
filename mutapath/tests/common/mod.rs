//! Common test utilities for integration tests.
//!
//! This module provides a scratch directory fixture with helpers for
//! creating files and asserting on their contents.

use std::fs;
use std::path::{Path, PathBuf};

use mutapath::ImmutablePath;
use tempfile::TempDir;

/// A temporary directory that is removed when dropped.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Creates an empty scratch directory.
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// The root of the scratch directory.
    #[allow(dead_code)]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The absolute path of `relative` inside the scratch directory.
    #[allow(dead_code)]
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes `content` to `relative`, creating parent directories.
    #[allow(dead_code)]
    pub fn file(&self, relative: &str, content: &str) -> ImmutablePath {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        ImmutablePath::new(path)
    }

    /// Creates the directory `relative`.
    #[allow(dead_code)]
    pub fn dir(&self, relative: &str) -> ImmutablePath {
        let path = self.join(relative);
        fs::create_dir_all(&path).unwrap();
        ImmutablePath::new(path)
    }

    /// Reads the file at `relative`.
    #[allow(dead_code)]
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.join(relative)).unwrap()
    }

    /// Whether anything exists at `relative`.
    #[allow(dead_code)]
    pub fn exists(&self, relative: &str) -> bool {
        self.join(relative).exists()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extension ignored when no configuration says otherwise (Finder metadata files)
pub const DEFAULT_IGNORED_EXTENSION: &str = "DS_Store";

/// A filesystem path taking part in a comparison
///
/// Nodes carry no state beyond the path; two nodes with equal paths are
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileNode {
    path: PathBuf,
}

impl FileNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Wrap every path of a directory listing
    pub fn from_paths(paths: Vec<PathBuf>) -> Vec<Self> {
        paths.into_iter().map(Self::new).collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<PathBuf> for FileNode {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for FileNode {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Verdict of one top-level folder comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOutcome {
    /// The comparison was cancelled before it could report a verdict
    Cancelled,
    /// The comparison ran to completion
    Finished { is_equal: bool },
}

impl ComparisonOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ComparisonOutcome::Cancelled)
    }

    /// True only for a finished comparison that found both trees identical
    pub fn is_equal(&self) -> bool {
        matches!(self, ComparisonOutcome::Finished { is_equal: true })
    }
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOutcome::Cancelled => f.write_str("cancelled"),
            ComparisonOutcome::Finished { is_equal: true } => f.write_str("same"),
            ComparisonOutcome::Finished { is_equal: false } => f.write_str("different"),
        }
    }
}

/// Cache key for file checksums
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChecksumKey {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// File extensions excluded from comparison, matched case-insensitively
    #[serde(default = "default_ignored_extensions")]
    pub ignored_extensions: Vec<String>,

    /// Memoize checksums while a comparison runs
    #[serde(default = "default_true")]
    pub use_checksum_cache: bool,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignored_extensions: default_ignored_extensions(),
            use_checksum_cache: true,
            portable_mode: false,
        }
    }
}

fn default_ignored_extensions() -> Vec<String> {
    vec![DEFAULT_IGNORED_EXTENSION.to_string()]
}

fn default_true() -> bool {
    true
}

/// BLAKE3 hash value (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<blake3::Hash> for Blake3Hash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

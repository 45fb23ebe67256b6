use std::path::{Path, PathBuf};
use tracing::debug;

/// Drops directory entries whose extension is configured as ignorable
///
/// The extension of an entry is everything after the last `.` of its file
/// name, so `.DS_Store` has the extension `DS_Store`. Names without a `.`
/// are never ignored. Matching is case-insensitive on both sides.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    ignored_extensions: Vec<String>,
    normalized: Vec<String>,
}

impl EntryFilter {
    pub fn new<I, S>(ignored_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ignored_extensions: Vec<String> =
            ignored_extensions.into_iter().map(Into::into).collect();
        let normalized = ignored_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        debug!("Entry filter ignores extensions {:?}", ignored_extensions);
        Self {
            ignored_extensions,
            normalized,
        }
    }

    /// A filter that keeps every entry
    pub fn none() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// The extensions as they were configured
    pub fn ignored_extensions(&self) -> &[String] {
        &self.ignored_extensions
    }

    /// Whether a single entry is excluded from comparison
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(ext) = entry_extension(path) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.normalized.iter().any(|ignored| *ignored == ext)
    }

    /// Keep the entries that are not ignored, in their original order
    pub fn filter(&self, entries: &[PathBuf]) -> Vec<PathBuf> {
        entries
            .iter()
            .filter(|entry| !self.is_ignored(entry))
            .cloned()
            .collect()
    }
}

fn entry_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_string())
}

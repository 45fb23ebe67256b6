use std::path::{Path, PathBuf};

/// Read-only view of a filesystem as seen by the comparison engine
///
/// Every query degrades to a conservative default instead of failing: a
/// missing path is not a directory, has size 0, no checksum, no type and no
/// children. Implementations must never mutate the filesystem.
pub trait DiskProvider: Send + Sync {
    /// True iff `path` resolves to an existing directory
    fn is_directory(&self, path: &Path) -> bool;

    /// Size in bytes, 0 when the path cannot be stat'ed
    fn size(&self, path: &Path) -> u64;

    /// Hex-encoded digest of the full file contents, `None` when unreadable
    fn checksum(&self, path: &Path) -> Option<String>;

    /// Content-type classification, `None` when it cannot be determined
    fn type_identifier(&self, path: &Path) -> Option<String>;

    /// Children of a directory in enumeration order
    ///
    /// Returns an empty list for files, missing paths and unreadable directories.
    fn read_dir(&self, path: &Path) -> Vec<PathBuf>;

    /// Forget memoized results; called before each top-level comparison
    fn clear_cache(&self) {}
}

impl<T: DiskProvider + ?Sized> DiskProvider for std::sync::Arc<T> {
    fn is_directory(&self, path: &Path) -> bool {
        (**self).is_directory(path)
    }

    fn size(&self, path: &Path) -> u64 {
        (**self).size(path)
    }

    fn checksum(&self, path: &Path) -> Option<String> {
        (**self).checksum(path)
    }

    fn type_identifier(&self, path: &Path) -> Option<String> {
        (**self).type_identifier(path)
    }

    fn read_dir(&self, path: &Path) -> Vec<PathBuf> {
        (**self).read_dir(path)
    }

    fn clear_cache(&self) {
        (**self).clear_cache()
    }
}

use crate::disk::LocalDisk;
use crate::file_compare::FileComparator;
use crate::filter::EntryFilter;
use foldcmp_common::{AppConfig, ComparisonOutcome, DiskProvider, FileNode};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared cancellation flag
///
/// Clones observe the same flag, so a caller can keep one while the
/// comparison runs on another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Recursive folder comparison engine
///
/// Two trees are equal when every directory holds the same number of
/// non-ignored entries and every left entry finds some matching right entry:
/// a directory with an equal directory, a file with an equal file. Names do
/// not take part in matching.
///
/// Only one top-level [`compare`](Self::compare) may run per instance at a
/// time; [`cancel`](Self::cancel) may be called from any thread.
pub struct FolderComparator {
    disk: Arc<dyn DiskProvider>,
    filter: EntryFilter,
    files: FileComparator,
    cancel: CancelFlag,
}

impl FolderComparator {
    pub fn new(disk: Arc<dyn DiskProvider>, filter: EntryFilter) -> Self {
        let files = FileComparator::new(disk.clone());
        Self {
            disk,
            filter,
            files,
            cancel: CancelFlag::new(),
        }
    }

    /// Build a comparator over the local filesystem
    pub fn from_config(config: &AppConfig) -> Self {
        let disk = if config.use_checksum_cache {
            LocalDisk::new()
        } else {
            LocalDisk::without_cache()
        };
        Self::new(
            Arc::new(disk),
            EntryFilter::new(config.ignored_extensions.iter().cloned()),
        )
    }

    pub fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    /// Compare two folder trees
    ///
    /// Clears any earlier cancellation before starting. If a cancellation is
    /// observed before the traversal ends the outcome is `Cancelled`, whatever
    /// the traversal computed.
    pub fn compare(&self, left: &Path, right: &Path) -> ComparisonOutcome {
        self.cancel.reset();
        self.disk.clear_cache();
        info!("Comparing {:?} with {:?}", left, right);

        let left = FileNode::from(left);
        let right = FileNode::from(right);
        let is_equal = self.roots_match(&left, &right);

        let outcome = if self.cancel.is_cancelled() {
            ComparisonOutcome::Cancelled
        } else {
            ComparisonOutcome::Finished { is_equal }
        };
        info!("Comparison finished: {}", outcome);
        outcome
    }

    pub fn cancel(&self) {
        debug!("Comparison cancel requested");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A handle that cancels this comparator's running comparison
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    fn roots_match(&self, left: &FileNode, right: &FileNode) -> bool {
        if self.disk.is_directory(left.path()) != self.disk.is_directory(right.path()) {
            debug!("Root type mismatch: {:?} vs {:?}", left.path(), right.path());
            return false;
        }
        self.nodes_match(left, right)
    }

    fn nodes_match(&self, left: &FileNode, right: &FileNode) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let left_children = self.filtered_children(left);
        let right_children = self.filtered_children(right);
        if left_children.len() != right_children.len() {
            debug!(
                "Entry count mismatch: {:?} ({}) vs {:?} ({})",
                left.path(),
                left_children.len(),
                right.path(),
                right_children.len()
            );
            return false;
        }

        self.children_match(&left_children, &right_children)
    }

    // Any-match: a right entry stays available after it matched a left entry
    fn children_match(&self, left: &[FileNode], right: &[FileNode]) -> bool {
        left.iter().all(|left_child| {
            let found = right
                .iter()
                .any(|right_child| self.pair_matches(left_child, right_child));
            if !found {
                debug!("No counterpart for {:?}", left_child.path());
            }
            found
        })
    }

    fn pair_matches(&self, left: &FileNode, right: &FileNode) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        match (
            self.disk.is_directory(left.path()),
            self.disk.is_directory(right.path()),
        ) {
            (true, true) => !self.cancel.is_cancelled() && self.nodes_match(left, right),
            (false, false) => self.files.files_equal(left.path(), right.path()),
            _ => false,
        }
    }

    fn filtered_children(&self, node: &FileNode) -> Vec<FileNode> {
        let children = self.disk.read_dir(node.path());
        FileNode::from_paths(self.filter.filter(&children))
    }
}

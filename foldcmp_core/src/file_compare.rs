use foldcmp_common::DiskProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Decides whether two files are equal, cheapest check first
///
/// Sizes and type identifiers are metadata reads; the checksum needs the full
/// contents and only runs when neither of those already proves a difference.
#[derive(Clone)]
pub struct FileComparator {
    disk: Arc<dyn DiskProvider>,
}

impl FileComparator {
    pub fn new(disk: Arc<dyn DiskProvider>) -> Self {
        Self { disk }
    }

    pub fn files_equal(&self, left: &Path, right: &Path) -> bool {
        // A size of 0 is also what an unreadable file reports, so it never proves a difference
        let left_size = self.disk.size(left);
        let right_size = self.disk.size(right);
        if left_size != right_size && left_size > 0 && right_size > 0 {
            trace!("Size mismatch {:?} ({}) vs {:?} ({})", left, left_size, right, right_size);
            return false;
        }

        if let (Some(left_type), Some(right_type)) = (
            self.disk.type_identifier(left),
            self.disk.type_identifier(right),
        ) {
            if left_type != right_type {
                trace!("Type mismatch {:?} ({}) vs {:?} ({})", left, left_type, right, right_type);
                return false;
            }
        }

        // Two unreadable files both checksum to None and compare equal
        let left_checksum = self.disk.checksum(left);
        let right_checksum = self.disk.checksum(right);
        trace!("Checksums {:?} vs {:?}", left_checksum, right_checksum);
        left_checksum == right_checksum
    }
}

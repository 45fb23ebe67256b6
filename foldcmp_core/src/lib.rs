pub mod async_compare;
pub mod comparison;
pub mod disk;
pub mod file_compare;
pub mod filter;
pub mod hash_cache;
pub mod type_id;

#[cfg(test)]
mod testing;

pub use async_compare::{AsyncFolderComparator, CancelHandle};
pub use comparison::{CancelFlag, FolderComparator};
pub use disk::LocalDisk;
pub use file_compare::FileComparator;
pub use filter::EntryFilter;
pub use hash_cache::ChecksumCache;
pub use type_id::type_identifier_for;

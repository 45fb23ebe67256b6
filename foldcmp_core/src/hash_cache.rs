use foldcmp_common::{Blake3Hash, ChecksumKey};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory checksum cache
///
/// Keys include size and modification time, so a file rewritten between two
/// lookups misses and gets hashed again.
#[derive(Default)]
pub struct ChecksumCache {
    entries: RwLock<HashMap<ChecksumKey, Blake3Hash>>,
}

impl ChecksumCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cached hash for a file
    pub fn get(&self, key: &ChecksumKey) -> Option<Blake3Hash> {
        self.entries.read().ok()?.get(key).copied()
    }

    /// Store hash in cache
    pub fn put(&self, key: ChecksumKey, hash: Blake3Hash) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, hash);
        }
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Get the number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn key(size: u64, modified: SystemTime) -> ChecksumKey {
        ChecksumKey {
            path: PathBuf::from("test.txt"),
            modified,
            size,
        }
    }

    #[test]
    fn test_checksum_cache_basic() {
        let cache = ChecksumCache::new();
        let now = SystemTime::now();
        let hash = Blake3Hash([1; 32]);

        assert!(cache.get(&key(100, now)).is_none());

        cache.put(key(100, now), hash);
        assert_eq!(cache.get(&key(100, now)), Some(hash));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_file_misses() {
        let cache = ChecksumCache::new();
        let now = SystemTime::now();
        cache.put(key(100, now), Blake3Hash([2; 32]));

        assert!(cache.get(&key(101, now)).is_none());
        assert!(cache.get(&key(100, now + Duration::from_secs(1))).is_none());
    }

    #[test]
    fn test_clear() {
        let cache = ChecksumCache::new();
        cache.put(key(1, SystemTime::UNIX_EPOCH), Blake3Hash([3; 32]));
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
    }
}

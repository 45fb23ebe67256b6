use crate::hash_cache::ChecksumCache;
use crate::type_id::type_identifier_for;
use foldcmp_common::{Blake3Hash, ChecksumKey, DiskProvider};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Local filesystem provider
pub struct LocalDisk {
    cache: Option<ChecksumCache>,
}

impl LocalDisk {
    pub fn new() -> Self {
        Self {
            cache: Some(ChecksumCache::new()),
        }
    }

    /// A provider that hashes files on every request
    pub fn without_cache() -> Self {
        Self { cache: None }
    }

    pub fn cache(&self) -> Option<&ChecksumCache> {
        self.cache.as_ref()
    }

    fn hash_file(&self, path: &Path) -> std::io::Result<Blake3Hash> {
        let mut file = fs::File::open(path)?;

        let cache_key = match (&self.cache, file.metadata()) {
            (Some(_), Ok(meta)) => Some(ChecksumKey {
                path: path.to_path_buf(),
                size: meta.len(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            }),
            _ => None,
        };

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(hash) = cache.get(key) {
                debug!("Checksum cache hit for {:?}", path);
                return Ok(hash);
            }
        }

        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0; READ_BUFFER_SIZE];

        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        let hash: Blake3Hash = hasher.finalize().into();

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.put(key, hash);
        }

        Ok(hash)
    }
}

impl Default for LocalDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskProvider for LocalDisk {
    fn is_directory(&self, path: &Path) -> bool {
        fs::metadata(path).map(|meta| meta.is_dir()).unwrap_or(false)
    }

    fn size(&self, path: &Path) -> u64 {
        match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!("Failed to get file attributes for {:?}: {}", path, e);
                0
            }
        }
    }

    fn checksum(&self, path: &Path) -> Option<String> {
        match self.hash_file(path) {
            Ok(hash) => Some(hash.to_hex()),
            Err(e) => {
                debug!("Failed to checksum {:?}: {}", path, e);
                None
            }
        }
    }

    fn type_identifier(&self, path: &Path) -> Option<String> {
        type_identifier_for(path)
    }

    fn read_dir(&self, path: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Failed to list {:?}: {}", path, e);
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect()
    }

    fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            debug!("Dropping {} cached checksums", cache.len());
            cache.clear();
        }
    }
}

//! In-memory `DiskProvider` used by the unit tests

use crate::type_id::type_identifier_for;
use foldcmp_common::DiskProvider;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone)]
enum FakeEntry {
    Dir { readable: bool },
    File { contents: Option<Vec<u8>>, size: u64 },
}

type ListingHook = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
pub struct FakeDisk {
    entries: Mutex<Vec<(PathBuf, FakeEntry)>>,
    listing_hook: Mutex<Option<ListingHook>>,
    read_dir_calls: AtomicUsize,
    checksum_calls: AtomicUsize,
}

impl FakeDisk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), FakeEntry::Dir { readable: true });
    }

    pub fn add_unreadable_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), FakeEntry::Dir { readable: false });
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: &[u8]) {
        self.insert(
            path.as_ref(),
            FakeEntry::File {
                contents: Some(contents.to_vec()),
                size: contents.len() as u64,
            },
        );
    }

    pub fn add_unreadable_file(&self, path: impl AsRef<Path>, size: u64) {
        self.insert(path.as_ref(), FakeEntry::File { contents: None, size });
    }

    /// Run `hook` with the running listing count on every `read_dir`
    pub fn on_listing(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.listing_hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn read_dir_calls(&self) -> usize {
        self.read_dir_calls.load(Ordering::SeqCst)
    }

    pub fn checksum_calls(&self) -> usize {
        self.checksum_calls.load(Ordering::SeqCst)
    }

    fn insert(&self, path: &Path, entry: FakeEntry) {
        let mut entries = self.entries.lock().unwrap();
        let mut ancestors: Vec<&Path> = path.ancestors().skip(1).collect();
        ancestors.reverse();
        for ancestor in ancestors {
            if ancestor.as_os_str().is_empty() || ancestor.parent().is_none() {
                continue;
            }
            if !entries.iter().any(|(p, _)| p == ancestor) {
                entries.push((ancestor.to_path_buf(), FakeEntry::Dir { readable: true }));
            }
        }
        entries.retain(|(p, _)| p != path);
        entries.push((path.to_path_buf(), entry));
    }

    fn lookup(&self, path: &Path) -> Option<FakeEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, entry)| entry.clone())
    }
}

impl DiskProvider for FakeDisk {
    fn is_directory(&self, path: &Path) -> bool {
        matches!(self.lookup(path), Some(FakeEntry::Dir { .. }))
    }

    fn size(&self, path: &Path) -> u64 {
        match self.lookup(path) {
            Some(FakeEntry::File { size, .. }) => size,
            _ => 0,
        }
    }

    fn checksum(&self, path: &Path) -> Option<String> {
        self.checksum_calls.fetch_add(1, Ordering::SeqCst);
        match self.lookup(path) {
            Some(FakeEntry::File {
                contents: Some(contents),
                ..
            }) => Some(blake3::hash(&contents).to_hex().to_string()),
            _ => None,
        }
    }

    fn type_identifier(&self, path: &Path) -> Option<String> {
        type_identifier_for(path)
    }

    fn read_dir(&self, path: &Path) -> Vec<PathBuf> {
        let calls = self.read_dir_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.listing_hook.lock().unwrap().as_ref() {
            hook(calls);
        }

        if !matches!(self.lookup(path), Some(FakeEntry::Dir { readable: true })) {
            return Vec::new();
        }

        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, _)| p.clone())
            .collect()
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use crate::error::Error;

const INDEX_FILE: &str = "index.json";

/// Stable cache key for a source URL: truncated hex of its sha256. Doubles
/// as the per-target subdirectory name in the cache root.
pub fn cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Index of completed downloads, persisted as JSON in the cache root.
///
/// Entries are appended on successful download only and never mutated.
/// Concurrent invocations may race on the file; each process only writes
/// its own key, so last-writer-wins is acceptable. Lookups verify the file
/// still exists, which makes stale entries harmless.
#[derive(Debug)]
pub struct CacheIndex {
    root: PathBuf,
    entries: BTreeMap<String, String>,
}

impl CacheIndex {
    pub fn load_or_default<P: AsRef<Path>>(root: P) -> CacheIndex {
        let root = root.as_ref().to_path_buf();
        let path = root.join(INDEX_FILE);
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("ignoring unreadable cache index {}: {e}", path.display());
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };
        CacheIndex { root, entries }
    }

    /// The archive previously downloaded for this URL, if it still exists.
    pub fn lookup(&self, url: &str) -> Option<PathBuf> {
        let stored = self.entries.get(&cache_key(url))?;
        let path = self.root.join(stored);
        if path.is_file() {
            Some(path)
        } else {
            debug!("cache index entry for {url} points to a missing file");
            None
        }
    }

    /// Records a completed download. Must only be called once the archive
    /// sits at its final path.
    pub fn insert(&mut self, url: &str, archive: &Path) -> Result<(), Error> {
        let stored = archive
            .strip_prefix(&self.root)
            .unwrap_or(archive)
            .to_string_lossy()
            .to_string();
        self.entries.insert(cache_key(url), stored);
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<(), Error> {
        std::fs::create_dir_all(&self.root)?;
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| Error::Config(format!("could not serialize cache index: {e}")))?;
        std::fs::write(self.root.join(INDEX_FILE), content)?;
        Ok(())
    }
}

/// The per-target subdirectory for a source URL inside the cache root.
pub fn target_dir(cache_root: &Path, url: &str) -> PathBuf {
    cache_root.join(cache_key(url))
}

/// Empties the cache directory, returning how many files were removed.
pub fn clean_cache(cache_root: &Path) -> Result<u64, Error> {
    if !cache_root.exists() {
        return Ok(0);
    }
    let removed = WalkDir::new(cache_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count() as u64;
    std::fs::remove_dir_all(cache_root)?;
    std::fs::create_dir_all(cache_root)?;
    Ok(removed)
}

//! Durable on-disk cache for provider payloads
//!
//! One JSON file per key, named by the SHA-256 digest of the key. Writes go to
//! a temp file in the cache directory which is then renamed over the final
//! path, so readers see either the previous entry or the new one, never a
//! partial file. Reads fail soft: anything unreadable is treated as absent,
//! and unparseable entries are deleted.

use crate::config::CacheConfig;
use crate::error::Result;
use crate::logging::get_logger;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const ENTRY_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

/// A cached payload together with the time it was written
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: serde_json::Value,
    pub written_at: DateTime<Utc>,
}

/// File-backed key/value cache
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    expiry: Duration,
    logger: crate::logging::StructuredLogger,
}

impl CacheStore {
    /// Open (and create if needed) a cache rooted at `dir`
    pub fn new<P: Into<PathBuf>>(dir: P, expiry: Duration) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            expiry,
            logger: get_logger("cache"),
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.resolve_dir(), config.expiry())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub const fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Path of the file backing `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{:x}.{}", digest, ENTRY_EXTENSION))
    }

    /// Read an entry; `None` when missing, unreadable or corrupt
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let mut file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                self.logger
                    .warn(&format!("Cache read error for key '{}': {}", key, e));
                return None;
            }
        };

        let mut contents = Vec::new();
        let written_at = match file
            .read_to_end(&mut contents)
            .and_then(|_| file.metadata())
            .and_then(|m| m.modified())
        {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(e) => {
                self.logger
                    .warn(&format!("Cache read error for key '{}': {}", key, e));
                return None;
            }
        };

        match serde_json::from_slice::<serde_json::Value>(&contents) {
            Ok(payload) => Some(CacheEntry {
                payload,
                written_at,
            }),
            Err(e) => {
                self.logger.warn(&format!(
                    "Corrupt cache entry for key '{}', removing: {}",
                    key, e
                ));
                self.remove_path(&path);
                None
            }
        }
    }

    /// Store a payload. Empty payloads are refused and `Ok(false)` is returned.
    pub fn set(&self, key: &str, payload: &serde_json::Value) -> Result<bool> {
        if is_empty_payload(payload) {
            self.logger.warn(&format!(
                "Refusing to cache empty data for key '{}'",
                key
            ));
            return Ok(false);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);
        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, payload)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        self.logger.debug(&format!("Cached data for key '{}'", key));
        Ok(true)
    }

    /// Delete the entry for `key` if present
    pub fn remove(&self, key: &str) {
        self.remove_path(&self.entry_path(key));
    }

    /// Remove entries older than the configured expiry; returns how many were removed
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(SystemTime::now())
    }

    /// Expiry sweep against an explicit clock
    pub fn cleanup_at(&self, now: SystemTime) -> usize {
        let Some(cutoff) = now.checked_sub(self.expiry) else {
            return 0;
        };
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                self.logger
                    .warn(&format!("Cache sweep could not list directory: {}", e));
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_cache_file(&path) {
                continue;
            }
            // Entries can vanish mid-sweep; that is the same as already expired
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    self.logger.info(&format!(
                        "Removed expired cache file: {}",
                        entry.file_name().to_string_lossy()
                    ));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => self.logger.warn(&format!(
                    "Error removing cache file {}: {}",
                    path.display(),
                    e
                )),
            }
        }
        removed
    }

    fn remove_path(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path)
            && e.kind() != ErrorKind::NotFound
        {
            self.logger.warn(&format!(
                "Error removing cache file {}: {}",
                path.display(),
                e
            ));
        }
    }
}

fn is_empty_payload(payload: &serde_json::Value) -> bool {
    match payload {
        serde_json::Value::Null => true,
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_cache_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && (name.ends_with(TEMP_SUFFIX)
            || path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filename_is_hex_digest_of_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(60)).unwrap();
        let path = store.entry_path("octopus_rates_E-1R/AGILE:*_2025-01-15");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 64 + ".json".len());
        assert!(name[..64].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(path, store.entry_path("octopus_rates_E-1R/AGILE:*_2025-01-15"));
    }

    #[test]
    fn empty_payloads_are_refused() {
        assert!(is_empty_payload(&json!(null)));
        assert!(is_empty_payload(&json!([])));
        assert!(is_empty_payload(&json!({})));
        assert!(!is_empty_payload(&json!([1])));
        assert!(!is_empty_payload(&json!(0)));
    }

    #[test]
    fn creating_store_twice_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        CacheStore::new(&nested, Duration::from_secs(1)).unwrap();
        CacheStore::new(&nested, Duration::from_secs(1)).unwrap();
        assert!(nested.is_dir());
    }
}

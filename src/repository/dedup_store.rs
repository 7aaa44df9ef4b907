//! Persisted set of fingerprints that have already been processed.
//!
//! The store keeps insertion order so it can evict the oldest entries once
//! the cap is exceeded. The durable form is a single JSON file that is
//! replaced atomically on every save.

use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_FINGERPRINTS: usize = 2000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk layout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DedupRecord {
    sent_hashes: Vec<String>,
    #[serde(default)]
    last_saved: Option<DateTime<Utc>>,
    #[serde(default)]
    total_sent: usize,
}

/// FIFO-capped fingerprint set backed by a JSON file.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    cap: usize,
    order: VecDeque<String>,
    members: HashSet<String>,
    last_saved: Option<DateTime<Utc>>,
}

impl DedupStore {
    /// Empty store; nothing is read from `path` until [`load_from_durable`](Self::load_from_durable).
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap: cap.max(1),
            order: VecDeque::new(),
            members: HashSet::new(),
            last_saved: None,
        }
    }

    /// Create a store and load whatever the file holds.
    pub fn open(path: impl Into<PathBuf>, cap: usize) -> Self {
        let mut store = Self::new(path, cap);
        store.load_from_durable();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Time of the last successful save (or the one recorded in the loaded file).
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Fingerprints, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn has(&self, fingerprint: &str) -> bool {
        self.members.contains(fingerprint)
    }

    /// Record a fingerprint. Returns false if it was already present.
    ///
    /// When the cap is exceeded the oldest entries are evicted and the store
    /// is saved right away; a failed save is logged and the in-memory set
    /// stays authoritative.
    pub fn add(&mut self, fingerprint: impl Into<String>) -> bool {
        let fingerprint = fingerprint.into();
        if !self.members.insert(fingerprint.clone()) {
            return false;
        }
        self.order.push_back(fingerprint);

        if self.evict_overflow() > 0 {
            if let Err(e) = self.save_to_durable() {
                warn!("Failed to persist dedup store after eviction: {}", e);
            }
        }
        true
    }

    /// Forget every fingerprint. Does not touch the file.
    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    fn evict_overflow(&mut self) -> usize {
        let mut evicted = 0;
        while self.order.len() > self.cap {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!("Evicted {} oldest fingerprint(s)", evicted);
        }
        evicted
    }

    /// Replace the in-memory set with the file's content and return the
    /// number of fingerprints loaded.
    ///
    /// A missing, unreadable or corrupt file yields an empty store. Duplicate
    /// entries keep their first occurrence and an oversized file is trimmed
    /// to the newest `cap` entries.
    pub fn load_from_durable(&mut self) -> usize {
        self.clear();
        self.last_saved = None;

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No dedup store at {}, starting empty", self.path.display());
                return 0;
            }
            Err(e) => {
                warn!(
                    "Failed to read dedup store {}: {}, starting empty",
                    self.path.display(),
                    e
                );
                return 0;
            }
        };

        let record: DedupRecord = match serde_json::from_str(&content) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    "Corrupt dedup store {}: {}, starting empty",
                    self.path.display(),
                    e
                );
                return 0;
            }
        };

        for fingerprint in record.sent_hashes {
            if self.members.insert(fingerprint.clone()) {
                self.order.push_back(fingerprint);
            }
        }
        self.evict_overflow();
        self.last_saved = record.last_saved;

        info!(
            "Loaded {} fingerprint(s) from {}",
            self.order.len(),
            self.path.display()
        );
        self.order.len()
    }

    /// Write the full set to the file, replacing it atomically.
    pub fn save_to_durable(&mut self) -> Result<(), StoreError> {
        let now = Utc::now();
        let record = DedupRecord {
            sent_hashes: self.order.iter().cloned().collect(),
            last_saved: Some(now),
            total_sent: self.order.len(),
        };
        let json = serde_json::to_vec_pretty(&record)?;

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(&parent).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        self.last_saved = Some(now);
        debug!(
            "Saved {} fingerprint(s) to {}",
            record.total_sent,
            self.path.display()
        );
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use watch_core::{Baseline, WatchState};
use watch_logging::{watch_debug, watch_info, watch_warn};

use crate::persist::{AtomicFileWriter, PersistError};

const HASH_SUFFIX: &str = "_hash";
const TEXT_SUFFIX: &str = "_text";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state from {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("state document {path:?} is malformed: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize state: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to write state: {0}")]
    Persist(#[from] PersistError),
}

/// Loads and saves the per-target baselines.
pub trait StateStore: Send + Sync {
    /// A missing document is an empty state, not an error.
    fn load(&self) -> Result<WatchState, StoreError>;
    /// Rewrites the whole document.
    fn save(&self, state: &WatchState) -> Result<(), StoreError>;
}

/// Flat JSON object of strings: `"<key>_hash"` and optionally `"<key>_text"` per target.
///
/// Bare `"<key>": "<hash>"` entries from older documents hash a different extract, so
/// they are dropped and the target starts over as a first run.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    writer: AtomicFileWriter,
    store_text: bool,
}

impl JsonStateStore {
    pub fn new(path: PathBuf, store_text: bool) -> Self {
        Self {
            writer: AtomicFileWriter::new(path),
            store_text,
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<WatchState, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                watch_info!("No state at {:?}; starting empty", path);
                return Ok(WatchState::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let document: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let baselines = baselines_from_document(document);
        watch_debug!("Loaded {} baseline(s) from {:?}", baselines.len(), path);
        Ok(WatchState::from_baselines(baselines))
    }

    fn save(&self, state: &WatchState) -> Result<(), StoreError> {
        let document = document_from_baselines(state.baselines(), self.store_text);
        let mut content = serde_json::to_string_pretty(&document).map_err(StoreError::Serialize)?;
        content.push('\n');
        self.writer.write(&content)?;
        watch_info!("Saved {} baseline(s) to {:?}", state.baselines().len(), self.path());
        Ok(())
    }
}

fn baselines_from_document(document: BTreeMap<String, String>) -> BTreeMap<String, Baseline> {
    let mut hashes = BTreeMap::new();
    let mut texts = BTreeMap::new();
    for (key, value) in document {
        if let Some(target) = key.strip_suffix(HASH_SUFFIX) {
            hashes.insert(target.to_string(), value);
        } else if let Some(target) = key.strip_suffix(TEXT_SUFFIX) {
            texts.insert(target.to_string(), value);
        } else {
            watch_warn!("Ignoring legacy state entry {:?}; it will be re-initialized", key);
        }
    }

    hashes
        .into_iter()
        .map(|(key, fingerprint)| {
            let extract = texts.remove(&key);
            (key, Baseline::new(fingerprint, extract))
        })
        .collect()
}

fn document_from_baselines(
    baselines: &BTreeMap<String, Baseline>,
    store_text: bool,
) -> BTreeMap<String, String> {
    let mut document = BTreeMap::new();
    for (key, baseline) in baselines {
        document.insert(format!("{key}{HASH_SUFFIX}"), baseline.fingerprint.clone());
        if store_text {
            if let Some(extract) = &baseline.extract {
                document.insert(format!("{key}{TEXT_SUFFIX}"), extract.clone());
            }
        }
    }
    document
}

//! Persisted indexing state: records plus the last indexed block.

use crate::{error::IndexError, store::MemoryStore};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexState {
    /// Last block whose transfers are fully applied
    pub last_block: Option<u64>,
    pub store: MemoryStore,
}

impl IndexState {
    /// Load state from `path`; a missing file yields an empty state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No state file, starting from scratch");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(IndexError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let state: Self = serde_json::from_str(&contents).map_err(|source| IndexError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), last_block = ?state.last_block, "State loaded");
        Ok(state)
    }

    /// Write state to `path` through a temporary file and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        let io_err = |source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        debug!(path = %path.display(), last_block = ?self.last_block, "State saved");
        Ok(())
    }

    /// First block a sync should read, given the configured start block.
    pub fn next_block(&self, start_block: u64) -> u64 {
        self.last_block
            .map_or(start_block, |last| (last + 1).max(start_block))
    }
}

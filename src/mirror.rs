//! Local mirror of the estate list.
//!
//! The mirror is a placeholder shown before the first fetch completes. Every
//! save replaces the previous snapshot wholesale; there is no merge or expiry.

use crate::error::Result;
use crate::models::Estate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Slot the estate snapshot is stored under
pub const ESTATES_KEY: &str = "realEstates";

const SNAPSHOT_VERSION: u32 = 1;

/// Storage for the estate snapshot
pub trait EstateMirror: Send + Sync {
    /// Overwrite the stored snapshot
    fn save(&self, estates: &[Estate]) -> Result<()>;

    /// Most recent snapshot; empty when nothing usable is stored
    fn load(&self) -> Vec<Estate>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    estates: Vec<Estate>,
}

/// Mirror kept as a JSON file inside a directory
#[derive(Debug, Clone)]
pub struct FileMirror {
    dir: PathBuf,
}

impl FileMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{ESTATES_KEY}.json"))
    }

    fn read(path: &Path) -> Result<Vec<Estate>> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        debug!(
            "Mirror snapshot v{} from {} holds {} estates",
            snapshot.version,
            snapshot.saved_at,
            snapshot.estates.len()
        );
        Ok(snapshot.estates)
    }
}

impl EstateMirror for FileMirror {
    fn save(&self, estates: &[Estate]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            estates: estates.to_vec(),
        };
        let content = serde_json::to_string_pretty(&snapshot)?;

        // Write to temp file first, then rename
        let path = self.path();
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &path)?;

        debug!("Saved {} estates to {}", estates.len(), path.display());
        Ok(())
    }

    fn load(&self) -> Vec<Estate> {
        let path = self.path();
        if !path.exists() {
            return Vec::new();
        }

        match Self::read(&path) {
            Ok(estates) => estates,
            Err(e) => {
                warn!("Ignoring unreadable mirror at {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

/// In-process mirror; counts saves so callers can observe rewrites
#[derive(Debug, Default)]
pub struct MemoryMirror {
    estates: Mutex<Vec<Estate>>,
    saves: AtomicUsize,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_estates(estates: Vec<Estate>) -> Self {
        Self {
            estates: Mutex::new(estates),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl EstateMirror for MemoryMirror {
    fn save(&self, estates: &[Estate]) -> Result<()> {
        let mut stored = self.estates.lock().unwrap_or_else(|e| e.into_inner());
        *stored = estates.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> Vec<Estate> {
        self.estates
            .lock()
            .map(|stored| stored.clone())
            .unwrap_or_default()
    }
}

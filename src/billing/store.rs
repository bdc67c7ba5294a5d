use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::domain::Employee;

/// Fixed key the directory mirror is stored under.
pub const MIRROR_KEY: &str = "tusuka_employees";

/// Local key-value mirror of the whole directory.
pub trait DirectoryStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> Result<Option<Vec<Employee>>, StoreError>;
    fn write(&self, records: &[Employee]) -> Result<(), StoreError>;
    fn remove(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("mirror io failed: {0}")]
    Io(#[from] io::Error),
    #[error("mirror contents are not a valid employee list: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("mirror unavailable: {0}")]
    Unavailable(String),
}

/// Mirror persisted as a JSON array in `<dir>/tusuka_employees.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{MIRROR_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryStore for JsonFileStore {
    fn read(&self) -> Result<Option<Vec<Employee>>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write(&self, records: &[Employee]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec(records)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local mirror holding the raw JSON blob. Clones share the same blob.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.blob
            .lock()
            .map_err(|_| StoreError::Unavailable("memory mirror lock poisoned".to_string()))
    }
}

impl DirectoryStore for MemoryStore {
    fn read(&self) -> Result<Option<Vec<Employee>>, StoreError> {
        match self.lock()?.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, records: &[Employee]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(records)?;
        *self.lock()? = Some(payload);
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Server-provided CSV snapshot of the directory, as raw bytes.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, SnapshotError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot not found at {0}")]
    Missing(PathBuf),
    #[error("snapshot unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("no snapshot configured")]
    Absent,
}

/// Snapshot read from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for FileSnapshot {
    fn fetch(&self) -> Result<Vec<u8>, SnapshotError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(SnapshotError::Missing(self.path.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Snapshot held in memory; `None` behaves like an unreachable server.
#[derive(Debug, Clone, Default)]
pub struct InlineSnapshot(pub Option<String>);

impl SnapshotSource for InlineSnapshot {
    fn fetch(&self) -> Result<Vec<u8>, SnapshotError> {
        self.0
            .as_ref()
            .map(|text| text.clone().into_bytes())
            .ok_or(SnapshotError::Absent)
    }
}

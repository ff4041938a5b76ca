use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{DaybookError, Result};

/// Storage medium for the serialized snapshot.
pub trait Persistence {
    /// Stored text, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, contents: &str) -> Result<()>;
    /// Remove everything stored.
    fn clear(&self) -> Result<()>;
}

/// A single JSON file, replaced atomically on every save.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl Persistence for JsonFileBackend {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage. Clones share the same contents, so a test can keep a
/// handle after giving one to a store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    contents: Rc<RefCell<Option<String>>>,
    fail_saves: Rc<Cell<bool>>,
    fail_loads: Rc<Cell<bool>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        let backend = Self::default();
        *backend.contents.borrow_mut() = Some(contents.into());
        backend
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Make every following save fail, as if storage were full.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Make every following load fail, as if the file were unreadable.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Persistence for MemoryBackend {
    fn load(&self) -> Result<Option<String>> {
        if self.fail_loads.get() {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied").into());
        }
        Ok(self.contents.borrow().clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        if self.fail_saves.get() {
            return Err(DaybookError::Persistence("storage quota exceeded".into()));
        }
        *self.contents.borrow_mut() = Some(contents.to_string());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.contents.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested").join("planner.json"));
        assert_eq!(backend.load().unwrap(), None);

        backend.save("{\"a\":1}").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!backend.temp_path().exists());

        backend.clear().unwrap();
        assert_eq!(backend.load().unwrap(), None);
        backend.clear().unwrap();
    }

    #[test]
    fn memory_backend_shares_state_and_fails_on_request() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();
        backend.save("x").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("x"));

        handle.set_fail_saves(true);
        assert!(matches!(backend.save("y"), Err(DaybookError::Persistence(_))));
        assert_eq!(handle.contents().as_deref(), Some("x"));
        assert_eq!(handle.save_count(), 1);
    }
}

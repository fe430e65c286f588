use super::table::ConfigTable;
use crate::domain::ports::ConfigProvider;
use crate::error::Result;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// A configuration provider persisted as a JSON file.
///
/// All queries are answered from memory. Changes, including entries
/// materialised by [`ConfigProvider::ensure_entry`], only reach disk through
/// [`save`](Self::save); [`ConfigProvider::reload`] discards unsaved changes.
#[derive(Debug)]
pub struct FileConfig {
    path: PathBuf,
    table: RwLock<ConfigTable>,
    dirty: AtomicBool,
}

impl FileConfig {
    /// Opens the file at `path`, creating it with the default table if it
    /// does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            Self::read(&path)?
        } else {
            let table = ConfigTable::defaults();
            Self::write(&path, &table)?;
            info!(path = %path.display(), "created default configuration");
            table
        };
        Ok(Self {
            path,
            table: RwLock::new(table),
            dirty: AtomicBool::new(false),
        })
    }

    fn read(path: &Path) -> Result<ConfigTable> {
        let raw = fs::read_to_string(path)?;
        let mut table: ConfigTable = serde_json::from_str(&raw)?;
        table.sanitize();
        Ok(table)
    }

    fn write(path: &Path, table: &ConfigTable) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(table)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether in-memory changes have not been saved yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Writes the current table to disk.
    pub fn save(&self) -> Result<()> {
        let table = self.table.read().clone();
        Self::write(&self.path, &table)?;
        self.dirty.store(false, Ordering::Release);
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn set_priority(&self, id: &str, priority: i32) {
        self.table.write().set_priority(id, priority);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn set_disabled(&self, id: &str, disabled: bool) {
        self.table.write().set_disabled(id, disabled);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn set_generous(&self, id: &str, generous: bool) {
        self.table.write().set_generous(id, generous);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn snapshot(&self) -> ConfigTable {
        self.table.read().clone()
    }
}

impl ConfigProvider for FileConfig {
    fn priority(&self, handler_id: &str, declared: i8) -> i32 {
        self.table.read().priority(handler_id, declared)
    }

    fn is_disabled(&self, handler_id: &str) -> bool {
        self.table.read().is_disabled(handler_id)
    }

    fn is_generous(&self, handler_id: &str) -> bool {
        self.table.read().is_generous(handler_id)
    }

    fn ensure_entry(&self, handler_id: &str, priority: i32) {
        if self.table.write().ensure_entry(handler_id, priority) {
            self.dirty.store(true, Ordering::Release);
        }
    }

    fn reload(&self) -> Result<()> {
        let table = Self::read(&self.path)?;
        *self.table.write() = table;
        self.dirty.store(false, Ordering::Release);
        info!(path = %self.path.display(), "configuration reloaded");
        Ok(())
    }
}

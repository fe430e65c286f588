use super::table::ConfigTable;
use crate::domain::ports::ConfigProvider;
use crate::error::Result;
use parking_lot::RwLock;

/// A thread-safe, process-local configuration provider.
///
/// Nothing is persisted; `reload` is a no-op. Useful for tests and for
/// embedders that manage configuration themselves.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    table: RwLock<ConfigTable>,
}

impl MemoryConfig {
    /// Creates an empty configuration: declared priorities apply everywhere.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: ConfigTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    pub fn set_priority(&self, id: &str, priority: i32) {
        self.table.write().set_priority(id, priority);
    }

    pub fn clear_priority(&self, id: &str) -> bool {
        self.table.write().clear_priority(id)
    }

    pub fn set_disabled(&self, id: &str, disabled: bool) {
        self.table.write().set_disabled(id, disabled);
    }

    pub fn set_generous(&self, id: &str, generous: bool) {
        self.table.write().set_generous(id, generous);
    }

    pub fn configured_priority(&self, id: &str) -> Option<i32> {
        self.table.read().configured_priority(id)
    }

    pub fn snapshot(&self) -> ConfigTable {
        self.table.read().clone()
    }
}

impl ConfigProvider for MemoryConfig {
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
        self.table.write().ensure_entry(handler_id, priority);
    }

    fn reload(&self) -> Result<()> {
        Ok(())
    }
}

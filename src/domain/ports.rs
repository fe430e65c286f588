use crate::error::Result;

/// Source of per-handler configuration consulted by the registry.
///
/// Queries run while the registry lock is held and must not perform I/O.
/// Only [`reload`](Self::reload) may touch storage; the registry calls it
/// before taking its lock.
pub trait ConfigProvider: Send + Sync {
    /// Effective priority: the configured override, else `declared`.
    fn priority(&self, handler_id: &str, declared: i8) -> i32;

    fn is_disabled(&self, handler_id: &str) -> bool;

    /// Whether the handler yields cases it would accept but then fail.
    fn is_generous(&self, handler_id: &str) -> bool;

    /// Records an entry for `handler_id` if none exists yet.
    fn ensure_entry(&self, handler_id: &str, priority: i32);

    /// Re-reads the backing store.
    fn reload(&self) -> Result<()>;
}

pub type ConfigProviderRef = std::sync::Arc<dyn ConfigProvider>;

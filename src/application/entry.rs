use crate::domain::handler::{Handler, HandlerInfo};
use crate::domain::object::{ObjectType, Tradable};
use std::any::Any;
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

/// Type-erased reference to a handler, plus the identity captured when it was
/// first offered to the registry.
///
/// The slot is what survives a reload: re-registration reuses it, so the
/// handler reference and its [`HandlerInfo`] allocation are never rebuilt.
/// The declared priority is asked of the handler each time.
#[derive(Clone)]
pub(crate) struct HandlerSlot {
    info: Arc<HandlerInfo>,
    declared: Arc<dyn Fn() -> i8 + Send + Sync>,
    handler: Arc<dyn Any + Send + Sync>,
}

impl HandlerSlot {
    pub(crate) fn new<T: Tradable>(handler: Arc<dyn Handler<Object = T>>) -> Self {
        let info = HandlerInfo::new(handler.id(), handler.provider(), ObjectType::of::<T>());
        let declared = {
            let handler = Arc::clone(&handler);
            move || handler.priority()
        };
        Self {
            info: Arc::new(info),
            declared: Arc::new(declared),
            handler: Arc::new(handler),
        }
    }

    pub(crate) fn info(&self) -> &Arc<HandlerInfo> {
        &self.info
    }

    pub(crate) fn id(&self) -> &str {
        self.info.id()
    }

    pub(crate) fn declared_priority(&self) -> i8 {
        (self.declared)()
    }

    pub(crate) fn handler<T: Tradable>(&self) -> Option<Arc<dyn Handler<Object = T>>> {
        self.handler.downcast_ref::<Arc<dyn Handler<Object = T>>>().cloned()
    }
}

/// Sort key of a [`PriorityEntry`]: higher priority first, then ascending id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Rank {
    priority: Reverse<i32>,
    id: String,
}

/// A handler paired with its effective priority.
///
/// Two entries are equal when their handler ids match, whatever their
/// priorities.
#[derive(Clone)]
pub(crate) struct PriorityEntry {
    slot: HandlerSlot,
    priority: i32,
}

impl PriorityEntry {
    pub(crate) fn new(slot: HandlerSlot, priority: i32) -> Self {
        Self { slot, priority }
    }

    pub(crate) fn slot(&self) -> &HandlerSlot {
        &self.slot
    }

    pub(crate) fn info(&self) -> &Arc<HandlerInfo> {
        self.slot.info()
    }

    pub(crate) fn id(&self) -> &str {
        self.slot.id()
    }

    pub(crate) fn object_type(&self) -> ObjectType {
        self.slot.info().object_type()
    }

    pub(crate) fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn rank(&self) -> Rank {
        Rank {
            priority: Reverse(self.priority),
            id: self.id().to_string(),
        }
    }
}

impl PartialEq for PriorityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for PriorityEntry {}

impl fmt::Debug for PriorityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityEntry")
            .field("id", &self.id())
            .field("priority", &self.priority)
            .field("object_type", &self.object_type())
            .finish()
    }
}

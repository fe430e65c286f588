use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Values that can be transacted through the registry.
///
/// Blanket-implemented; any owned, shareable type qualifies.
pub trait Tradable: Any + Clone + Send + Sync {}

impl<T: Any + Clone + Send + Sync> Tradable for T {}

/// Stable descriptor of a transacted object type.
///
/// Two descriptors are equal when they name the same Rust type; the human
/// readable name is carried along for logs and reports only.
#[derive(Clone, Copy)]
pub struct ObjectType {
    id: TypeId,
    name: &'static str,
}

impl ObjectType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectType").field(&self.name).finish()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The actor/context pair a transaction is evaluated for.
///
/// Both halves are optional: a missing actor means the transaction is
/// system-initiated, a missing context means it is not bound to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scope {
    actor: Option<Uuid>,
    context: Option<Uuid>,
}

impl Scope {
    pub fn new(actor: Option<Uuid>, context: Option<Uuid>) -> Self {
        Self { actor, context }
    }

    /// A scope with neither actor nor context.
    pub fn system() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: Uuid) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_context(mut self, context: Uuid) -> Self {
        self.context = Some(context);
        self
    }

    pub fn actor(&self) -> Option<Uuid> {
        self.actor
    }

    pub fn context(&self) -> Option<Uuid> {
        self.context
    }
}

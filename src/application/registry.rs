use super::entry::{HandlerSlot, PriorityEntry};
use super::index::RegistryIndex;
use super::mediator::{Mediator, PurchaseMediator, SaleMediator};
use crate::domain::events::EventService;
use crate::domain::handler::{Handler, HandlerInfo};
use crate::domain::object::{ObjectType, Scope, Tradable};
use crate::domain::ports::ConfigProviderRef;
use crate::domain::side::{Purchase, Sale, Side};
use crate::error::{RegistrationError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A handler's position in the dispatch order of its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedHandler {
    pub info: HandlerInfo,
    pub priority: i32,
}

/// Everything the registry knows at one point in time.
///
/// `known` holds every handler reference offered to the registry and not
/// explicitly unregistered, including those currently rejected as disabled,
/// so a reload can bring them back.
#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, PriorityEntry>,
    index: RegistryIndex,
    known: HashMap<String, HandlerSlot>,
}

enum Notice {
    Registered(Arc<HandlerInfo>),
    Unregistered(Arc<HandlerInfo>),
}

/// Priority-ordered, type-indexed set of handlers and the dispatch over it.
///
/// Construct one per process and share it as `Arc<Registry>`. Every mutation
/// and every dispatch runs under a single lock. Registration events are
/// delivered while that lock is held, in the order the mutations happened,
/// so subscribers must not call back into the registry.
pub struct Registry {
    config: ConfigProviderRef,
    events: Arc<EventService>,
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new(config: ConfigProviderRef) -> Self {
        Self::with_events(config, Arc::new(EventService::new()))
    }

    pub fn with_events(config: ConfigProviderRef, events: Arc<EventService>) -> Self {
        Self {
            config,
            events,
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn events(&self) -> &Arc<EventService> {
        &self.events
    }

    pub fn config(&self) -> &ConfigProviderRef {
        &self.config
    }

    /// Registers `handler` under its declared object type.
    ///
    /// A handler already registered under the same id is unregistered first.
    pub fn register<H>(&self, handler: Arc<H>) -> std::result::Result<(), RegistrationError>
    where
        H: Handler + 'static,
    {
        let handler: Arc<dyn Handler<Object = H::Object>> = handler;
        self.register_shared(handler)
    }

    /// Like [`register`](Self::register), for handlers already behind a trait
    /// object.
    pub fn register_shared<T: Tradable>(
        &self,
        handler: Arc<dyn Handler<Object = T>>,
    ) -> std::result::Result<(), RegistrationError> {
        let slot = HandlerSlot::new(handler);
        let mut notices = Vec::new();
        let mut state = self.state.lock();
        let result = self.insert(&mut state, slot, &mut notices);
        self.publish(notices);
        result
    }

    fn insert(
        &self,
        state: &mut RegistryState,
        slot: HandlerSlot,
        notices: &mut Vec<Notice>,
    ) -> std::result::Result<(), RegistrationError> {
        let id = slot.id().to_string();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            warn!(handler = %id, "rejected handler with invalid id");
            return Err(RegistrationError::InvalidId(id));
        }

        if self.config.is_disabled(&id) {
            // An active handler stays the one a reload restores.
            if !state.entries.contains_key(&id) {
                state.known.insert(id.clone(), slot);
            }
            info!(handler = %id, "handler is disabled by configuration");
            return Err(RegistrationError::Disabled(id));
        }
        state.known.insert(id.clone(), slot.clone());

        if let Some(previous) = state.entries.remove(&id)
            && state.index.remove(&previous)
        {
            debug!(handler = %id, "replacing registered handler");
            notices.push(Notice::Unregistered(previous.info().clone()));
        }

        let priority = self.config.priority(&id, slot.declared_priority());
        let entry = PriorityEntry::new(slot, priority);
        if state.index.contains(&entry) {
            warn!(handler = %id, "handler id already present in its type group");
            return Err(RegistrationError::Duplicate(id));
        }

        let info = entry.info().clone();
        state.index.add(entry.clone());
        state.entries.insert(id.clone(), entry);
        self.config.ensure_entry(&id, priority);
        info!(handler = %id, provider = info.provider(), object_type = %info.object_type(), priority, "registered handler");
        notices.push(Notice::Registered(info));
        Ok(())
    }

    /// Removes the handler registered under `id`. Returns whether anything
    /// was removed; the unregistration event fires only in that case.
    pub fn unregister(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        state.known.remove(id);
        let entry = state.entries.remove(id);
        match entry {
            Some(entry) if state.index.remove(&entry) => {
                info!(handler = id, "unregistered handler");
                self.publish(vec![Notice::Unregistered(entry.info().clone())]);
                true
            }
            _ => false,
        }
    }

    pub fn unregister_handler<H: Handler + ?Sized>(&self, handler: &H) -> bool {
        self.unregister(handler.id())
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.state.lock().entries.contains_key(id)
    }

    pub fn is_handler_registered<H: Handler + ?Sized>(&self, handler: &H) -> bool {
        self.is_registered(handler.id())
    }

    /// Re-reads configuration and rebuilds the registry from every known
    /// handler reference.
    ///
    /// The new state replaces the old one in a single step, so concurrent
    /// dispatches see either snapshot, never a partial one. If configuration
    /// cannot be read the registry is left untouched.
    ///
    /// Events fire only for handlers whose registration changed: handlers
    /// that come back are announced as registered, handlers that drop out as
    /// unregistered. A handler that stays registered, even with a new
    /// priority, fires nothing.
    pub fn reload(&self) -> Result<()> {
        self.config.reload()?;

        let mut state = self.state.lock();
        let mut known: Vec<HandlerSlot> = state.known.values().cloned().collect();
        known.sort_by(|a, b| a.id().cmp(b.id()));

        let mut next = RegistryState::default();
        let mut restored = Vec::new();
        for slot in known {
            if let Err(e) = self.insert(&mut next, slot, &mut restored) {
                debug!("handler not restored on reload: {}", e);
            }
        }

        let mut notices: Vec<Notice> = restored
            .into_iter()
            .filter(|notice| match notice {
                Notice::Registered(info) => !state.entries.contains_key(info.id()),
                Notice::Unregistered(_) => false,
            })
            .collect();
        let mut dropped: Vec<&PriorityEntry> = state
            .entries
            .iter()
            .filter(|(id, _)| !next.entries.contains_key(*id))
            .map(|(_, entry)| entry)
            .collect();
        dropped.sort_by(|a, b| a.id().cmp(b.id()));
        notices.extend(dropped.into_iter().map(|entry| Notice::Unregistered(entry.info().clone())));

        info!(active = next.entries.len(), known = next.known.len(), "registry reloaded");
        *state = next;
        self.publish(notices);
        Ok(())
    }

    /// Drops every handler without consulting them or firing events.
    pub fn unregister_all(&self) {
        *self.state.lock() = RegistryState::default();
        info!("unregistered all handlers");
    }

    /// Selects the handler for buying `object` in `scope`.
    pub fn for_purchase<T: Tradable>(&self, scope: Scope, object: T) -> Option<PurchaseMediator<T>> {
        self.dispatch::<T, Purchase>(scope, object)
    }

    /// Selects the handler for selling `object` in `scope`.
    pub fn for_sale<T: Tradable>(&self, scope: Scope, object: T) -> Option<SaleMediator<T>> {
        self.dispatch::<T, Sale>(scope, object)
    }

    /// First acceptor wins; there is no retry once a handler is selected.
    ///
    /// A generous handler that could not actually complete the transaction is
    /// passed over without being asked whether it handles the case.
    fn dispatch<T: Tradable, D: Side>(&self, scope: Scope, object: T) -> Option<Mediator<T, D>> {
        let state = self.state.lock();
        let group = state.index.group(ObjectType::of::<T>())?;
        for entry in group.iter() {
            let Some(handler) = entry.slot().handler::<T>() else {
                continue;
            };
            if self.config.is_generous(entry.id()) && !D::permits(&*handler, scope, &object) {
                debug!(handler = entry.id(), direction = %D::DIRECTION, "generous handler yielded");
                continue;
            }
            if D::handles(&*handler, scope, &object) {
                debug!(handler = entry.id(), direction = %D::DIRECTION, "handler selected");
                return Some(Mediator::new(
                    handler,
                    entry.info().clone(),
                    self.events.clone(),
                    scope,
                    object,
                ));
            }
        }
        None
    }

    pub fn info(&self, id: &str) -> Option<HandlerInfo> {
        self.state.lock().entries.get(id).map(|entry| (**entry.info()).clone())
    }

    /// Registered handlers, sorted by id.
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        let state = self.state.lock();
        let mut handlers: Vec<HandlerInfo> =
            state.entries.values().map(|entry| (**entry.info()).clone()).collect();
        handlers.sort_by(|a, b| a.id().cmp(b.id()));
        handlers
    }

    /// Object types with at least one registered handler, sorted by name.
    pub fn types(&self) -> Vec<ObjectType> {
        let state = self.state.lock();
        let mut types: Vec<ObjectType> = state.index.groups().map(|group| group.object_type()).collect();
        types.sort_by_key(|object_type| object_type.name());
        types
    }

    /// Handlers of `object_type` in dispatch order.
    pub fn ranking(&self, object_type: ObjectType) -> Vec<RankedHandler> {
        let state = self.state.lock();
        state
            .index
            .group(object_type)
            .map(|group| {
                group
                    .iter()
                    .map(|entry| RankedHandler {
                        info: (**entry.info()).clone(),
                        priority: entry.priority(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Registered(info) => self.events.registered(&info),
                Notice::Unregistered(info) => self.events.unregistered(&info),
            }
        }
    }
}

use super::handler::HandlerInfo;
use super::record::TransactionView;
use super::side::Direction;
use parking_lot::RwLock;
use std::sync::Arc;

/// Observer of registry and transaction life-cycle events.
///
/// Every method has a no-op default so subscribers implement only what they
/// need. Callbacks run synchronously on the thread that caused the event and
/// must not block. Registration callbacks run under the registry lock and must
/// not call back into the registry.
pub trait BrokerEvents: Send + Sync {
    fn on_registered(&self, _info: &HandlerInfo) {}

    fn on_unregistered(&self, _info: &HandlerInfo) {}

    /// Called before a purchase is finalised as successful. Return `true` to
    /// cancel it.
    fn on_purchase_pre_process(&self, _info: &HandlerInfo, _pending: &TransactionView<'_>) -> bool {
        false
    }

    /// Called before a sale is finalised as successful. Return `true` to
    /// cancel it.
    fn on_sale_pre_process(&self, _info: &HandlerInfo, _pending: &TransactionView<'_>) -> bool {
        false
    }

    fn on_purchase_completed(&self, _info: &HandlerInfo, _record: &TransactionView<'_>) {}

    fn on_sale_completed(&self, _info: &HandlerInfo, _record: &TransactionView<'_>) {}
}

/// Fan-out point for [`BrokerEvents`] subscribers.
///
/// Subscribers are invoked in subscription order. The subscriber list is
/// copied before dispatch so a callback may subscribe further observers.
#[derive(Default)]
pub struct EventService {
    subscribers: RwLock<Vec<Arc<dyn BrokerEvents>>>,
}

impl EventService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn BrokerEvents>) {
        self.subscribers.write().push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn snapshot(&self) -> Vec<Arc<dyn BrokerEvents>> {
        self.subscribers.read().clone()
    }

    pub(crate) fn registered(&self, info: &HandlerInfo) {
        for subscriber in self.snapshot() {
            subscriber.on_registered(info);
        }
    }

    pub(crate) fn unregistered(&self, info: &HandlerInfo) {
        for subscriber in self.snapshot() {
            subscriber.on_unregistered(info);
        }
    }

    /// Returns whether any subscriber cancelled. All subscribers are notified
    /// even after one has cancelled.
    pub(crate) fn pre_process(&self, info: &HandlerInfo, pending: &TransactionView<'_>) -> bool {
        let mut cancelled = false;
        for subscriber in self.snapshot() {
            let vetoed = match pending.direction() {
                Direction::Purchase => subscriber.on_purchase_pre_process(info, pending),
                Direction::Sale => subscriber.on_sale_pre_process(info, pending),
            };
            cancelled |= vetoed;
        }
        cancelled
    }

    pub(crate) fn completed(&self, info: &HandlerInfo, record: &TransactionView<'_>) {
        for subscriber in self.snapshot() {
            match record.direction() {
                Direction::Purchase => subscriber.on_purchase_completed(info, record),
                Direction::Sale => subscriber.on_sale_completed(info, record),
            }
        }
    }
}

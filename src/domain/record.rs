//! Two-phase transaction records.
//!
//! A handler stages a transaction in a [`RecordBuilder`], then finalises it
//! exactly once into an immutable [`TransactionRecord`]. Finalising as a
//! success gives pre-process subscribers the chance to cancel. The caller
//! performs the real exchange only for successful records and then calls
//! [`TransactionRecord::complete`], which runs the deferred completion action
//! at most once.

use super::events::EventService;
use super::handler::HandlerInfo;
use super::object::{Scope, Tradable};
use super::side::{Direction, Purchase, Sale, Side};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

type CompletionAction = Box<dyn FnOnce() + Send>;

pub type PurchaseRecord<T> = TransactionRecord<T, Purchase>;
pub type SaleRecord<T> = TransactionRecord<T, Sale>;
pub type PurchaseRecordBuilder<T> = RecordBuilder<T, Purchase>;
pub type SaleRecordBuilder<T> = RecordBuilder<T, Sale>;

/// Read-only, type-erased view of a pending or completed transaction.
#[derive(Clone, Copy)]
pub struct TransactionView<'a> {
    direction: Direction,
    object: &'a dyn Any,
    scope: Scope,
    volume: u32,
    value: Decimal,
    listing: bool,
}

impl<'a> TransactionView<'a> {
    pub(crate) fn new(
        direction: Direction,
        object: &'a dyn Any,
        scope: Scope,
        volume: u32,
        value: Decimal,
        listing: bool,
    ) -> Self {
        Self {
            direction,
            object,
            scope,
            volume,
            value,
            listing,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn object(&self) -> &'a dyn Any {
        self.object
    }

    /// The transacted object, if it is a `T`.
    pub fn object_as<T: Any>(&self) -> Option<&'a T> {
        self.object.downcast_ref::<T>()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn actor(&self) -> Option<Uuid> {
        self.scope.actor()
    }

    pub fn context(&self) -> Option<Uuid> {
        self.scope.context()
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_listing(&self) -> bool {
        self.listing
    }
}

impl fmt::Debug for TransactionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionView")
            .field("direction", &self.direction)
            .field("scope", &self.scope)
            .field("volume", &self.volume)
            .field("value", &self.value)
            .field("listing", &self.listing)
            .finish_non_exhaustive()
    }
}

/// Mutable staging area for one transaction.
///
/// Created by a handler through a request's `start` method. Consumed by
/// [`build_success`](Self::build_success),
/// [`build_success_with`](Self::build_success_with) or
/// [`build_failure`](Self::build_failure).
pub struct RecordBuilder<T, D> {
    info: Arc<HandlerInfo>,
    events: Arc<EventService>,
    object: T,
    scope: Scope,
    volume: u32,
    value: Decimal,
    listing: bool,
    side: PhantomData<D>,
}

impl<T: Tradable, D: Side> RecordBuilder<T, D> {
    pub(crate) fn new(
        info: Arc<HandlerInfo>,
        events: Arc<EventService>,
        object: T,
        scope: Scope,
        listing: bool,
    ) -> Self {
        Self {
            info,
            events,
            object,
            scope,
            volume: 1,
            value: Decimal::ZERO,
            listing,
            side: PhantomData,
        }
    }

    pub fn info(&self) -> &HandlerInfo {
        &self.info
    }

    pub fn object(&self) -> &T {
        &self.object
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// The staged value; always zero while the transaction is a listing.
    pub fn value(&self) -> Decimal {
        if self.listing { Decimal::ZERO } else { self.value }
    }

    /// # Panics
    ///
    /// Panics if `volume` is zero.
    pub fn set_volume(mut self, volume: u32) -> Self {
        assert!(volume > 0, "transaction volume must be positive");
        self.volume = volume;
        self
    }

    /// Stores the absolute value of `value`; the sign carries no meaning.
    pub fn set_value(mut self, value: Decimal) -> Self {
        self.value = value.abs();
        self
    }

    /// Finalises as a success with no completion action.
    pub fn build_success(self) -> TransactionRecord<T, D> {
        self.build_success_with(|| {})
    }

    /// Finalises as a success, deferring `on_complete` until
    /// [`TransactionRecord::complete`].
    ///
    /// Pre-process subscribers see the pending transaction first; if any of
    /// them cancels, the record is failed and `on_complete` is dropped.
    pub fn build_success_with<F>(self, on_complete: F) -> TransactionRecord<T, D>
    where
        F: FnOnce() + Send + 'static,
    {
        let cancelled = self.events.pre_process(&self.info, &self.view());
        if cancelled {
            debug!(handler = self.info.id(), direction = %D::DIRECTION, "transaction cancelled by subscriber");
            let reason = D::DIRECTION.cancel_reason().to_string();
            return self.finish(None, Some(reason));
        }
        self.finish(Some(Box::new(on_complete)), None)
    }

    /// Finalises as a failure. Pre-process subscribers are not consulted.
    pub fn build_failure(self, reason: impl Into<String>) -> TransactionRecord<T, D> {
        let mut reason = reason.into();
        if reason.is_empty() {
            reason = format!("{} failed", D::DIRECTION);
        }
        self.finish(None, Some(reason))
    }

    fn view(&self) -> TransactionView<'_> {
        TransactionView::new(
            D::DIRECTION,
            &self.object,
            self.scope,
            self.volume,
            self.value(),
            self.listing,
        )
    }

    fn finish(self, on_complete: Option<CompletionAction>, failure: Option<String>) -> TransactionRecord<T, D> {
        let value = self.value();
        TransactionRecord {
            info: self.info,
            events: self.events,
            object: self.object,
            scope: self.scope,
            volume: self.volume,
            value,
            listing: self.listing,
            failure,
            on_complete: Mutex::new(on_complete),
            side: PhantomData,
        }
    }
}

impl<T: Tradable> RecordBuilder<T, Sale> {
    /// Marks the sale as a listing: offered, with no funds changing hands.
    ///
    /// There is no way back; a listing requested by the caller stays one.
    pub fn set_listing(mut self) -> Self {
        self.listing = true;
        self
    }

    pub fn is_listing(&self) -> bool {
        self.listing
    }
}

/// Authoritative outcome of a buy or sell attempt.
///
/// Immutable apart from its completion gate. `Send + Sync`, so it may be
/// completed from any thread.
pub struct TransactionRecord<T, D> {
    info: Arc<HandlerInfo>,
    events: Arc<EventService>,
    object: T,
    scope: Scope,
    volume: u32,
    value: Decimal,
    listing: bool,
    failure: Option<String>,
    on_complete: Mutex<Option<CompletionAction>>,
    side: PhantomData<D>,
}

impl<T: Tradable, D: Side> TransactionRecord<T, D> {
    /// The handler that produced this record.
    pub fn info(&self) -> &HandlerInfo {
        &self.info
    }

    pub fn direction(&self) -> Direction {
        D::DIRECTION
    }

    pub fn is_purchase(&self) -> bool {
        D::DIRECTION == Direction::Purchase
    }

    pub fn is_sale(&self) -> bool {
        D::DIRECTION == Direction::Sale
    }

    pub fn object(&self) -> &T {
        &self.object
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn actor(&self) -> Option<Uuid> {
        self.scope.actor()
    }

    pub fn context(&self) -> Option<Uuid> {
        self.scope.context()
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether a successful record has already been completed.
    pub fn is_completed(&self) -> bool {
        self.is_success() && self.on_complete.lock().is_none()
    }

    /// Runs the deferred completion action and fires the completion event.
    ///
    /// Returns `false` without side effects when the record failed or was
    /// already completed, so it is always safe to call again.
    pub fn complete(&self) -> bool {
        if self.failure.is_some() {
            return false;
        }
        let Some(action) = self.on_complete.lock().take() else {
            return false;
        };
        action();
        self.events.completed(&self.info, &self.view());
        true
    }

    pub fn view(&self) -> TransactionView<'_> {
        TransactionView::new(
            D::DIRECTION,
            &self.object,
            self.scope,
            self.volume,
            self.value,
            self.listing,
        )
    }
}

impl<T: Tradable> TransactionRecord<T, Sale> {
    pub fn is_listing(&self) -> bool {
        self.listing
    }
}

impl<T: fmt::Debug, D> fmt::Debug for TransactionRecord<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRecord")
            .field("handler", &self.info.id())
            .field("object", &self.object)
            .field("scope", &self.scope)
            .field("volume", &self.volume)
            .field("value", &self.value)
            .field("listing", &self.listing)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

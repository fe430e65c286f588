use super::events::EventService;
use super::handler::HandlerInfo;
use super::object::{Scope, Tradable};
use super::record::RecordBuilder;
use super::side::{Purchase, Sale, Side};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

pub type PurchaseRequest<'a, T> = TransactionRequest<'a, T, Purchase>;
pub type SaleRequest<'a, T> = TransactionRequest<'a, T, Sale>;

/// What a handler receives when asked to buy or sell.
///
/// Carries the bound scope, object and requested volume, and is the only way
/// for a handler to open a [`RecordBuilder`].
pub struct TransactionRequest<'a, T, D> {
    info: &'a Arc<HandlerInfo>,
    events: &'a Arc<EventService>,
    scope: Scope,
    object: &'a T,
    volume: u32,
    listing: bool,
    side: PhantomData<D>,
}

impl<'a, T: Tradable, D: Side> TransactionRequest<'a, T, D> {
    pub(crate) fn new(
        info: &'a Arc<HandlerInfo>,
        events: &'a Arc<EventService>,
        scope: Scope,
        object: &'a T,
        volume: u32,
        listing: bool,
    ) -> Self {
        Self {
            info,
            events,
            scope,
            object,
            volume,
            listing,
            side: PhantomData,
        }
    }

    pub fn info(&self) -> &HandlerInfo {
        self.info
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

    pub fn object(&self) -> &'a T {
        self.object
    }

    /// Volume requested by the caller.
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Opens a builder for this transaction.
    ///
    /// The builder starts at volume 1 and value zero; a sale requested as a
    /// listing starts as a listing.
    pub fn start(&self) -> RecordBuilder<T, D> {
        RecordBuilder::new(
            Arc::clone(self.info),
            Arc::clone(self.events),
            self.object.clone(),
            self.scope,
            self.listing,
        )
    }
}

impl<T: Tradable> TransactionRequest<'_, T, Sale> {
    /// Whether the caller asked for a listing rather than a sale.
    pub fn is_listing(&self) -> bool {
        self.listing
    }

    /// Opens a builder that is a listing regardless of what was requested.
    pub fn start_listing(&self) -> RecordBuilder<T, Sale> {
        self.start().set_listing()
    }
}

use crate::domain::events::EventService;
use crate::domain::handler::{Handler, HandlerInfo};
use crate::domain::object::{Scope, Tradable};
use crate::domain::record::{PurchaseRecord, SaleRecord};
use crate::domain::request::TransactionRequest;
use crate::domain::side::{Purchase, Sale, Side};
use rust_decimal::Decimal;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub type PurchaseMediator<T> = Mediator<T, Purchase>;
pub type SaleMediator<T> = Mediator<T, Sale>;

/// Request-scoped handle binding the selected handler to one scope and
/// object.
///
/// Exposes only the operations of its direction and never the handler
/// itself. Holds no state beyond the binding, and no registry lock.
pub struct Mediator<T: Tradable, D> {
    handler: Arc<dyn Handler<Object = T>>,
    info: Arc<HandlerInfo>,
    events: Arc<EventService>,
    scope: Scope,
    object: T,
    side: PhantomData<D>,
}

impl<T: Tradable, D: Side> Mediator<T, D> {
    pub(crate) fn new(
        handler: Arc<dyn Handler<Object = T>>,
        info: Arc<HandlerInfo>,
        events: Arc<EventService>,
        scope: Scope,
        object: T,
    ) -> Self {
        Self {
            handler,
            info,
            events,
            scope,
            object,
            side: PhantomData,
        }
    }

    pub fn info(&self) -> &HandlerInfo {
        &self.info
    }

    pub fn provider(&self) -> &str {
        self.info.provider()
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

    pub fn object(&self) -> &T {
        &self.object
    }

    pub fn display_name(&self) -> String {
        self.handler.display_name(self.scope, &self.object)
    }

    fn request(&self, volume: u32, listing: bool) -> TransactionRequest<'_, T, D> {
        assert!(volume > 0, "transaction volume must be positive");
        debug!(handler = self.info.id(), direction = %D::DIRECTION, volume, listing, "transaction requested");
        TransactionRequest::new(&self.info, &self.events, self.scope, &self.object, volume, listing)
    }
}

impl<T: Tradable> Mediator<T, Purchase> {
    pub fn can_be_bought(&self) -> bool {
        self.handler.can_be_bought(self.scope, &self.object)
    }

    /// Price of `volume` units; `None` means not priced or forbidden.
    pub fn buy_price(&self, volume: u32) -> Option<Decimal> {
        self.handler.buy_price(self.scope, &self.object, volume)
    }

    pub fn unit_buy_price(&self) -> Option<Decimal> {
        self.buy_price(1)
    }

    /// # Panics
    ///
    /// Panics if `volume` is zero.
    pub fn buy(&self, volume: u32) -> PurchaseRecord<T> {
        self.handler.buy(self.request(volume, false))
    }

    pub fn buy_one(&self) -> PurchaseRecord<T> {
        self.buy(1)
    }
}

impl<T: Tradable> Mediator<T, Sale> {
    pub fn can_be_sold(&self) -> bool {
        self.handler.can_be_sold(self.scope, &self.object)
    }

    /// Price of `volume` units; `None` means not priced or forbidden.
    pub fn sell_price(&self, volume: u32) -> Option<Decimal> {
        self.handler.sell_price(self.scope, &self.object, volume)
    }

    pub fn unit_sell_price(&self) -> Option<Decimal> {
        self.sell_price(1)
    }

    /// # Panics
    ///
    /// Panics if `volume` is zero.
    pub fn sell(&self, volume: u32) -> SaleRecord<T> {
        self.handler.sell(self.request(volume, false))
    }

    pub fn sell_one(&self) -> SaleRecord<T> {
        self.sell(1)
    }

    /// Offers `volume` units for sale without funds changing hands. The
    /// resulting record's value is always zero.
    pub fn list(&self, volume: u32) -> SaleRecord<T> {
        self.handler.sell(self.request(volume, true))
    }
}

use super::object::{ObjectType, Scope, Tradable};
use super::record::{PurchaseRecord, SaleRecord};
use super::request::{PurchaseRequest, SaleRequest};
use rust_decimal::Decimal;

/// A plugin-supplied implementation that prices and executes transactions for
/// one object type.
///
/// The registry only ever holds a shared reference to a handler; it never
/// clones or wraps its behaviour. Predicates are evaluated while the registry
/// lock is held, so implementations must not block and must not call back
/// into the [`Registry`](crate::application::registry::Registry).
pub trait Handler: Send + Sync {
    /// The concrete type this handler transacts.
    type Object: Tradable;

    /// Globally unique identifier. Must be non-empty and free of whitespace.
    fn id(&self) -> &str;

    /// Name of the plugin or component supplying this handler.
    fn provider(&self) -> &str;

    /// Self-declared priority, used unless configuration overrides it.
    fn priority(&self) -> i8 {
        0
    }

    /// Whether this handler claims the purchase of `object` in `scope`.
    fn handles_purchase(&self, scope: Scope, object: &Self::Object) -> bool;

    /// Whether this handler claims the sale of `object` in `scope`.
    fn handles_sale(&self, scope: Scope, object: &Self::Object) -> bool;

    /// Whether a purchase would actually succeed right now.
    fn can_be_bought(&self, scope: Scope, object: &Self::Object) -> bool;

    /// Whether a sale would actually succeed right now.
    fn can_be_sold(&self, scope: Scope, object: &Self::Object) -> bool;

    /// Price for buying `volume` units, or `None` when purchase is forbidden.
    fn buy_price(&self, scope: Scope, object: &Self::Object, volume: u32) -> Option<Decimal>;

    /// Price for selling `volume` units, or `None` when sale is forbidden.
    fn sell_price(&self, scope: Scope, object: &Self::Object, volume: u32) -> Option<Decimal>;

    /// Builds the purchase record. Start it with [`PurchaseRequest::start`].
    fn buy(&self, request: PurchaseRequest<'_, Self::Object>) -> PurchaseRecord<Self::Object>;

    /// Builds the sale record. Start it with [`SaleRequest::start`] or
    /// [`SaleRequest::start_listing`].
    fn sell(&self, request: SaleRequest<'_, Self::Object>) -> SaleRecord<Self::Object>;

    fn display_name(&self, scope: Scope, object: &Self::Object) -> String;
}

/// Public identity of a registered handler.
///
/// This is all event subscribers and callers ever see of a handler, so the
/// registry's dispatch rules cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerInfo {
    id: String,
    provider: String,
    object_type: ObjectType,
}

impl HandlerInfo {
    pub(crate) fn new(id: &str, provider: &str, object_type: ObjectType) -> Self {
        Self {
            id: id.to_string(),
            provider: provider.to_string(),
            object_type,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }
}

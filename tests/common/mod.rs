#![allow(dead_code)]

use broker::{
    BrokerEvents, ConfigProvider, Handler, HandlerInfo, PurchaseRecord, PurchaseRequest, Registry,
    SaleRecord, SaleRequest, Scope, TransactionView,
};
use broker::infrastructure::in_memory::MemoryConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, AtomicI8, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

pub const INTEGER_ID: &str = "IntegerHandler";
pub const CATCH_ALL_ID: &str = "CatchAllHandler";
pub const NAN_ID: &str = "NaNHandler";
pub const ALPHANUMERIC_ID: &str = "AlphanumericHandler";
pub const DECIMAL_ID: &str = "DecimalHandler";

/// A string handler whose behaviour is assembled from plain functions.
pub struct StringHandler {
    pub id: &'static str,
    pub priority: AtomicI8,
    pub accepts: fn(&str) -> bool,
    pub feasible: fn(Scope, &str) -> bool,
    pub unit_price: Decimal,
    pub completions: Arc<AtomicUsize>,
}

impl StringHandler {
    pub fn new(id: &'static str, priority: i8, accepts: fn(&str) -> bool) -> Self {
        Self {
            id,
            priority: AtomicI8::new(priority),
            accepts,
            feasible: |_, _| true,
            unit_price: dec!(100),
            completions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Accepts strings that parse as integers. Priority 10.
    pub fn integer() -> Self {
        Self::new(INTEGER_ID, 10, |s| s.parse::<i64>().is_ok())
    }

    /// Accepts every string. Priority -10.
    pub fn catch_all() -> Self {
        Self::new(CATCH_ALL_ID, -10, |_| true)
    }

    /// Accepts strings that are not numbers. Priority 0.
    pub fn nan() -> Self {
        Self::new(NAN_ID, 0, |s| s.parse::<f64>().is_err())
    }

    /// Accepts non-empty strings of letters and digits. Priority -10.
    pub fn alphanumeric() -> Self {
        Self::new(ALPHANUMERIC_ID, -10, |s| {
            !s.is_empty() && s.chars().all(char::is_alphanumeric)
        })
    }

    pub fn with_feasibility(mut self, feasible: fn(Scope, &str) -> bool) -> Self {
        self.feasible = feasible;
        self
    }

    /// Changes the priority the handler declares from now on.
    pub fn declare_priority(&self, priority: i8) {
        self.priority.store(priority, Ordering::SeqCst);
    }

    pub fn completed(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl Handler for StringHandler {
    type Object = String;

    fn id(&self) -> &str {
        self.id
    }

    fn provider(&self) -> &str {
        "tests"
    }

    fn priority(&self) -> i8 {
        self.priority.load(Ordering::SeqCst)
    }

    fn handles_purchase(&self, _scope: Scope, object: &String) -> bool {
        (self.accepts)(object)
    }

    fn handles_sale(&self, _scope: Scope, object: &String) -> bool {
        (self.accepts)(object)
    }

    fn can_be_bought(&self, scope: Scope, object: &String) -> bool {
        (self.accepts)(object) && (self.feasible)(scope, object)
    }

    fn can_be_sold(&self, scope: Scope, object: &String) -> bool {
        (self.accepts)(object) && (self.feasible)(scope, object)
    }

    fn buy_price(&self, _scope: Scope, _object: &String, volume: u32) -> Option<Decimal> {
        Some(self.unit_price * Decimal::from(volume))
    }

    fn sell_price(&self, _scope: Scope, _object: &String, volume: u32) -> Option<Decimal> {
        Some(self.unit_price * Decimal::from(volume))
    }

    fn buy(&self, request: PurchaseRequest<'_, String>) -> PurchaseRecord<String> {
        if !self.can_be_bought(request.scope(), request.object()) {
            return request.start().build_failure("Not available");
        }
        let volume = request.volume();
        let completions = self.completions.clone();
        request
            .start()
            .set_volume(volume)
            .set_value(self.unit_price * Decimal::from(volume))
            .build_success_with(move || {
                completions.fetch_add(1, Ordering::SeqCst);
            })
    }

    fn sell(&self, request: SaleRequest<'_, String>) -> SaleRecord<String> {
        let volume = request.volume();
        let completions = self.completions.clone();
        request
            .start()
            .set_volume(volume)
            .set_value(self.unit_price * Decimal::from(volume))
            .build_success_with(move || {
                completions.fetch_add(1, Ordering::SeqCst);
            })
    }

    fn display_name(&self, _scope: Scope, object: &String) -> String {
        format!("{} ({})", object, self.id)
    }
}

/// Accepts every decimal. Priority 0.
pub struct DecimalHandler;

impl Handler for DecimalHandler {
    type Object = Decimal;

    fn id(&self) -> &str {
        DECIMAL_ID
    }

    fn provider(&self) -> &str {
        "tests"
    }

    fn handles_purchase(&self, _scope: Scope, _object: &Decimal) -> bool {
        true
    }

    fn handles_sale(&self, _scope: Scope, _object: &Decimal) -> bool {
        true
    }

    fn can_be_bought(&self, _scope: Scope, _object: &Decimal) -> bool {
        true
    }

    fn can_be_sold(&self, _scope: Scope, _object: &Decimal) -> bool {
        true
    }

    fn buy_price(&self, _scope: Scope, object: &Decimal, volume: u32) -> Option<Decimal> {
        Some(*object * Decimal::from(volume))
    }

    fn sell_price(&self, _scope: Scope, _object: &Decimal, _volume: u32) -> Option<Decimal> {
        None
    }

    fn buy(&self, request: PurchaseRequest<'_, Decimal>) -> PurchaseRecord<Decimal> {
        let value = *request.object() * Decimal::from(request.volume());
        request.start().set_volume(request.volume()).set_value(value).build_success()
    }

    fn sell(&self, request: SaleRequest<'_, Decimal>) -> SaleRecord<Decimal> {
        request.start().build_failure("Decimals cannot be sold")
    }

    fn display_name(&self, _scope: Scope, object: &Decimal) -> String {
        object.to_string()
    }
}

/// Counts every event and optionally cancels pre-processed transactions.
#[derive(Default)]
pub struct RecordingEvents {
    pub cancel: AtomicBool,
    pub registered: AtomicUsize,
    pub unregistered: AtomicUsize,
    pub purchase_pre_processed: AtomicUsize,
    pub sale_pre_processed: AtomicUsize,
    pub purchases_completed: AtomicUsize,
    pub sales_completed: AtomicUsize,
    pub last_pending_volume: AtomicU32,
}

impl RecordingEvents {
    pub fn set_cancel(&self, cancel: bool) {
        self.cancel.store(cancel, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl BrokerEvents for RecordingEvents {
    fn on_registered(&self, _info: &HandlerInfo) {
        self.registered.fetch_add(1, Ordering::SeqCst);
    }

    fn on_unregistered(&self, _info: &HandlerInfo) {
        self.unregistered.fetch_add(1, Ordering::SeqCst);
    }

    fn on_purchase_pre_process(&self, _info: &HandlerInfo, pending: &TransactionView<'_>) -> bool {
        self.purchase_pre_processed.fetch_add(1, Ordering::SeqCst);
        self.last_pending_volume.store(pending.volume(), Ordering::SeqCst);
        self.cancel.load(Ordering::SeqCst)
    }

    fn on_sale_pre_process(&self, _info: &HandlerInfo, pending: &TransactionView<'_>) -> bool {
        self.sale_pre_processed.fetch_add(1, Ordering::SeqCst);
        self.last_pending_volume.store(pending.volume(), Ordering::SeqCst);
        self.cancel.load(Ordering::SeqCst)
    }

    fn on_purchase_completed(&self, _info: &HandlerInfo, _record: &TransactionView<'_>) {
        self.purchases_completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_sale_completed(&self, _info: &HandlerInfo, _record: &TransactionView<'_>) {
        self.sales_completed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Fixture {
    pub registry: Registry,
    pub config: Arc<MemoryConfig>,
    pub events: Arc<RecordingEvents>,
}

/// An empty registry over an in-memory config, with a recording subscriber.
pub fn fixture() -> Fixture {
    let config = Arc::new(MemoryConfig::new());
    let provider: Arc<dyn ConfigProvider> = config.clone();
    let registry = Registry::new(provider);
    let events = Arc::new(RecordingEvents::default());
    registry.events().subscribe(events.clone());
    Fixture {
        registry,
        config,
        events,
    }
}

pub fn player() -> Scope {
    Scope::new(Some(uuid::Uuid::new_v4()), Some(uuid::Uuid::new_v4()))
}

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

pub use application::mediator::{Mediator, PurchaseMediator, SaleMediator};
pub use application::registry::{RankedHandler, Registry};
pub use domain::events::{BrokerEvents, EventService};
pub use domain::handler::{Handler, HandlerInfo};
pub use domain::object::{ObjectType, Scope, Tradable};
pub use domain::ports::ConfigProvider;
pub use domain::record::{PurchaseRecord, RecordBuilder, SaleRecord, TransactionRecord, TransactionView};
pub use domain::request::{PurchaseRequest, SaleRequest, TransactionRequest};
pub use domain::side::{Direction, Purchase, Sale, Side};
pub use error::{BrokerError, RegistrationError};

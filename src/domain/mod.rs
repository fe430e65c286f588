//! Domain layer: the handler contract, transaction records, event hooks and
//! the configuration port the registry consumes.

pub mod events;
pub mod handler;
pub mod object;
pub mod ports;
pub mod record;
pub mod request;
pub mod side;

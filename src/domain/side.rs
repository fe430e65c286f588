use super::handler::Handler;
use super::object::{Scope, Tradable};
use std::fmt;

/// Direction of a transaction, as seen from the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Purchase,
    Sale,
}

impl Direction {
    /// Failure reason given to records cancelled by a pre-process subscriber.
    pub fn cancel_reason(self) -> &'static str {
        match self {
            Direction::Purchase => "Purchase cancelled",
            Direction::Sale => "Sale cancelled",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Purchase => f.write_str("purchase"),
            Direction::Sale => f.write_str("sale"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Purchase {}
    impl Sealed for super::Sale {}
}

/// Type-level transaction direction.
///
/// Requests, builders, records and mediators are parameterised by a side so a
/// purchase can never be completed through sale operations or vice versa.
pub trait Side: sealed::Sealed + Send + Sync + 'static {
    const DIRECTION: Direction;

    /// The handler's claim predicate for this direction.
    fn handles<T: Tradable>(handler: &dyn Handler<Object = T>, scope: Scope, object: &T) -> bool;

    /// The handler's feasibility predicate for this direction.
    fn permits<T: Tradable>(handler: &dyn Handler<Object = T>, scope: Scope, object: &T) -> bool;
}

/// Marker for the buying side.
#[derive(Debug)]
pub enum Purchase {}

/// Marker for the selling side.
#[derive(Debug)]
pub enum Sale {}

impl Side for Purchase {
    const DIRECTION: Direction = Direction::Purchase;

    fn handles<T: Tradable>(handler: &dyn Handler<Object = T>, scope: Scope, object: &T) -> bool {
        handler.handles_purchase(scope, object)
    }

    fn permits<T: Tradable>(handler: &dyn Handler<Object = T>, scope: Scope, object: &T) -> bool {
        handler.can_be_bought(scope, object)
    }
}

impl Side for Sale {
    const DIRECTION: Direction = Direction::Sale;

    fn handles<T: Tradable>(handler: &dyn Handler<Object = T>, scope: Scope, object: &T) -> bool {
        handler.handles_sale(scope, object)
    }

    fn permits<T: Tradable>(handler: &dyn Handler<Object = T>, scope: Scope, object: &T) -> bool {
        handler.can_be_sold(scope, object)
    }
}

//! Application layer: the handler registry and the dispatch over it.
//!
//! The [`registry::Registry`] keeps handlers in per-type groups ordered by
//! effective priority, and answers purchase and sale requests with a
//! direction-specific [`mediator::Mediator`].

pub(crate) mod entry;
pub(crate) mod index;
pub mod mediator;
pub mod registry;

//! `kitforge-orders` — purchase lines and their part snapshots.
//!
//! When an assembly is added to an order, every bundle part is resolved to a
//! concrete variant and frozen as a [`PartLineItem`]. The quantity projector
//! turns a line plus its part source into the target unit count per variant;
//! the inventory reconciler consumes that map.

pub mod event;
pub mod line_item;
pub mod projection;
pub mod resolver;

pub use event::OrderEvent;
pub use line_item::{LineItem, Order, PartLineItem};
pub use projection::{LinePartSource, quantity_by_variant};
pub use resolver::resolve_part_line_items;

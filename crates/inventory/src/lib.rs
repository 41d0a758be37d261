//! `kitforge-inventory` — inventory units, shipments, and the reconcile plan.
//!
//! The heart of the crate is [`reconcile::plan_line`]: a pure diff between a
//! line's target unit counts and the units it currently holds, partitioned by
//! shipment shippability. Units on a shipped shipment are frozen; the plan
//! never touches them, and a reduction that would need to is reported as an
//! [`reconcile::UnresolvedReduction`] instead of silently converging.

pub mod event;
pub mod reconcile;
pub mod shipment;
pub mod unit;

pub use event::InventoryEvent;
pub use reconcile::{ReconcilePlan, UnitRequirement, UnresolvedReduction, plan_line};
pub use shipment::{Shipment, ShipmentState};
pub use unit::{InventoryUnit, UnitState};

//! Store traits: the persistence seams of the system.
//!
//! No storage assumptions: the in-memory implementations in [`memory`] cover
//! tests and the single-process binary; a SQL backend would implement the
//! same traits. All trait methods are synchronous and object-safe so services
//! can hold `Arc<dyn …>`.

pub mod memory;

use std::collections::BTreeMap;

use kitforge_catalog::{BundlePart, Product, Variant};
use kitforge_core::{
    BundlePartId, InventoryUnitId, LineItemId, OrderId, ProductId, ShipmentId, VariantId,
};
use kitforge_inventory::{InventoryUnit, Shipment, ShipmentState};
use kitforge_orders::{LineItem, Order, PartLineItem};

use crate::error::StoreError;

/// Maximum number of matches returned by the part search.
pub const PART_SEARCH_LIMIT: usize = 30;

/// Catalog persistence: products, variants, bundle parts.
pub trait CatalogStore: Send + Sync {
    fn insert_product(&self, product: Product) -> Result<(), StoreError>;
    fn product(&self, id: ProductId) -> Result<Product, StoreError>;
    fn update_product(&self, product: Product) -> Result<(), StoreError>;

    fn insert_variant(&self, variant: Variant) -> Result<(), StoreError>;
    fn variant(&self, id: VariantId) -> Result<Variant, StoreError>;
    fn update_variant(&self, variant: Variant) -> Result<(), StoreError>;
    fn variants_of(&self, product_id: ProductId) -> Result<Vec<Variant>, StoreError>;
    fn master_of(&self, product_id: ProductId) -> Result<Variant, StoreError>;

    fn insert_bundle_part(&self, part: BundlePart) -> Result<(), StoreError>;
    fn bundle_part(&self, id: BundlePartId) -> Result<BundlePart, StoreError>;
    fn update_bundle_part(&self, part: BundlePart) -> Result<(), StoreError>;
    /// Errors with `NotFound` on a missing (or already removed) id.
    fn remove_bundle_part(&self, id: BundlePartId) -> Result<(), StoreError>;
    fn bundle_parts(&self, assembly_id: ProductId) -> Result<Vec<BundlePart>, StoreError>;
    /// Lookup by the create-or-update key `(assembly, variant, deferred)`.
    fn find_bundle_part(
        &self,
        assembly_id: ProductId,
        variant_id: VariantId,
        deferred: bool,
    ) -> Result<Option<BundlePart>, StoreError>;

    /// The explicit is-this-an-assembly query.
    fn has_parts(&self, product_id: ProductId) -> Result<bool, StoreError>;

    /// Case-insensitive substring search on product name or master SKU,
    /// restricted to part-eligible products, capped at [`PART_SEARCH_LIMIT`].
    fn search_can_be_part(&self, query: &str) -> Result<Vec<Product>, StoreError>;
}

/// Order persistence: orders, line items and their part snapshots.
pub trait OrderStore: Send + Sync {
    fn insert_order(&self, order: Order) -> Result<(), StoreError>;
    fn order(&self, id: OrderId) -> Result<Order, StoreError>;

    /// Persist a line together with its full snapshot set, atomically:
    /// a line is never observable with a partial snapshot set.
    fn insert_line_with_parts(
        &self,
        line: LineItem,
        parts: Vec<PartLineItem>,
    ) -> Result<(), StoreError>;
    fn line_item(&self, id: LineItemId) -> Result<LineItem, StoreError>;
    fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItem>, StoreError>;
    fn update_line_quantity(&self, id: LineItemId, quantity: u32)
    -> Result<LineItem, StoreError>;
    /// Destroys the line and (cascade) its part snapshots.
    fn remove_line_item(&self, id: LineItemId) -> Result<(), StoreError>;

    fn part_line_items(&self, line_item_id: LineItemId) -> Result<Vec<PartLineItem>, StoreError>;
}

/// A set of unit mutations applied all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct UnitBatch {
    pub creates: Vec<InventoryUnit>,
    pub removals: Vec<InventoryUnitId>,
}

impl UnitBatch {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.removals.is_empty()
    }
}

/// Inventory persistence: units and shipments.
pub trait InventoryStore: Send + Sync {
    fn units_for_line(&self, line_item_id: LineItemId) -> Result<Vec<InventoryUnit>, StoreError>;
    fn units_for_shipment(&self, shipment_id: ShipmentId)
    -> Result<Vec<InventoryUnit>, StoreError>;

    /// Apply creations and removals as one atomic step. A removal referencing
    /// a missing unit fails the whole batch with no partial writes.
    fn apply_batch(&self, batch: UnitBatch) -> Result<(), StoreError>;

    /// Reattach one unit to another shipment (fulfilment-side move).
    fn move_unit_to_shipment(
        &self,
        unit_id: InventoryUnitId,
        shipment_id: ShipmentId,
    ) -> Result<(), StoreError>;

    fn insert_shipment(&self, shipment: Shipment) -> Result<(), StoreError>;
    fn shipment(&self, id: ShipmentId) -> Result<Shipment, StoreError>;
    fn shipments_for_order(&self, order_id: OrderId) -> Result<Vec<Shipment>, StoreError>;
    fn mark_shipment_shipped(&self, id: ShipmentId) -> Result<Shipment, StoreError>;

    /// Snapshot of every shipment's state, for shippability partitioning.
    fn shipment_states(&self) -> Result<BTreeMap<ShipmentId, ShipmentState>, StoreError>;
}

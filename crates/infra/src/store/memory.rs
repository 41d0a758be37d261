//! In-memory stores for tests/dev.
//!
//! Each store keeps its tables behind a single `RwLock`, which is what makes
//! multi-table operations (line + snapshots, unit batches) atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use kitforge_catalog::{BundlePart, Product, Variant};
use kitforge_core::{
    BundlePartId, InventoryUnitId, LineItemId, OrderId, PartLineItemId, ProductId, ShipmentId,
    VariantId,
};
use kitforge_inventory::{InventoryUnit, Shipment, ShipmentState};
use kitforge_orders::{LineItem, Order, PartLineItem};

use crate::error::StoreError;
use crate::store::{CatalogStore, InventoryStore, OrderStore, PART_SEARCH_LIMIT, UnitBatch};

#[derive(Debug, Default)]
struct CatalogTables {
    products: HashMap<ProductId, Product>,
    variants: HashMap<VariantId, Variant>,
    parts: HashMap<BundlePartId, BundlePart>,
}

/// In-memory catalog store.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<CatalogTables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if tables.products.contains_key(&product.id) {
            return Err(StoreError::duplicate("product", product.id));
        }
        tables.products.insert(product.id, product);
        Ok(())
    }

    fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    fn update_product(&self, product: Product) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if !tables.products.contains_key(&product.id) {
            return Err(StoreError::not_found("product", product.id));
        }
        tables.products.insert(product.id, product);
        Ok(())
    }

    fn insert_variant(&self, variant: Variant) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if tables.variants.contains_key(&variant.id) {
            return Err(StoreError::duplicate("variant", variant.id));
        }
        tables.variants.insert(variant.id, variant);
        Ok(())
    }

    fn variant(&self, id: VariantId) -> Result<Variant, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .variants
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("variant", id))
    }

    fn update_variant(&self, variant: Variant) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if !tables.variants.contains_key(&variant.id) {
            return Err(StoreError::not_found("variant", variant.id));
        }
        tables.variants.insert(variant.id, variant);
        Ok(())
    }

    fn variants_of(&self, product_id: ProductId) -> Result<Vec<Variant>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut variants: Vec<Variant> = tables
            .variants
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect();
        variants.sort_by_key(|v| v.id);
        Ok(variants)
    }

    fn master_of(&self, product_id: ProductId) -> Result<Variant, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .variants
            .values()
            .find(|v| v.product_id == product_id && v.is_master)
            .cloned()
            .ok_or_else(|| StoreError::not_found("master variant", product_id))
    }

    fn insert_bundle_part(&self, part: BundlePart) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if tables.parts.contains_key(&part.id) {
            return Err(StoreError::duplicate("bundle part", part.id));
        }
        tables.parts.insert(part.id, part);
        Ok(())
    }

    fn bundle_part(&self, id: BundlePartId) -> Result<BundlePart, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .parts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("bundle part", id))
    }

    fn update_bundle_part(&self, part: BundlePart) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if !tables.parts.contains_key(&part.id) {
            return Err(StoreError::not_found("bundle part", part.id));
        }
        tables.parts.insert(part.id, part);
        Ok(())
    }

    fn remove_bundle_part(&self, id: BundlePartId) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        tables
            .parts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("bundle part", id))
    }

    fn bundle_parts(&self, assembly_id: ProductId) -> Result<Vec<BundlePart>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut parts: Vec<BundlePart> = tables
            .parts
            .values()
            .filter(|p| p.assembly_id == assembly_id)
            .cloned()
            .collect();
        parts.sort_by_key(|p| p.id);
        Ok(parts)
    }

    fn find_bundle_part(
        &self,
        assembly_id: ProductId,
        variant_id: VariantId,
        deferred: bool,
    ) -> Result<Option<BundlePart>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .parts
            .values()
            .find(|p| {
                p.assembly_id == assembly_id
                    && p.part_variant_id == variant_id
                    && p.variant_selection_deferred == deferred
            })
            .cloned())
    }

    fn has_parts(&self, product_id: ProductId) -> Result<bool, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.parts.values().any(|p| p.assembly_id == product_id))
    }

    fn search_can_be_part(&self, query: &str) -> Result<Vec<Product>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let needle = query.to_lowercase();

        let mut matches: Vec<Product> = tables
            .products
            .values()
            .filter(|product| product.searchable_as_part())
            .filter(|product| {
                if product.name.to_lowercase().contains(&needle) {
                    return true;
                }
                tables
                    .variants
                    .values()
                    .any(|variant| {
                        variant.product_id == product.id
                            && variant.is_master
                            && variant.sku.to_lowercase().contains(&needle)
                    })
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        matches.truncate(PART_SEARCH_LIMIT);
        Ok(matches)
    }
}

#[derive(Debug, Default)]
struct OrderTables {
    orders: HashMap<OrderId, Order>,
    lines: HashMap<LineItemId, LineItem>,
    part_lines: HashMap<PartLineItemId, PartLineItem>,
}

/// In-memory order store.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<OrderTables>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if tables.orders.contains_key(&order.id) {
            return Err(StoreError::duplicate("order", order.id));
        }
        tables.orders.insert(order.id, order);
        Ok(())
    }

    fn order(&self, id: OrderId) -> Result<Order, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    fn insert_line_with_parts(
        &self,
        line: LineItem,
        parts: Vec<PartLineItem>,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if !tables.orders.contains_key(&line.order_id) {
            return Err(StoreError::not_found("order", line.order_id));
        }
        if tables.lines.contains_key(&line.id) {
            return Err(StoreError::duplicate("line item", line.id));
        }
        // One write lock for line + snapshots: all-or-nothing by construction.
        for part in parts {
            tables.part_lines.insert(part.id, part);
        }
        tables.lines.insert(line.id, line);
        Ok(())
    }

    fn line_item(&self, id: LineItemId) -> Result<LineItem, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .lines
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("line item", id))
    }

    fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItem>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut lines: Vec<LineItem> = tables
            .lines
            .values()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| l.id);
        Ok(lines)
    }

    fn update_line_quantity(
        &self,
        id: LineItemId,
        quantity: u32,
    ) -> Result<LineItem, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let line = tables
            .lines
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("line item", id))?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    fn remove_line_item(&self, id: LineItemId) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        tables
            .lines
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("line item", id))?;
        tables.part_lines.retain(|_, part| part.line_item_id != id);
        Ok(())
    }

    fn part_line_items(&self, line_item_id: LineItemId) -> Result<Vec<PartLineItem>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut parts: Vec<PartLineItem> = tables
            .part_lines
            .values()
            .filter(|p| p.line_item_id == line_item_id)
            .cloned()
            .collect();
        parts.sort_by_key(|p| p.id);
        Ok(parts)
    }
}

#[derive(Debug, Default)]
struct InventoryTables {
    units: HashMap<InventoryUnitId, InventoryUnit>,
    shipments: HashMap<ShipmentId, Shipment>,
}

/// In-memory inventory store.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<InventoryTables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn units_for_line(&self, line_item_id: LineItemId) -> Result<Vec<InventoryUnit>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut units: Vec<InventoryUnit> = tables
            .units
            .values()
            .filter(|u| u.line_item_id == line_item_id)
            .cloned()
            .collect();
        units.sort_by_key(|u| u.id);
        Ok(units)
    }

    fn units_for_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<Vec<InventoryUnit>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut units: Vec<InventoryUnit> = tables
            .units
            .values()
            .filter(|u| u.shipment_id == Some(shipment_id))
            .cloned()
            .collect();
        units.sort_by_key(|u| u.id);
        Ok(units)
    }

    fn apply_batch(&self, batch: UnitBatch) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        // Validate the whole batch before mutating anything.
        for removal in &batch.removals {
            if !tables.units.contains_key(removal) {
                return Err(StoreError::not_found("inventory unit", removal));
            }
        }
        for unit in &batch.creates {
            if tables.units.contains_key(&unit.id) {
                return Err(StoreError::duplicate("inventory unit", unit.id));
            }
        }

        for removal in &batch.removals {
            tables.units.remove(removal);
        }
        for unit in batch.creates {
            tables.units.insert(unit.id, unit);
        }
        Ok(())
    }

    fn move_unit_to_shipment(
        &self,
        unit_id: InventoryUnitId,
        shipment_id: ShipmentId,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if !tables.shipments.contains_key(&shipment_id) {
            return Err(StoreError::not_found("shipment", shipment_id));
        }
        let unit = tables
            .units
            .get_mut(&unit_id)
            .ok_or_else(|| StoreError::not_found("inventory unit", unit_id))?;
        unit.shipment_id = Some(shipment_id);
        Ok(())
    }

    fn insert_shipment(&self, shipment: Shipment) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if tables.shipments.contains_key(&shipment.id) {
            return Err(StoreError::duplicate("shipment", shipment.id));
        }
        tables.shipments.insert(shipment.id, shipment);
        Ok(())
    }

    fn shipment(&self, id: ShipmentId) -> Result<Shipment, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .shipments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("shipment", id))
    }

    fn shipments_for_order(&self, order_id: OrderId) -> Result<Vec<Shipment>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut shipments: Vec<Shipment> = tables
            .shipments
            .values()
            .filter(|s| s.order_id == order_id)
            .cloned()
            .collect();
        shipments.sort_by_key(|s| s.id);
        Ok(shipments)
    }

    fn mark_shipment_shipped(&self, id: ShipmentId) -> Result<Shipment, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let shipment = tables
            .shipments
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("shipment", id))?;
        shipment.state = ShipmentState::Shipped;
        Ok(shipment.clone())
    }

    fn shipment_states(&self) -> Result<BTreeMap<ShipmentId, ShipmentState>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .shipments
            .values()
            .map(|s| (s.id, s.state))
            .collect())
    }
}

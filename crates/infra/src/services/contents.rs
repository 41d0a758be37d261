//! Order contents: adding assemblies to orders, changing line quantities.
//!
//! Line creation always runs the part resolver when the target variant's
//! product is an assembly — explicit composition, not an alias around a
//! plain add. Every mutation reconciles inventory synchronously.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::info;
use uuid::Uuid;

use kitforge_core::{
    BundlePartId, DomainError, LineItemId, OrderId, ShipmentId, VariantId,
};
use kitforge_events::{EventBus, EventEnvelope};
use kitforge_orders::{LineItem, Order, OrderEvent, resolve_part_line_items};

use crate::error::ServiceResult;
use crate::services::order_inventory::{OrderInventoryService, ReconciliationReport};
use crate::services::publish;
use crate::store::{CatalogStore, OrderStore};

/// Mutates order lines and keeps their inventory converged.
pub struct OrderContentsService<B> {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogStore>,
    inventory: Arc<OrderInventoryService<B>>,
    bus: B,
}

impl<B> OrderContentsService<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        inventory: Arc<OrderInventoryService<B>>,
        bus: B,
    ) -> Self {
        Self {
            orders,
            catalog,
            inventory,
            bus,
        }
    }

    pub fn create_order(&self) -> ServiceResult<Order> {
        let order = Order::new();
        self.orders.insert_order(order.clone())?;
        Ok(order)
    }

    /// Add `quantity` of a variant to the order.
    ///
    /// For an assembly, every bundle part is resolved (buyer selections for
    /// deferred slots) and the snapshot set persists atomically with the
    /// line; a missing selection fails the whole add with no writes.
    pub fn add_to_order(
        &self,
        order_id: OrderId,
        variant_id: VariantId,
        quantity: u32,
        selected_variants: &BTreeMap<BundlePartId, VariantId>,
    ) -> ServiceResult<(LineItem, ReconciliationReport)> {
        self.orders.order(order_id)?;
        let variant = self.catalog.variant(variant_id)?;

        let line = LineItem::new(order_id, variant_id, quantity)?;

        let parts = self.catalog.bundle_parts(variant.product_id)?;
        let snapshots = if parts.is_empty() {
            Vec::new()
        } else {
            resolve_part_line_items(line.id, &parts, selected_variants)?
        };
        let snapshot_count = snapshots.len() as u32;

        self.orders.insert_line_with_parts(line.clone(), snapshots)?;
        info!(order_id = %order_id, line_item_id = %line.id, quantity,
              parts = snapshot_count, "line item added");
        publish(
            &self.bus,
            Uuid::from(line.id),
            "orders.line_item",
            &OrderEvent::LineItemAdded {
                order_id,
                line_item_id: line.id,
                variant_id,
                quantity,
                part_line_items: snapshot_count,
                occurred_at: Utc::now(),
            },
        )?;

        let report = self.inventory.verify(line.id, None)?;
        Ok((line, report))
    }

    /// Change a line's purchased quantity and reconcile.
    ///
    /// `shipment_hint` marks the shipment being edited so the reconciler can
    /// route new units there and disturb it last on removals.
    pub fn set_line_quantity(
        &self,
        line_item_id: LineItemId,
        quantity: u32,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<(LineItem, ReconciliationReport)> {
        if quantity == 0 {
            return Err(
                DomainError::validation("quantity", "must be greater than 0").into(),
            );
        }

        let line = self.orders.update_line_quantity(line_item_id, quantity)?;
        publish(
            &self.bus,
            Uuid::from(line_item_id),
            "orders.line_item",
            &OrderEvent::LineQuantityChanged {
                line_item_id,
                quantity,
                occurred_at: Utc::now(),
            },
        )?;

        let report = self.inventory.verify(line_item_id, shipment_hint)?;
        Ok((line, report))
    }

    /// Destroy a line: its open units converge to zero first, then the line
    /// and its part snapshots are removed.
    pub fn remove_line(&self, line_item_id: LineItemId) -> ServiceResult<ReconciliationReport> {
        let report = self.inventory.release(line_item_id)?;
        self.orders.remove_line_item(line_item_id)?;
        info!(line_item_id = %line_item_id, "line item removed");
        publish(
            &self.bus,
            Uuid::from(line_item_id),
            "orders.line_item",
            &OrderEvent::LineItemRemoved {
                line_item_id,
                occurred_at: Utc::now(),
            },
        )?;
        Ok(report)
    }
}

//! Inventory reconciliation for purchase lines.
//!
//! Translates a line's purchased quantity into the correct set of physical
//! inventory units and keeps that set correct as the quantity changes.
//! Reconciliation of one line is serialized (per-line lock) and applied as a
//! single atomic unit-store batch; reconciliation of different lines runs in
//! parallel.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use uuid::Uuid;

use kitforge_catalog::Variant;
use kitforge_core::{LineItemId, ShipmentId, VariantId};
use kitforge_events::{EventBus, EventEnvelope};
use kitforge_inventory::{InventoryEvent, InventoryUnit, UnresolvedReduction, plan_line};
use kitforge_orders::{LineItem, LinePartSource, quantity_by_variant};

use crate::error::{ServiceError, ServiceResult};
use crate::services::publish;
use crate::stock::StockDeterminationGateway;
use crate::store::{CatalogStore, InventoryStore, OrderStore, UnitBatch};

/// Outcome of one `verify` call: what was created and destroyed per variant,
/// and which reductions could not be fully satisfied without touching
/// shipped units.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub line_item_id: LineItemId,
    pub created: BTreeMap<VariantId, u32>,
    pub destroyed: BTreeMap<VariantId, u32>,
    pub unresolved: Vec<UnresolvedReduction>,
}

impl ReconciliationReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty() && self.unresolved.is_empty()
    }
}

/// The assembly-aware inventory reconciler.
pub struct OrderInventoryService<B> {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogStore>,
    inventory: Arc<dyn InventoryStore>,
    gateway: Arc<dyn StockDeterminationGateway>,
    bus: B,
    line_locks: Mutex<HashMap<LineItemId, Arc<Mutex<()>>>>,
}

impl<B> OrderInventoryService<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        inventory: Arc<dyn InventoryStore>,
        gateway: Arc<dyn StockDeterminationGateway>,
        bus: B,
    ) -> Self {
        Self {
            orders,
            catalog,
            inventory,
            gateway,
            bus,
            line_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Converge the line's inventory units onto its projected target.
    ///
    /// `shipment_hint` is the shipment being actively edited: new units
    /// prefer it, removals disturb it last. Idempotent: a second call with
    /// unchanged inputs creates and destroys nothing.
    pub fn verify(
        &self,
        line_item_id: LineItemId,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<ReconciliationReport> {
        let lock = self.line_lock(line_item_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let line = self.orders.line_item(line_item_id)?;
        let variant = self
            .catalog
            .variant(line.variant_id)
            .map_err(|_| ServiceError::InvalidLine(line_item_id))?;

        let source = self.part_source(&line, &variant)?;
        let target = quantity_by_variant(&line, &source);

        self.converge(&line, &target, shipment_hint)
    }

    /// Converge the line to zero units (line removal). Shipped units stay,
    /// reported as unresolved.
    pub fn release(&self, line_item_id: LineItemId) -> ServiceResult<ReconciliationReport> {
        let lock = self.line_lock(line_item_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let line = self.orders.line_item(line_item_id)?;
        self.converge(&line, &BTreeMap::new(), None)
    }

    /// Post-call view of every unit the line holds, across all variants.
    pub fn inventory_units(&self, line_item_id: LineItemId) -> ServiceResult<Vec<InventoryUnit>> {
        Ok(self.inventory.units_for_line(line_item_id)?)
    }

    fn line_lock(&self, line_item_id: LineItemId) -> Arc<Mutex<()>> {
        let mut locks = self.line_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(line_item_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Select where the line's part quantities come from.
    fn part_source(&self, line: &LineItem, variant: &Variant) -> ServiceResult<LinePartSource> {
        if !self.catalog.has_parts(variant.product_id)? {
            return Ok(LinePartSource::NotAssembly);
        }

        let snapshots = self.orders.part_line_items(line.id)?;
        if snapshots.is_empty() {
            // Lines created before snapshotting existed carry no frozen part
            // set; fall back to the live bundle definition.
            warn!(line_item_id = %line.id, "no part snapshots; using live bundle definition");
            return Ok(LinePartSource::LiveDefinition(
                self.catalog.bundle_parts(variant.product_id)?,
            ));
        }
        Ok(LinePartSource::Snapshots(snapshots))
    }

    fn converge(
        &self,
        line: &LineItem,
        target: &BTreeMap<VariantId, u32>,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<ReconciliationReport> {
        let existing = self.inventory.units_for_line(line.id)?;
        let shipments = self.inventory.shipment_states()?;

        let plan = plan_line(line.id, target, &existing, &shipments, shipment_hint);

        // Place every new unit before touching the store: a gateway failure
        // here aborts the call with zero writes.
        let mut creates = Vec::new();
        let mut created: BTreeMap<VariantId, u32> = BTreeMap::new();
        for requirement in &plan.additions {
            for _ in 0..requirement.count {
                creates.push(self.gateway.place_unit(
                    requirement.variant_id,
                    line,
                    shipment_hint,
                )?);
            }
            created.insert(requirement.variant_id, requirement.count);
        }

        let mut destroyed: BTreeMap<VariantId, u32> = BTreeMap::new();
        for removal in &plan.removals {
            if let Some(unit) = existing.iter().find(|unit| unit.id == *removal) {
                *destroyed.entry(unit.variant_id).or_insert(0) += 1;
            }
        }

        let batch = UnitBatch {
            creates,
            removals: plan.removals.clone(),
        };
        if !batch.is_empty() {
            self.inventory.apply_batch(batch)?;
        }

        debug!(
            line_item_id = %line.id,
            created = created.values().sum::<u32>(),
            destroyed = destroyed.values().sum::<u32>(),
            unresolved = plan.unresolved.len(),
            "line inventory reconciled"
        );

        for (variant_id, count) in &created {
            publish(
                &self.bus,
                Uuid::from(line.id),
                "orders.line_item",
                &InventoryEvent::UnitsCreated {
                    line_item_id: line.id,
                    variant_id: *variant_id,
                    count: *count,
                    occurred_at: Utc::now(),
                },
            )?;
        }
        for (variant_id, count) in &destroyed {
            publish(
                &self.bus,
                Uuid::from(line.id),
                "orders.line_item",
                &InventoryEvent::UnitsDestroyed {
                    line_item_id: line.id,
                    variant_id: *variant_id,
                    count: *count,
                    occurred_at: Utc::now(),
                },
            )?;
        }
        for shortfall in &plan.unresolved {
            warn!(
                line_item_id = %shortfall.line_item_id,
                variant_id = %shortfall.variant_id,
                missing = shortfall.missing,
                "reduction left unresolved: units frozen on shipped shipments"
            );
            publish(
                &self.bus,
                Uuid::from(line.id),
                "orders.line_item",
                &InventoryEvent::ReductionUnresolved {
                    line_item_id: shortfall.line_item_id,
                    variant_id: shortfall.variant_id,
                    missing: shortfall.missing,
                    occurred_at: Utc::now(),
                },
            )?;
        }

        Ok(ReconciliationReport {
            line_item_id: line.id,
            created,
            destroyed,
            unresolved: plan.unresolved,
        })
    }
}

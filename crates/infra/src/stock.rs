//! Stock determination: where a freshly created unit lands.
//!
//! The reconciler decides *how many* units a line needs; this gateway decides
//! everything else about a new unit — which shipment it attaches to and
//! whether it is immediately fulfillable or backordered. Zero stock is not an
//! error here: the unit is simply placed as backordered.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use kitforge_core::{ShipmentId, VariantId};
use kitforge_inventory::{InventoryUnit, Shipment, UnitState};
use kitforge_orders::LineItem;

use crate::error::{ServiceError, ServiceResult};
use crate::store::InventoryStore;

/// Decides placement for one new inventory unit.
///
/// The returned unit is **not yet persisted**; the reconciler applies it as
/// part of its atomic batch. The gateway may create a shipment as a side
/// effect when the order has none open.
pub trait StockDeterminationGateway: Send + Sync {
    fn place_unit(
        &self,
        variant_id: VariantId,
        line: &LineItem,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<InventoryUnit>;
}

impl<G> StockDeterminationGateway for Arc<G>
where
    G: StockDeterminationGateway + ?Sized,
{
    fn place_unit(
        &self,
        variant_id: VariantId,
        line: &LineItem,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<InventoryUnit> {
        (**self).place_unit(variant_id, line, shipment_hint)
    }
}

/// Default gateway backed by a seedable per-variant stock-level table.
///
/// Shipment choice: the hint if it exists and is still open, else the first
/// open shipment of the line's order, else a new pending shipment.
pub struct OnHandStockGateway {
    inventory: Arc<dyn InventoryStore>,
    levels: RwLock<HashMap<VariantId, i64>>,
}

impl OnHandStockGateway {
    pub fn new(inventory: Arc<dyn InventoryStore>) -> Self {
        Self {
            inventory,
            levels: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the available stock for a variant.
    pub fn set_stock(&self, variant_id: VariantId, available: i64) {
        if let Ok(mut levels) = self.levels.write() {
            levels.insert(variant_id, available);
        }
    }

    fn draw(&self, variant_id: VariantId) -> UnitState {
        let Ok(mut levels) = self.levels.write() else {
            return UnitState::Backordered;
        };
        let level = levels.entry(variant_id).or_insert(0);
        if *level > 0 {
            *level -= 1;
            UnitState::OnHand
        } else {
            UnitState::Backordered
        }
    }

    fn determine_shipment(
        &self,
        line: &LineItem,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<ShipmentId> {
        if let Some(hint) = shipment_hint {
            if let Ok(shipment) = self.inventory.shipment(hint) {
                if !shipment.is_shipped() {
                    return Ok(hint);
                }
            }
        }

        let open = self
            .inventory
            .shipments_for_order(line.order_id)?
            .into_iter()
            .find(|shipment| !shipment.is_shipped());
        if let Some(shipment) = open {
            return Ok(shipment.id);
        }

        let shipment = Shipment::pending(line.order_id);
        debug!(order_id = %line.order_id, shipment_id = %shipment.id, "opening shipment for order");
        let id = shipment.id;
        self.inventory.insert_shipment(shipment)?;
        Ok(id)
    }
}

impl StockDeterminationGateway for OnHandStockGateway {
    fn place_unit(
        &self,
        variant_id: VariantId,
        line: &LineItem,
        shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<InventoryUnit> {
        let shipment_id = self.determine_shipment(line, shipment_hint)?;
        let state = self.draw(variant_id);
        Ok(InventoryUnit::new(
            variant_id,
            line.id,
            Some(shipment_id),
            state,
        ))
    }
}

/// Gateway that refuses every placement. Exercises the reconciler's
/// nothing-applied-on-failure path in tests.
pub struct RejectingStockGateway;

impl StockDeterminationGateway for RejectingStockGateway {
    fn place_unit(
        &self,
        _variant_id: VariantId,
        _line: &LineItem,
        _shipment_hint: Option<ShipmentId>,
    ) -> ServiceResult<InventoryUnit> {
        Err(ServiceError::Placement(
            "stock determination unavailable".to_string(),
        ))
    }
}

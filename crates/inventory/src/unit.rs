use serde::{Deserialize, Serialize};

use kitforge_core::{Entity, InventoryUnitId, LineItemId, ShipmentId, VariantId};

/// Fulfillability of a single unit, decided at placement time by the stock
/// determination gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitState {
    OnHand,
    Backordered,
}

/// One physical allocation of a variant to a purchase line, optionally
/// attached to a shipment.
///
/// Units for assembly lines are created and destroyed exclusively by the
/// reconciler; shippability is derived from the owning shipment's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUnit {
    pub id: InventoryUnitId,
    pub variant_id: VariantId,
    pub line_item_id: LineItemId,
    pub shipment_id: Option<ShipmentId>,
    pub state: UnitState,
}

impl InventoryUnit {
    pub fn new(
        variant_id: VariantId,
        line_item_id: LineItemId,
        shipment_id: Option<ShipmentId>,
        state: UnitState,
    ) -> Self {
        Self {
            id: InventoryUnitId::new(),
            variant_id,
            line_item_id,
            shipment_id,
            state,
        }
    }

    pub fn is_on(&self, shipment_id: ShipmentId) -> bool {
        self.shipment_id == Some(shipment_id)
    }
}

impl Entity for InventoryUnit {
    type Id = InventoryUnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

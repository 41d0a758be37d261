use serde::{Deserialize, Serialize};

use kitforge_core::{Entity, OrderId, ShipmentId};

/// Shipment lifecycle. `Shipped` is terminal: units attached to a shipped
/// shipment are immutable to the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentState {
    Pending,
    Ready,
    Shipped,
}

impl ShipmentState {
    pub fn is_shipped(self) -> bool {
        matches!(self, ShipmentState::Shipped)
    }
}

/// A shipment groups inventory units of one order for fulfilment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub state: ShipmentState,
}

impl Shipment {
    pub fn pending(order_id: OrderId) -> Self {
        Self {
            id: ShipmentId::new(),
            order_id,
            state: ShipmentState::Pending,
        }
    }

    pub fn is_shipped(&self) -> bool {
        self.state.is_shipped()
    }
}

impl Entity for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

//! Service wiring for the API process.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use kitforge_events::{EventEnvelope, InMemoryEventBus};
use kitforge_infra::services::{OrderContentsService, OrderInventoryService, PartAssignmentService};
use kitforge_infra::stock::{OnHandStockGateway, StockDeterminationGateway};
use kitforge_infra::store::memory::{
    InMemoryCatalogStore, InMemoryInventoryStore, InMemoryOrderStore,
};
use kitforge_infra::store::{CatalogStore, InventoryStore, OrderStore};

/// The bus implementation used by the single-process API.
pub type ApiBus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

/// Everything the handlers need, wired once at startup.
pub struct AppServices {
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub gateway: Arc<OnHandStockGateway>,
    pub bus: ApiBus,
    pub parts: PartAssignmentService<ApiBus>,
    pub contents: OrderContentsService<ApiBus>,
    pub order_inventory: Arc<OrderInventoryService<ApiBus>>,
}

pub fn build_services() -> AppServices {
    let catalog: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
    let orders: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
    let inventory: Arc<dyn InventoryStore> = Arc::new(InMemoryInventoryStore::new());
    let bus: ApiBus = Arc::new(InMemoryEventBus::new());

    let gateway = Arc::new(OnHandStockGateway::new(inventory.clone()));
    let order_inventory = Arc::new(OrderInventoryService::new(
        orders.clone(),
        catalog.clone(),
        inventory.clone(),
        gateway.clone() as Arc<dyn StockDeterminationGateway>,
        bus.clone(),
    ));
    let contents = OrderContentsService::new(
        orders.clone(),
        catalog.clone(),
        order_inventory.clone(),
        bus.clone(),
    );
    let parts = PartAssignmentService::new(catalog.clone(), bus.clone());

    AppServices {
        catalog,
        orders,
        inventory,
        gateway,
        bus,
        parts,
        contents,
        order_inventory,
    }
}

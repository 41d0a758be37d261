//! Application services: the mutation entry points of the system.
//!
//! Each service composes store traits plus the event bus; domain rules stay
//! in the domain crates, orchestration and atomicity live here.

pub mod contents;
pub mod order_inventory;
pub mod parts;

pub use contents::OrderContentsService;
pub use order_inventory::{OrderInventoryService, ReconciliationReport};
pub use parts::{PartAssignmentService, PartRow};

use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use kitforge_events::{Event, EventBus, EventEnvelope};

use crate::error::{ServiceError, ServiceResult};

/// Publish a typed domain event after its mutation has been committed.
///
/// Publication failure does not undo the mutation (at-least-once); it is
/// surfaced as [`ServiceError::Publish`] so the caller can decide.
pub(crate) fn publish<B, EV>(
    bus: &B,
    entity_id: Uuid,
    entity_type: &str,
    event: &EV,
) -> ServiceResult<()>
where
    B: EventBus<EventEnvelope<JsonValue>>,
    EV: Event + Serialize,
{
    let envelope = EventEnvelope::from_typed(entity_id, entity_type, event)
        .map_err(|e| ServiceError::Publish(e.to_string()))?;
    bus.publish(envelope)
        .map_err(|e| ServiceError::Publish(format!("{e:?}")))
}

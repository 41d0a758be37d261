//! `kitforge-events` — domain event contract + pub/sub mechanics.
//!
//! Domain crates define typed events (facts about catalog, order and
//! inventory mutations); services wrap them in [`EventEnvelope`]s and publish
//! them through an [`EventBus`]. The in-memory bus covers tests and the
//! single-process API binary.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};

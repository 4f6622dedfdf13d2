//! In-process event plumbing: a typed broadcast bus and the change aggregator that turns
//! bursts of backend notifications into single `CatalogChanged` events.

mod aggregator;
mod bus;
mod error;
mod receiver;

pub use aggregator::{CatalogChanged, ChangeAggregator, ChangeNotifier};
pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;

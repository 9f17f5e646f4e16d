//! Incremental extraction: windows, query planning, receivers
//!
//! The flow per cycle: a [`TimeBoundary`] is computed from the watermark,
//! each [`EntityReceiver`] collects the ids dirtied inside it (its own base
//! table plus related tables through their bindings), and the dirty set is
//! denormalized in bounded batches into index documents. The
//! [`SyncOrchestrator`] routes a target index to its receiver and resolves
//! the bootstrap start time when no watermark exists yet.

pub mod boundary;
pub mod orchestrator;
pub mod planner;
pub mod query;
pub mod receiver;
pub mod registry;

pub use boundary::{compute_boundary, TimeBoundary};
pub use orchestrator::SyncOrchestrator;
pub use planner::{QueryPlanner, RelatedTableBinding};
pub use receiver::EntityReceiver;
pub use registry::build_orchestrator;

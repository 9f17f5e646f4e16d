//! Core business logic for cinesync.
//!
//! # Modules
//!
//! - [`extract`] - Incremental extraction: windows, query planning, receivers
//! - [`sync`] - The driver loop and the seams it coordinates over
//! - [`state`] - Durable watermark checkpoints
//! - [`retry`] - Bounded exponential backoff for external I/O
//! - [`migrate`] - One-time SQLite to PostgreSQL catalog bulk load
//!
//! # Sync workflow
//!
//! 1. **Read watermark**: one per index, `"{index}_update"` key
//! 2. **Bootstrap** when absent: minimum earliest update time across receivers
//! 3. **Extract**: changed ids for the window, across base and related tables
//! 4. **Transform**: denormalize ids in bounded batches
//! 5. **Load**: idempotent bulk upserts into the search index
//! 6. **Checkpoint**: persist the window end, only after a successful load

pub mod extract;
pub mod migrate;
pub mod retry;
pub mod state;
pub mod sync;

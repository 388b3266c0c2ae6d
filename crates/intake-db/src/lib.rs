//! Intake Database Layer
//!
//! Persistence for file records: the slot allocator, the record mutations performed by
//! the conversion pipeline, and an in-memory store with the same contract.

pub mod db;
pub mod store_traits;

pub use db::{FileRecordRepository, InMemoryFileRecordStore, PgSlotLease};
pub use store_traits::{FileRecordStore, SlotLease};

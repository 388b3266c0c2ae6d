//! Repository implementations of the file record store.

pub mod file_record;
pub mod memory;

pub use file_record::{FileRecordRepository, PgSlotLease};
pub use memory::InMemoryFileRecordStore;

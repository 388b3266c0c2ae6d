//! Intake Storage Library
//!
//! Storage abstraction for uploaded originals and normalized outputs, with a local
//! filesystem implementation.
//!
//! # Storage key format
//!
//! Keys are relative, `/`-separated paths below the storage root, for example
//! `original/2026/10/19/3.png`. Keys must not contain `..` or a leading `/`; see
//! `keys::validate_key`.

pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

//! Data models for the application

mod file_record;
mod metadata;
mod outcome;

pub use file_record::*;
pub use metadata::*;
pub use outcome::*;

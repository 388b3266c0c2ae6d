//! Upload intake: slot allocation, streamed write and record commit as one unit.

pub mod coordinator;
pub mod types;

pub use coordinator::UploadCoordinator;
pub use types::IncomingFile;

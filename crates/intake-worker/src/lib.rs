//! Background conversion for Intake
//!
//! Records are classified synchronously by the [`ConversionDispatcher`] and converted off
//! the request path by the [`ConversionQueue`] worker pool.

pub mod context;
pub mod dispatcher;
pub mod queue;

pub use context::ConversionHandler;
pub use dispatcher::ConversionDispatcher;
pub use queue::{
    ConversionQueue, ConversionQueueConfig, DeadLetter, DeadLetterReason, DeadLetterReceiver,
    QUEUE_FULL_MESSAGE,
};

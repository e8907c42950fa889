//! A task-affine envelope queue, the building block both `Hub` and
//! `ComponentHost` use to serialize work onto a single owning task or
//! thread.

pub mod cooperative;
pub mod error;
pub mod runner;
pub mod simple;
pub mod traits;

pub use cooperative::CooperativeMessageQueue;
pub use error::QueueError;
pub use runner::ThreadMessageQueueRunner;
pub use simple::SimpleMessageQueue;
pub use traits::{ForeignEventSource, MessageQueue};

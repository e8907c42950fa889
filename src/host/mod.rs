//! Component-side counterpart to [`crate::hub`]: the [`Component`] trait an
//! embedder implements, and [`ComponentHost`], which drives one against a
//! [`crate::hub::HubHost`].

pub mod component;
pub mod error;
#[allow(clippy::module_inception)]
pub mod host;

pub use component::Component;
pub use error::HostError;
pub use host::{ComponentHost, QueueMode};

//! C-ABI dynamic-library boundary for out-of-process-style plug-in
//! components: [`stub`] is the loader side, [`adaptor`] is the plug-in side,
//! [`abi`] defines the shared wire shapes both halves agree on.

pub mod abi;
pub mod adaptor;
pub mod error;
pub mod stub;

pub use abi::{CBuffer, InstanceHandle};
pub use adaptor::PluginAdaptorHost;
pub use error::PluginError;
pub use stub::PluginStubComponent;

//! Errors from loading and driving a dynamic-library component.

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("failed to load plug-in library: {0}")]
    Load(#[from] libloading::Error),

    #[error("plug-in is missing required symbol {0:?}")]
    MissingSymbol(&'static str),

    #[error("failed to (de)serialize data crossing the plug-in boundary: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to frame an envelope crossing the plug-in boundary: {0}")]
    Framing(#[from] crate::message::codec::CodecError),

    #[error("plug-in returned a null instance handle")]
    NullInstance,
}

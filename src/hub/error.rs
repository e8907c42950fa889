//! Errors surfaced by Hub's registration and lookup operations.

use crate::util::{ComponentId, InputContextId};

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("string_id {0:?} is already registered")]
    DuplicateStringId(String),

    #[error("component {0} is not registered")]
    UnknownComponent(ComponentId),

    #[error("input context {0} does not exist")]
    UnknownInputContext(InputContextId),

    #[error("message type {0:#x} is reserved for internal Hub use")]
    ReservedMessageType(u32),

    #[error("hotkey list {0} is not registered")]
    UnknownHotkeyList(u32),

    #[error("hub has already shut down")]
    ShuttingDown,
}

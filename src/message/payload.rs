//! The tagged payload union carried by every [`crate::message::Envelope`].

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::message::types::MessageType;
use crate::util::{ComponentId, InputContextId};

/// Error codes exchanged in `Payload::Error` and used internally to build
/// reply envelopes for failed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Placeholder meaning "no error" — never sent standalone, used where a
    /// generic `Result`-shaped field needs a zero value.
    NotError,
    InvalidMessage,
    InvalidPayload,
    InvalidArgument,
    ComponentNotFound,
    InputContextNotFound,
    PermissionDenied,
    ChannelBroken,
    Timeout,
}

/// A dynamically-typed scalar, used for settings values and generic
/// component-to-component parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variable {
    None,
    Int(i64),
    String(String),
    Bool(bool),
}

/// Static metadata about a registered component, as stored in Hub's
/// registries and returned from `RegisterComponent`/`QueryComponent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub string_id: String,
    pub name: String,
    pub produce_message: HashSet<MessageType>,
    pub consume_message: HashSet<MessageType>,
}

impl ComponentInfo {
    /// True if this component declares it can consume `message_type`.
    pub fn consumes(&self, message_type: MessageType) -> bool {
        self.consume_message.contains(&message_type)
    }

    /// True if this component declares it can produce `message_type`.
    pub fn produces(&self, message_type: MessageType) -> bool {
        self.produce_message.contains(&message_type)
    }
}

/// Snapshot of an input context's public state, returned from
/// `QueryInputContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputContextInfo {
    pub id: InputContextId,
    pub owner: ComponentId,
    pub focused: bool,
    pub attached: Vec<ComponentId>,
}

/// A single hardware or synthesized key press/release, modeled after the
/// original protocol's virtual-key-plus-modifiers encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub keycode: u32,
    pub modifiers: u32,
    pub is_key_up: bool,
}

/// An in-progress composition string with an insertion caret and optional
/// underline/highlight spans (kept coarse; UI surfaces decide rendering).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub text: String,
    pub caret: u32,
}

/// One page of candidates plus the cursor identifying the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateList {
    pub candidates: Vec<String>,
    pub selected_index: Option<u32>,
    pub page_start: u32,
    pub page_size: u32,
    pub visible: bool,
}

/// A single user-invokable command, as shown in a component's command list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: u32,
    pub name: String,
    pub enabled: bool,
}

/// An ordered set of commands a component currently exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandList {
    pub commands: Vec<Command>,
}

/// A single key chord mapped to the logical action it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    pub keycode: u32,
    pub modifiers: u32,
    pub action_id: u32,
}

/// A named, independently (de)activatable set of hotkey bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyList {
    pub id: u32,
    pub bindings: Vec<HotkeyBinding>,
}

/// Screen-space rectangle, used for the input caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Caret position plus line height, as reported by the focused application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCaret {
    pub rect: Rect,
    pub line_height: i32,
}

/// The tagged payload carried by an [`crate::message::Envelope`].
///
/// `#[serde(deny_unknown_fields)]` is deliberately NOT applied anywhere in
/// this union: a field added by a newer peer must be ignored rather than
/// fail decoding, per the forward-compatibility requirement on the wire
/// format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Payload {
    Empty,
    Uint32Array(Vec<u32>),
    BoolArray(Vec<bool>),
    StringArray(Vec<String>),
    Variable(Variable),
    VariableArray(Vec<Variable>),
    Error { code: ErrorCode, message: String },
    ComponentInfo(ComponentInfo),
    ComponentInfoList(Vec<ComponentInfo>),
    InputContextInfo(InputContextInfo),
    KeyEvent(KeyEvent),
    Composition(Composition),
    CandidateList(CandidateList),
    CommandList(CommandList),
    HotkeyList(HotkeyList),
    InputCaret(InputCaret),
    /// Payload for a third-party message type Hub routes without inspecting.
    Opaque(Vec<u8>),
}

impl Payload {
    /// Build an error payload, the common case when rejecting a request.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Payload::Error {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_info_consumes_and_produces() {
        let mut consume = HashSet::new();
        consume.insert(MessageType::Known(crate::message::types::KnownMessageType::SendKeyEvent));
        let info = ComponentInfo {
            id: ComponentId::new(3),
            string_id: "ime.test".into(),
            name: "Test IME".into(),
            produce_message: HashSet::new(),
            consume_message: consume,
        };
        assert!(info.consumes(MessageType::Known(
            crate::message::types::KnownMessageType::SendKeyEvent
        )));
        assert!(!info.produces(MessageType::Known(
            crate::message::types::KnownMessageType::SendKeyEvent
        )));
    }

    #[test]
    fn error_payload_helper() {
        let p = Payload::error(ErrorCode::ComponentNotFound, "no such component");
        match p {
            Payload::Error { code, message } => {
                assert_eq!(code, ErrorCode::ComponentNotFound);
                assert_eq!(message, "no such component");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn payload_round_trips_through_json() {
        let p = Payload::KeyEvent(KeyEvent {
            keycode: 0x41,
            modifiers: 0,
            is_key_up: false,
        });
        let json = serde_json::to_string(&p).unwrap();
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}

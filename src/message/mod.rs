//! The wire message: a closed type catalogue, a tagged payload, and the
//! concrete envelope that carries them between components.

pub mod codec;
pub mod envelope;
pub mod payload;
pub mod types;

pub use codec::{CodecError, EnvelopeCodec, MAX_ENVELOPE_SIZE};
pub use envelope::{Envelope, ReplyMode};
pub use payload::{
    CandidateList, Command, CommandList, ComponentInfo, Composition, ErrorCode, HotkeyBinding,
    HotkeyList, InputCaret, InputContextInfo, KeyEvent, Payload, Rect, Variable,
};
pub use types::{KnownMessageType, MessageType, BROADCAST_FALLBACK_TYPES};

//! The concrete message envelope routed by Hub.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::message::payload::Payload;
use crate::message::types::MessageType;
use crate::util::{ComponentId, InputContextId, Serial};

/// Whether an envelope expects a reply, and which role it plays in a
/// request/reply exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplyMode {
    /// Fire-and-forget; no reply will be sent.
    NoReply,
    /// The sender blocks (via `send_with_reply`) or otherwise expects a
    /// matching `IsReply` envelope carrying the same serial.
    NeedReply,
    /// This envelope is itself the reply to an earlier `NeedReply` envelope.
    IsReply,
}

/// A single routed message: one [`MessageType`], a payload, and the
/// addressing/correlation fields Hub needs to deliver it.
///
/// `timestamp` is stamped at construction time for tracing/log correlation.
/// It is not part of the wire contract and is not required to round-trip
/// identically through a remote peer's clock.
///
/// # Example
/// ```rust
/// use ime_hub::message::{Envelope, ReplyMode, Payload};
/// use ime_hub::message::types::{MessageType, KnownMessageType};
/// use ime_hub::util::{ComponentId, InputContextId};
///
/// let env = Envelope::new(
///     MessageType::Known(KnownMessageType::QueryComponent),
///     ComponentId::new(1),
///     ComponentId::DEFAULT,
///     InputContextId::NONE,
///     Payload::Empty,
/// )
/// .with_reply_mode(ReplyMode::NeedReply);
///
/// assert_eq!(env.reply_mode, ReplyMode::NeedReply);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub message_type: MessageType,
    pub reply_mode: ReplyMode,
    pub source: ComponentId,
    pub target: ComponentId,
    pub icid: InputContextId,
    pub serial: Serial,
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Build a new envelope with `ReplyMode::NoReply` and `serial = Serial::new(0)`;
    /// use `with_reply_mode` / `with_serial` to override either.
    pub fn new(
        message_type: MessageType,
        source: ComponentId,
        target: ComponentId,
        icid: InputContextId,
        payload: Payload,
    ) -> Self {
        Self {
            message_type,
            reply_mode: ReplyMode::NoReply,
            source,
            target,
            icid,
            serial: Serial::new(0),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Set the reply mode.
    pub fn with_reply_mode(mut self, reply_mode: ReplyMode) -> Self {
        self.reply_mode = reply_mode;
        self
    }

    /// Set the correlation serial.
    pub fn with_serial(mut self, serial: Serial) -> Self {
        self.serial = serial;
        self
    }

    /// Build the `IsReply` envelope answering this one: source/target
    /// reversed, same serial and icid, caller-supplied payload.
    pub fn reply(&self, message_type: MessageType, payload: Payload) -> Self {
        Self {
            message_type,
            reply_mode: ReplyMode::IsReply,
            source: self.target,
            target: self.source,
            icid: self.icid,
            serial: self.serial,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// True if this envelope is a reply matching `serial` and addressed to
    /// `waiter`.
    pub fn is_reply_to(&self, waiter: ComponentId, serial: Serial) -> bool {
        self.reply_mode == ReplyMode::IsReply && self.target == waiter && self.serial == serial
    }
}

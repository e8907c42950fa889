//! Length-delimited wire framing for [`Envelope`] over a byte stream.
//!
//! One frame is `u32` little-endian total length (including the 4 length
//! bytes) followed by a `serde_json`-encoded [`Envelope`]. Used both by
//! `channel::PipeChannel` over a socket and by the plug-in ABI, which needs
//! the identical length-prefixed encoding to pass envelopes across the
//! C boundary.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

// Layer 3: Internal module imports
use crate::message::envelope::Envelope;

/// Maximum encoded frame size, including the 4-byte length prefix.
pub const MAX_ENVELOPE_SIZE: usize = 16 * 1024 * 1024;

/// Errors from encoding or decoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("envelope exceeds max frame size of {max} bytes (was {actual})")]
    FrameTooLarge { max: usize, actual: usize },

    #[error("failed to serialize envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("io error while framing: {0}")]
    Io(#[from] std::io::Error),
}

/// Tokio codec pairing length-delimited framing with JSON envelope encoding.
///
/// A thin wrapper is used (rather than composing `LengthDelimitedCodec`
/// directly) so callers get a `Decoder<Item = Envelope>` / `Encoder<Envelope>`
/// pair without re-implementing the JSON step at every call site.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeCodec;

impl Encoder<Envelope> for EnvelopeCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Envelope, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = serde_json::to_vec(&item)?;
        let total_len = body.len() + 4;
        if total_len > MAX_ENVELOPE_SIZE {
            return Err(CodecError::FrameTooLarge {
                max: MAX_ENVELOPE_SIZE,
                actual: total_len,
            });
        }
        dst.reserve(total_len);
        dst.put_u32_le(total_len as u32);
        dst.extend_from_slice(&body);
        Ok(())
    }
}

impl Decoder for EnvelopeCodec {
    type Item = Envelope;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }
        let total_len = u32::from_le_bytes(src[..4].try_into().unwrap_or([0; 4])) as usize;
        if total_len > MAX_ENVELOPE_SIZE {
            return Err(CodecError::FrameTooLarge {
                max: MAX_ENVELOPE_SIZE,
                actual: total_len,
            });
        }
        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None);
        }
        let mut frame = src.split_to(total_len);
        frame.advance(4);
        let envelope = serde_json::from_slice(&frame)?;
        Ok(Some(envelope))
    }
}

/// Encode a single envelope to a standalone length-prefixed buffer, for use
/// across the plug-in ABI boundary where there is no streaming `BytesMut`.
pub fn encode_standalone(envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
    let body = serde_json::to_vec(envelope)?;
    let total_len = body.len() + 4;
    if total_len > MAX_ENVELOPE_SIZE {
        return Err(CodecError::FrameTooLarge {
            max: MAX_ENVELOPE_SIZE,
            actual: total_len,
        });
    }
    let mut buf = Vec::with_capacity(total_len);
    buf.extend_from_slice(&(total_len as u32).to_le_bytes());
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Decode a single standalone length-prefixed buffer produced by
/// [`encode_standalone`].
pub fn decode_standalone(buf: &[u8]) -> Result<Envelope, CodecError> {
    if buf.len() < 4 {
        return Err(CodecError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "buffer shorter than length prefix",
        )));
    }
    let total_len = u32::from_le_bytes(buf[..4].try_into().unwrap_or([0; 4])) as usize;
    if total_len > MAX_ENVELOPE_SIZE {
        return Err(CodecError::FrameTooLarge {
            max: MAX_ENVELOPE_SIZE,
            actual: total_len,
        });
    }
    if buf.len() < total_len {
        return Err(CodecError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "buffer shorter than declared frame length",
        )));
    }
    Ok(serde_json::from_slice(&buf[4..total_len])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::payload::Payload;
    use crate::message::types::{KnownMessageType, MessageType};
    use crate::util::{ComponentId, InputContextId};

    fn sample() -> Envelope {
        Envelope::new(
            MessageType::Known(KnownMessageType::QueryComponent),
            ComponentId::new(1),
            ComponentId::new(2),
            InputContextId::NONE,
            Payload::Empty,
        )
    }

    #[test]
    fn round_trips_through_codec() {
        let mut codec = EnvelopeCodec;
        let mut buf = BytesMut::new();
        codec.encode(sample(), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.serial, sample().serial);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_returns_none_on_partial_frame() {
        let mut codec = EnvelopeCodec;
        let mut buf = BytesMut::new();
        codec.encode(sample(), &mut buf).unwrap();
        let mut partial = buf.split_to(buf.len() - 1);
        assert!(codec.decode(&mut partial).unwrap().is_none());
    }

    #[test]
    fn standalone_round_trip() {
        let buf = encode_standalone(&sample()).unwrap();
        let decoded = decode_standalone(&buf).unwrap();
        assert_eq!(decoded.serial, sample().serial);
    }

    #[test]
    fn oversize_frame_rejected() {
        let mut codec = EnvelopeCodec;
        let mut buf = BytesMut::new();
        buf.put_u32_le((MAX_ENVELOPE_SIZE + 1) as u32);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::FrameTooLarge { .. }));
    }
}

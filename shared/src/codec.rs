//! Frame codec for request and response envelopes
//!
//! A frame is a big-endian `u32` byte count followed by that many bytes of
//! protobuf-encoded `Envelope`:
//! ```text
//! +--------------+---------------------------+
//! | len: u32 BE  | Envelope (len bytes)      |
//! +--------------+---------------------------+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use thiserror::Error;

use crate::Envelope;

const PREFIX_LEN: usize = 4;

/// Largest envelope accepted in either direction
pub const MAX_MESSAGE_SIZE: u32 = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Envelope of {0} bytes exceeds the {MAX_MESSAGE_SIZE} byte frame limit")]
    MessageTooLarge(usize),

    #[error("Frame announces {0} bytes, above the {MAX_MESSAGE_SIZE} byte limit")]
    InvalidLength(u32),

    #[error("Malformed envelope: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("Failed to encode envelope: {0}")]
    EncodeError(#[from] prost::EncodeError),
}

/// Frame one envelope
pub fn encode(envelope: &Envelope) -> Result<Bytes, CodecError> {
    let mut frame = BytesMut::new();
    encode_into(envelope, &mut frame)?;
    Ok(frame.freeze())
}

/// Append one framed envelope to `out`
pub fn encode_into(envelope: &Envelope, out: &mut BytesMut) -> Result<(), CodecError> {
    let body_len = envelope.encoded_len();
    let announced = u32::try_from(body_len)
        .ok()
        .filter(|len| *len <= MAX_MESSAGE_SIZE)
        .ok_or(CodecError::MessageTooLarge(body_len))?;

    out.reserve(PREFIX_LEN + body_len);
    out.put_u32(announced);
    envelope.encode(out)?;
    Ok(())
}

/// Take one complete frame off the front of `buf`.
///
/// Incomplete input yields `Ok(None)` and leaves `buf` as it was. An
/// oversized length prefix or an undecodable body is an error; the stream
/// cannot be resynchronised after either.
pub fn decode(buf: &mut BytesMut) -> Result<Option<Envelope>, CodecError> {
    let Some(mut prefix) = buf.get(..PREFIX_LEN) else {
        return Ok(None);
    };
    let body_len = prefix.get_u32();
    if body_len > MAX_MESSAGE_SIZE {
        return Err(CodecError::InvalidLength(body_len));
    }

    let body_len = body_len as usize;
    if buf.len() < PREFIX_LEN + body_len {
        return Ok(None);
    }

    let mut frame = buf.split_to(PREFIX_LEN + body_len);
    frame.advance(PREFIX_LEN);
    Ok(Some(Envelope::decode(frame.freeze())?))
}

/// Accumulates bytes read from a socket and yields envelopes as frames complete
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            pending: BytesMut::with_capacity(4096),
        }
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Next complete envelope, if one is buffered
    pub fn decode_next(&mut self) -> Result<Option<Envelope>, CodecError> {
        decode(&mut self.pending)
    }

    /// Bytes received but not yet decoded
    pub fn buffer_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{envelope::Payload, LoadDrone, ManifestItem, MessageType, Response};

    fn load_request() -> Envelope {
        Envelope::new(
            "test-client",
            MessageType::MsgLoadDrone,
            7,
            Payload::LoadDrone(LoadDrone {
                serial_number: "D1".into(),
                items: vec![ManifestItem {
                    code: "M1".into(),
                    count: 40,
                }],
            }),
        )
    }

    #[test]
    fn test_length_prefix_and_decode() {
        let original = load_request();
        let encoded = encode(&original).expect("encode failed");

        let len_prefix = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        assert_eq!(len_prefix as usize, encoded.len() - 4);

        let mut buf = BytesMut::from(&encoded[..]);
        let decoded = decode(&mut buf).expect("decode failed").expect("no message");

        assert_eq!(decoded, original);
        assert!(buf.is_empty(), "buffer should be empty after decode");
    }

    #[test]
    fn test_partial_decode() {
        let encoded = encode(&load_request()).expect("encode failed");

        let mut buf = BytesMut::from(&encoded[..5]);
        let result = decode(&mut buf).expect("decode should not fail on partial data");
        assert!(result.is_none(), "should return None for partial data");
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_frame_decoder_mixed_frames() {
        let request = encode(&load_request()).expect("encode failed");
        let response = encode(&Envelope::new(
            "dispatch",
            MessageType::MsgResponse,
            7,
            Payload::Response(Response::ok()),
        ))
        .expect("encode failed");

        let mut decoder = FrameDecoder::new();
        decoder.extend(&request[..3]);
        assert!(decoder.decode_next().expect("decode error").is_none());

        decoder.extend(&request[3..]);
        decoder.extend(&response);

        let first = decoder.decode_next().expect("decode error").expect("request frame");
        assert!(matches!(first.payload, Some(Payload::LoadDrone(_))));

        let second = decoder.decode_next().expect("decode error").expect("response frame");
        assert!(matches!(second.payload, Some(Payload::Response(ref r)) if r.is_ok()));

        assert!(decoder.decode_next().expect("decode error").is_none());
        assert_eq!(decoder.buffer_len(), 0);
    }

    #[test]
    fn test_message_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAX_MESSAGE_SIZE + 1);
        buf.put_bytes(0, 100);

        let result = decode(&mut buf);
        assert!(matches!(result, Err(CodecError::InvalidLength(_))));
    }

    #[test]
    fn test_oversized_envelope_is_not_framed() {
        let envelope = Envelope::new(
            "dispatch",
            MessageType::MsgResponse,
            1,
            Payload::Response(Response {
                message: "x".repeat(MAX_MESSAGE_SIZE as usize),
                ..Response::ok()
            }),
        );

        let mut out = BytesMut::new();
        let result = encode_into(&envelope, &mut out);
        assert!(matches!(result, Err(CodecError::MessageTooLarge(n)) if n > MAX_MESSAGE_SIZE as usize));
        assert!(out.is_empty());
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let mut buf = BytesMut::new();
        buf.put_u32(3);
        buf.put_slice(&[0xff, 0xff, 0xff]);

        assert!(matches!(decode(&mut buf), Err(CodecError::DecodeError(_))));
    }
}

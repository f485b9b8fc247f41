//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format (all integers little-endian)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬─────────┬──────────┬──────────┬──────────┬──────────┬────────────────────────┐
//! │Action (1)│ Type (1)│Extra (2) │ Node (2) │ Key (2)  │Value (2) │ node\0 key\0 value\0   │
//! └──────────┴─────────┴──────────┴──────────┴──────────┴──────────┴────────────────────────┘
//! ```
//! Each length counts its string plus the terminating NUL, or is 0 when
//! the field is absent. Extra is reserved and always sent as 0.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬─────────┬──────────┬─────────────────────────────┐
//! │Action (1)│ Type (1)│  Len (2) │     message + NUL           │
//! └──────────┴─────────┴──────────┴─────────────────────────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::{Action, Request, Response, ValueType};
use crate::error::{ConfTreeError, Result};
use crate::transport::{DuplexStream, Transport};

/// Request header: action, type, extra/node/key/value lengths
pub const REQUEST_HEADER_SIZE: usize = 10;

/// Response header: action, type, message length
pub const RESPONSE_HEADER_SIZE: usize = 4;

/// Largest segment (string + NUL) a 16-bit length field can describe
pub const MAX_SEGMENT_SIZE: usize = u16::MAX as usize;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: header (10) + node\0 + key\0 + value\0 (present fields only)
pub fn encode_request(request: &Request) -> Result<Bytes> {
    if request.action == Action::Error {
        return Err(ConfTreeError::Protocol(
            "ERROR is a response-only action".to_string(),
        ));
    }

    let node = segment("node path", request.node_path.as_deref())?;
    let key = segment("key", request.key.as_deref())?;
    let value = segment("value", request.value.as_deref())?;

    let body_len: usize = [node, key, value]
        .iter()
        .map(|bytes| segment_len(*bytes) as usize)
        .sum();
    let mut frame = BytesMut::with_capacity(REQUEST_HEADER_SIZE + body_len);

    // An absent type goes out as 0, which the server ignores for actions
    // that take no type.
    frame.put_u8(request.action.code());
    frame.put_u8(request.value_type.map_or(0, ValueType::code));
    frame.put_u16_le(0);
    frame.put_u16_le(segment_len(node));
    frame.put_u16_le(segment_len(key));
    frame.put_u16_le(segment_len(value));

    for bytes in [node, key, value].into_iter().flatten() {
        frame.put_slice(bytes);
        frame.put_u8(0);
    }

    Ok(frame.freeze())
}

/// Validate a string for framing and return its bytes
fn segment<'a>(field: &str, text: Option<&'a str>) -> Result<Option<&'a [u8]>> {
    let Some(text) = text else {
        return Ok(None);
    };

    if text.as_bytes().contains(&0) {
        return Err(ConfTreeError::Protocol(format!(
            "{} contains an embedded NUL byte",
            field
        )));
    }

    if text.len() + 1 > MAX_SEGMENT_SIZE {
        return Err(ConfTreeError::Protocol(format!(
            "{} too long: {} bytes (max {})",
            field,
            text.len(),
            MAX_SEGMENT_SIZE - 1
        )));
    }

    Ok(Some(text.as_bytes()))
}

fn segment_len(bytes: Option<&[u8]>) -> u16 {
    bytes.map_or(0, |b| (b.len() + 1) as u16)
}

/// Parsed request header
///
/// The action byte is kept raw so that a frame with an unknown action can
/// still be consumed in full before it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub action_code: u8,
    pub type_code: u8,
    pub extra_len: usize,
    pub node_len: usize,
    pub key_len: usize,
    pub value_len: usize,
}

impl RequestHeader {
    /// Parse the fixed 10-byte header
    pub fn parse(header: &[u8]) -> Result<Self> {
        if header.len() < REQUEST_HEADER_SIZE {
            return Err(ConfTreeError::Protocol(format!(
                "Incomplete request header: expected {} bytes, got {}",
                REQUEST_HEADER_SIZE,
                header.len()
            )));
        }

        let len_at = |offset: usize| u16::from_le_bytes([header[offset], header[offset + 1]]) as usize;

        Ok(Self {
            action_code: header[0],
            type_code: header[1],
            extra_len: len_at(2),
            node_len: len_at(4),
            key_len: len_at(6),
            value_len: len_at(8),
        })
    }

    /// Number of bytes following the header
    pub fn body_len(&self) -> usize {
        self.extra_len + self.node_len + self.key_len + self.value_len
    }
}

/// Decode a full request frame (header + body)
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let header = RequestHeader::parse(bytes)?;

    let total_len = REQUEST_HEADER_SIZE + header.body_len();
    if bytes.len() < total_len {
        return Err(ConfTreeError::Protocol(format!(
            "Incomplete request body: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let action = Action::from_code(header.action_code)
        .filter(|action| *action != Action::Error)
        .ok_or(ConfTreeError::UnknownAction(header.action_code))?;

    let value_type = if action.uses_type() {
        Some(ValueType::from_code(header.type_code).ok_or(ConfTreeError::UnknownType(header.type_code))?)
    } else {
        None
    };

    // Extra segment is skipped, it carries nothing we use.
    let mut offset = REQUEST_HEADER_SIZE + header.extra_len;
    let mut next_segment = |field: &str, len: usize| -> Result<Option<String>> {
        let text = read_segment(field, &bytes[offset..offset + len])?;
        offset += len;
        Ok(text)
    };

    let node_path = next_segment("node path", header.node_len)?;
    let key = next_segment("key", header.key_len)?;
    let value = next_segment("value", header.value_len)?;

    Ok(Request {
        action,
        node_path,
        key,
        value_type,
        value,
    })
}

/// Decode one NUL-terminated segment (empty slice = absent)
fn read_segment(field: &str, bytes: &[u8]) -> Result<Option<String>> {
    match bytes.split_last() {
        None => Ok(None),
        Some((0, text)) => Ok(Some(String::from_utf8_lossy(text).into_owned())),
        Some(_) => Err(ConfTreeError::Protocol(format!(
            "{} segment is not NUL terminated",
            field
        ))),
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: action (1) + type (1) + msg_len (2) + message + NUL
pub fn encode_response(response: &Response) -> Result<Bytes> {
    let message = response.message.as_bytes();
    let message_len = message.len() + 1;

    if message_len > MAX_SEGMENT_SIZE {
        return Err(ConfTreeError::Protocol(format!(
            "Response message too long: {} bytes (max {})",
            message.len(),
            MAX_SEGMENT_SIZE - 1
        )));
    }

    let mut frame = BytesMut::with_capacity(RESPONSE_HEADER_SIZE + message_len);
    frame.put_u8(response.action.code());
    frame.put_u8(response.value_type.code());
    frame.put_u16_le(message_len as u16);
    frame.put_slice(message);
    frame.put_u8(0);

    Ok(frame.freeze())
}

/// Parsed response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub action: Action,
    pub value_type: ValueType,

    /// Bytes of message that follow, trailing NUL included
    pub message_len: usize,
}

/// Decode the fixed 4-byte response header
pub fn decode_response_header(header: &[u8]) -> Result<ResponseHeader> {
    if header.len() < RESPONSE_HEADER_SIZE {
        return Err(ConfTreeError::Protocol(format!(
            "Incomplete response header: expected {} bytes, got {}",
            RESPONSE_HEADER_SIZE,
            header.len()
        )));
    }

    let action = Action::from_code(header[0]).ok_or(ConfTreeError::UnknownAction(header[0]))?;
    let value_type = ValueType::from_code(header[1]).ok_or(ConfTreeError::UnknownType(header[1]))?;
    let message_len = u16::from_le_bytes([header[2], header[3]]) as usize;

    Ok(ResponseHeader {
        action,
        value_type,
        message_len,
    })
}

/// Turn raw message bytes into text, dropping the trailing NUL if present
pub fn decode_message(bytes: &[u8]) -> String {
    let text = match bytes.split_last() {
        Some((0, text)) => text,
        _ => bytes,
    };
    String::from_utf8_lossy(text).into_owned()
}

/// Decode a full response frame (header + message)
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let header = decode_response_header(bytes)?;

    let total_len = RESPONSE_HEADER_SIZE + header.message_len;
    if bytes.len() < total_len {
        return Err(ConfTreeError::Protocol(format!(
            "Incomplete response message: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok(Response {
        action: header.action,
        value_type: header.value_type,
        message: decode_message(&bytes[RESPONSE_HEADER_SIZE..total_len]),
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a request to a transport
pub fn write_request<S: DuplexStream>(transport: &mut Transport<S>, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    transport.write_all(&bytes)
}

/// Read a complete response from a transport
///
/// Reads the header first, then exactly the advertised message length.
/// An invalid header is reported before the message is read; the stream
/// is out of sync after that and must be closed.
pub fn read_response<S: DuplexStream>(transport: &mut Transport<S>) -> Result<Response> {
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    transport.read_exact_into(&mut header)?;
    let header = decode_response_header(&header)?;

    let message = transport.read_exact(header.message_len)?;

    Ok(Response {
        action: header.action,
        value_type: header.value_type,
        message: decode_message(&message),
    })
}

/// Read a complete request from a transport
///
/// The whole frame is consumed before it is validated, so a `Protocol`
/// error here leaves the stream in sync for the next request.
pub fn read_request<S: DuplexStream>(transport: &mut Transport<S>) -> Result<Request> {
    let mut header = [0u8; REQUEST_HEADER_SIZE];
    transport.read_exact_into(&mut header)?;
    let parsed = RequestHeader::parse(&header)?;

    let body = transport.read_exact(parsed.body_len())?;

    let mut frame = Vec::with_capacity(REQUEST_HEADER_SIZE + body.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(&body);

    decode_request(&frame)
}

/// Write a response to a transport
pub fn write_response<S: DuplexStream>(transport: &mut Transport<S>, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    transport.write_all(&bytes)
}

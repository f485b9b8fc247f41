//! Protocol Module
//!
//! Defines the wire protocol spoken with the configuration server.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬─────────┬──────────┬──────────┬──────────┬──────────┬──────────────┐
//! │Action (1)│ Type (1)│Extra (2) │ Node (2) │ Key (2)  │Value (2) │   Strings    │
//! └──────────┴─────────┴──────────┴──────────┴──────────┴──────────┴──────────────┘
//! ```
//!
//! ### Actions
//! - 0: NODE_EXISTS     - node
//! - 1: ATTR_EXISTS     - node, key, type
//! - 2: GET             - node, key, type
//! - 3: PUT             - node, key, type, value
//! - 4: ERROR           - responses only
//! - 5: GET_CHILDREN    - node
//! - 6: GET_ATTRIBUTES  - node
//! - 7: GET_TYPES       - node, key
//!
//! ### Response Format
//! ```text
//! ┌──────────┬─────────┬──────────┬─────────────────────────────┐
//! │Action (1)│ Type (1)│  Len (2) │       Message + NUL         │
//! └──────────┴─────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Type Codes
//! - -1: UNKNOWN, 0: BOOL, 1: BYTE, 2: SHORT, 3: INT
//! - 4: LONG, 5: FLOAT, 6: DOUBLE, 7: STRING

mod action;
mod value;
mod request;
mod response;
mod codec;

pub use action::Action;
pub use value::{Value, ValueType};
pub use request::{path_components, Request};
pub use response::{Response, NAME_SEPARATOR};
pub use codec::{
    encode_request, decode_request, encode_response, decode_response,
    decode_response_header, decode_message, RequestHeader, ResponseHeader,
    read_request, write_request, read_response, write_response,
    REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE, MAX_SEGMENT_SIZE,
};

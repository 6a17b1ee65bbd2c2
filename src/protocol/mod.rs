//! Protocol Module
//!
//! Defines the wire protocol between the store and its network clients.
//!
//! ## Frame Format
//!
//! ### Request
//! ```text
//! ┌───────────┬──────────┬──────────┬─────────────────────────┐
//! │Version (1)│ Cmd (1)  │ Len (3)  │         Payload         │
//! └───────────┴──────────┴──────────┴─────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: LOOKUP - Payload: key_len (4) + key
//! - 0x02: CREATE - Payload: key_len (4) + key + value
//! - 0x03: UPDATE - Payload: key_len (4) + key + value
//! - 0x04: SCAN   - Payload: empty
//! - 0x05: PING   - Payload: empty
//!
//! ### Response
//! ```text
//! ┌───────────┬──────────┬──────────┬─────────────────────────┐
//! │Version (1)│Status (1)│ Len (3)  │         Payload         │
//! └───────────┴──────────┴──────────┴─────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK             (LOOKUP: value, SCAN: key list)
//! - 0x01: NOT_FOUND
//! - 0x02: ALREADY_EXISTS
//! - 0x03: ERROR          (Payload: error code (1) + message)
//!
//! Lengths are big-endian. Version is always 0.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_key_list, decode_response, encode_command, encode_key_list,
    encode_response, read_command, read_response, write_command, write_response, HEADER_SIZE,
    MAX_PAYLOAD_SIZE, PROTOCOL_VERSION,
};
pub use command::{Command, CommandType};
pub use response::{ErrorCode, Response, Status};

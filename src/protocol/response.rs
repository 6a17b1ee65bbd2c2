//! Response definitions
//!
//! Represents responses to clients.

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    AlreadyExists = 0x02,
    Error = 0x03,
}

/// First payload byte of an ERROR response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Frame version is not 0
    BadVersion = 0x01,
    /// Unknown command byte
    BadCommand = 0x02,
    /// Payload does not match the command's layout
    Malformed = 0x03,
    /// All workers busy; connection refused
    ServerBusy = 0x04,
    /// Request or reply exceeds the frame payload limit
    TooLarge = 0x05,
    /// The store rejected the request for another reason
    Internal = 0x06,
}

impl ErrorCode {
    /// Parse an error code byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ErrorCode::BadVersion),
            0x02 => Some(ErrorCode::BadCommand),
            0x03 => Some(ErrorCode::Malformed),
            0x04 => Some(ErrorCode::ServerBusy),
            0x05 => Some(ErrorCode::TooLarge),
            0x06 => Some(ErrorCode::Internal),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for LOOKUP, key list for SCAN, error for ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ALREADY_EXISTS response
    pub fn already_exists() -> Self {
        Self {
            status: Status::AlreadyExists,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(code: ErrorCode, message: &str) -> Self {
        let mut payload = Vec::with_capacity(1 + message.len());
        payload.push(code as u8);
        payload.extend_from_slice(message.as_bytes());

        Self {
            status: Status::Error,
            payload: Some(payload),
        }
    }

    /// Error code and message of an ERROR response
    pub fn error_details(&self) -> Option<(ErrorCode, String)> {
        if self.status != Status::Error {
            return None;
        }
        let payload = self.payload.as_deref()?;
        let (&code, message) = payload.split_first()?;
        Some((
            ErrorCode::from_byte(code)?,
            String::from_utf8_lossy(message).into_owned(),
        ))
    }

    /// Payload length on the wire
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, |p| p.len())
    }
}

//! Command definitions
//!
//! Represents requests from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Lookup = 0x01,
    Create = 0x02,
    Update = 0x03,
    Scan = 0x04,
    Ping = 0x05,
}

impl CommandType {
    /// Parse a command byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::Lookup),
            0x02 => Some(CommandType::Create),
            0x03 => Some(CommandType::Update),
            0x04 => Some(CommandType::Scan),
            0x05 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read the value of an entry
    Lookup { key: Vec<u8> },

    /// Store a new entry (never overwrites)
    Create { key: Vec<u8>, value: Vec<u8> },

    /// Replace the value of an existing entry
    Update { key: Vec<u8>, value: Vec<u8> },

    /// List every stored key
    Scan,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Lookup { .. } => CommandType::Lookup,
            Command::Create { .. } => CommandType::Create,
            Command::Update { .. } => CommandType::Update,
            Command::Scan => CommandType::Scan,
            Command::Ping => CommandType::Ping,
        }
    }
}

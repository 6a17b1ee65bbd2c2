//! TCP Client
//!
//! Blocking client for the store's wire protocol.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{Result, StoreError};
use crate::protocol::{decode_key_list, read_response, write_command, Command, Response, Status};

/// A connection to a ctstore server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Read an entry; `Err(StoreError::NotFound)` on miss
    pub fn lookup(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let response = self.call(&Command::Lookup { key: key.to_vec() })?;
        Ok(response.payload.unwrap_or_default())
    }

    /// Create an entry; `Err(StoreError::EntryAlreadyExists)` on collision
    pub fn create(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.call(&Command::Create {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        Ok(())
    }

    /// Update an entry; `Err(StoreError::NotFound)` on miss
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.call(&Command::Update {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        Ok(())
    }

    /// Every stored key, in ascending order
    pub fn scan(&mut self) -> Result<Vec<Vec<u8>>> {
        let response = self.call(&Command::Scan)?;
        match response.payload {
            Some(payload) => decode_key_list(&payload),
            None => Ok(Vec::new()),
        }
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        self.call(&Command::Ping)?;
        Ok(())
    }

    /// Send one command and map non-OK statuses to errors
    fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        let response = read_response(&mut self.reader)?;

        match response.status {
            Status::Ok => Ok(response),
            Status::NotFound => Err(StoreError::NotFound),
            Status::AlreadyExists => Err(StoreError::EntryAlreadyExists),
            Status::Error => match response.error_details() {
                Some((code, message)) => Err(StoreError::Server { code, message }),
                None => Err(StoreError::Protocol(
                    "ERROR reply without error code".to_string(),
                )),
            },
        }
    }
}

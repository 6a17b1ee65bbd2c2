//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of workers.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::protocol::{write_response, ErrorCode, Response};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cloneable handle that stops a running [`Server`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop accepting and exit once workers drain
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for ctstore
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: ShutdownHandle,

    /// Connections handed to a worker and not yet finished
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            StoreError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: ShutdownHandle::default(),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Serve until shutdown is requested (blocking)
    ///
    /// Accepted streams are queued to a fixed pool of `max_connections`
    /// workers. Once that many connections are open, further clients get a
    /// SERVER_BUSY error and are disconnected.
    pub fn run(self) -> Result<()> {
        self.listener.set_nonblocking(true)?;
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.max_connections
        );

        let (sender, receiver) = channel::unbounded::<TcpStream>();
        let workers = (0..self.config.max_connections)
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<io::Result<Vec<_>>>()?;
        drop(receiver);

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    stream.set_nonblocking(false)?;
                    if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
                        tracing::warn!("No free connections, refusing {}", addr);
                        refuse(stream);
                        continue;
                    }

                    self.active.fetch_add(1, Ordering::SeqCst);
                    if sender.send(stream).is_err() {
                        return Err(StoreError::Network(
                            "All worker threads exited".to_string(),
                        ));
                    }
                    tracing::debug!("Accepted {}", addr);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, waiting for {} workers", workers.len());
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    fn spawn_worker(&self, id: usize, receiver: Receiver<TcpStream>) -> io::Result<JoinHandle<()>> {
        let engine = Arc::clone(&self.engine);
        let active = Arc::clone(&self.active);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("ctstore-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    serve(stream, &engine, read_ms, write_ms);
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
    }
}

/// Run one connection to completion on the current worker
fn serve(stream: TcpStream, engine: &Arc<Engine>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, Arc::clone(engine)) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };
    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("Failed to set timeouts: {}", e);
        return;
    }
    if let Err(e) = connection.handle() {
        tracing::debug!("Connection {} ended: {}", connection.peer_addr(), e);
    }
}

/// Tell a client there is no room for it and hang up
fn refuse(mut stream: TcpStream) {
    let response = Response::error(ErrorCode::ServerBusy, "No free connections");
    if let Err(e) = write_response(&mut stream, &response) {
        tracing::debug!("Failed to send busy reply: {}", e);
    }
    let _ = stream.shutdown(std::net::Shutdown::Both);
}

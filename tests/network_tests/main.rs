//! Network Tests
//!
//! End-to-end client/server exchanges over loopback TCP.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ctstore::network::{Client, Server, ShutdownHandle};
use ctstore::protocol::{read_response, ErrorCode, Status};
use ctstore::{Config, Engine, Result, StoreError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    _temp_dir: TempDir,
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    fn start(max_connections: usize) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp_dir.path())
            .storage_depth(3)
            .listen_addr("127.0.0.1:0")
            .max_connections(max_connections)
            .build();

        let engine = Arc::new(Engine::open(config.clone()).unwrap());
        let server = Server::bind(config, engine).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        Self {
            _temp_dir: temp_dir,
            addr,
            shutdown,
            thread: Some(thread),
        }
    }

    fn client(&self) -> Client {
        Client::connect(self.addr).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Retry `f` until it succeeds or a few seconds pass
fn eventually<T>(mut f: impl FnMut() -> Option<T>) -> T {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(value) = f() {
            return value;
        }
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(20));
    }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = TestServer::start(4);
    let mut client = server.client();

    client.ping().unwrap();
}

#[test]
fn test_create_lookup_update_scan() {
    let server = TestServer::start(4);
    let mut client = server.client();

    client.create(b"1234xyzw", b"unicorn").unwrap();
    client.create(b"1245abcd", b"Alice").unwrap();
    assert_eq!(client.lookup(b"1234xyzw").unwrap(), b"unicorn");

    client.update(b"1245abcd", b"Bob").unwrap();
    assert_eq!(client.lookup(b"1245abcd").unwrap(), b"Bob");

    assert_eq!(
        client.scan().unwrap(),
        vec![b"1234xyzw".to_vec(), b"1245abcd".to_vec()]
    );
}

#[test]
fn test_recoverable_outcomes() {
    let server = TestServer::start(4);
    let mut client = server.client();

    assert!(matches!(client.lookup(b"absent"), Err(StoreError::NotFound)));
    assert!(matches!(client.update(b"absent", b"v"), Err(StoreError::NotFound)));

    client.create(b"present", b"v").unwrap();
    assert!(matches!(
        client.create(b"present", b"w"),
        Err(StoreError::EntryAlreadyExists)
    ));
    assert_eq!(client.lookup(b"present").unwrap(), b"v");
}

#[test]
fn test_empty_value_and_empty_scan() {
    let server = TestServer::start(4);
    let mut client = server.client();

    assert!(client.scan().unwrap().is_empty());

    client.create(b"k", b"").unwrap();
    assert_eq!(client.lookup(b"k").unwrap(), Vec::<u8>::new());
}

#[test]
fn test_clients_share_the_store() {
    let server = TestServer::start(4);
    let mut writer = server.client();
    let mut reader = server.client();

    writer.create(b"shared", b"value").unwrap();

    assert_eq!(reader.lookup(b"shared").unwrap(), b"value");
}

// =============================================================================
// Error Reply Tests
// =============================================================================

#[test]
fn test_bad_version_gets_error_and_connection_survives() {
    let server = TestServer::start(4);
    let mut stream = TcpStream::connect(server.addr).unwrap();

    stream.write_all(&[0x01, 0x05, 0x00, 0x00, 0x00]).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.error_details().unwrap().0, ErrorCode::BadVersion);

    // PING on the same connection
    stream.write_all(&[0x00, 0x05, 0x00, 0x00, 0x00]).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.payload, Some(b"PONG".to_vec()));
}

#[test]
fn test_unknown_command_and_malformed_payload() {
    let server = TestServer::start(4);
    let mut stream = TcpStream::connect(server.addr).unwrap();

    stream.write_all(&[0x00, 0x7f, 0x00, 0x00, 0x00]).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.error_details().unwrap().0, ErrorCode::BadCommand);

    // LOOKUP with a truncated key length
    stream.write_all(&[0x00, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00]).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.error_details().unwrap().0, ErrorCode::Malformed);
}

#[test]
fn test_long_key_round_trip() {
    let server = TestServer::start(4);
    let mut client = server.client();
    let key = vec![b'k'; 1000];

    client.create(&key, b"v").unwrap();

    assert_eq!(client.lookup(&key).unwrap(), b"v");
    assert_eq!(client.scan().unwrap(), vec![key]);
}

// =============================================================================
// Connection Limit Tests
// =============================================================================

#[test]
fn test_busy_server_refuses_extra_connection() {
    let server = TestServer::start(1);

    let mut first = server.client();
    first.ping().unwrap();

    let mut second = TcpStream::connect(server.addr).unwrap();
    let response = read_response(&mut second).unwrap();
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.error_details().unwrap().0, ErrorCode::ServerBusy);

    // The slot frees up once the first client leaves
    drop(first);
    eventually(|| {
        let mut client = Client::connect(server.addr).ok()?;
        client.ping().ok()
    });
}

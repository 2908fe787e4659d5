//! TCP Server Tests
//!
//! These tests verify:
//! - Query calls over a real socket
//! - Error statuses on the wire
//! - Several clients served at once
//! - Graceful shutdown

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use vstorage::network::{Server, ShutdownHandle, TcpTransport};
use vstorage::protocol::{encode_request, read_reply, RequestFrame, MAX_FRAME_SIZE};
use vstorage::service::DATA_METHOD;
use vstorage::config::ConfigBuilder;
use vstorage::{
    ChildrenRequest, Code, Config, DataRequest, Dispatcher, MemoryStore, PageRequest,
    QueryClient, QueryServer, Transport, VstorageError,
};

// =============================================================================
// Helper Functions
// =============================================================================

struct RunningServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn start_server() -> RunningServer {
    let store = MemoryStore::from_entries([
        ("published/wallet/agoric1abc", "abc"),
        ("published/wallet/agoric1def", "def"),
        ("published/wallet/agoric1ghi", "ghi"),
    ])
    .unwrap();

    start_server_with(store, Config::builder())
}

fn start_server_with(store: MemoryStore, builder: ConfigBuilder) -> RunningServer {
    let config = builder
        .listen_addr("127.0.0.1:0")
        .worker_threads(4)
        .read_timeout_ms(2000)
        .build();
    let service = Arc::new(QueryServer::with_config(store, &config));
    let dispatcher = Arc::new(Dispatcher::for_service(service));

    let mut server = Server::new(config, dispatcher);
    let addr = server.bind().unwrap();
    let shutdown = server.shutdown_handle();
    let thread = thread::spawn(move || {
        server.run().unwrap();
    });

    RunningServer {
        addr,
        shutdown,
        thread: Some(thread),
    }
}

fn connect(server: &RunningServer) -> QueryClient<TcpTransport> {
    let transport = TcpTransport::connect(server.addr).unwrap();
    transport.set_read_timeout_ms(2000).unwrap();
    QueryClient::new(transport)
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_data_over_tcp() {
    let server = start_server();
    let client = connect(&server);

    let response = client
        .data(&DataRequest::new("/published/wallet/agoric1def"))
        .unwrap();
    assert_eq!(response.value, "def");
}

#[test]
fn test_children_pages_over_tcp() {
    let server = start_server();
    let client = connect(&server);

    let first = client
        .children(
            &ChildrenRequest::new("/published/wallet").with_pagination(PageRequest::with_limit(2)),
        )
        .unwrap();
    assert_eq!(first.children, vec!["agoric1abc", "agoric1def"]);

    let next_key = first.next_key().unwrap().to_vec();
    let second = client
        .children(
            &ChildrenRequest::new("/published/wallet")
                .with_pagination(PageRequest::after(next_key, 2)),
        )
        .unwrap();
    assert_eq!(second.children, vec!["agoric1ghi"]);
    assert_eq!(second.next_key(), None);
}

#[test]
fn test_many_calls_on_one_connection() {
    let server = start_server();
    let client = connect(&server);

    for _ in 0..50 {
        let response = client
            .data(&DataRequest::new("published/wallet/agoric1abc"))
            .unwrap();
        assert_eq!(response.value, "abc");
    }
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_not_found_status_over_tcp() {
    let server = start_server();
    let client = connect(&server);

    match client.data(&DataRequest::new("/missing")) {
        Err(VstorageError::Remote(remote)) => assert_eq!(remote.code, Code::NotFound),
        other => panic!("expected NotFound, got {:?}", other),
    }

    // The connection stays usable after an error reply
    assert_eq!(
        client
            .data(&DataRequest::new("published/wallet/agoric1ghi"))
            .unwrap()
            .value,
        "ghi"
    );
}

#[test]
fn test_unimplemented_method_over_tcp() {
    let server = start_server();
    let client = connect(&server);

    let err = client
        .transport()
        .invoke("/agoric.vstorage.Query/Delete", &[])
        .unwrap_err();
    assert_eq!(err.code(), Code::Unimplemented);
}

#[test]
fn test_corrupt_payload_over_tcp() {
    let server = start_server();
    let client = connect(&server);

    let err = client.transport().invoke(DATA_METHOD, &[0x0A, 0x7F]).unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[test]
fn test_oversized_frame_gets_error_reply() {
    let server = start_server();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    // Header claims a payload above the server's frame limit
    let mut frame = encode_request(&RequestFrame::new(DATA_METHOD, Vec::new()), MAX_FRAME_SIZE)
        .unwrap()
        .to_vec();
    let len_at = frame.len() - 4;
    frame[len_at..].copy_from_slice(&u32::MAX.to_be_bytes());
    stream.write_all(&frame).unwrap();

    let reply = read_reply(&mut stream, MAX_FRAME_SIZE).unwrap();
    assert_eq!(reply.code, Code::InvalidArgument);

    // Server closes the connection afterwards
    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn test_response_above_frame_limit_gets_internal_status() {
    let store = MemoryStore::from_entries([("big", "x".repeat(2048)), ("small", "ok".to_string())])
        .unwrap();
    let server = start_server_with(store, Config::builder().max_frame_size(1024));

    let transport = TcpTransport::connect(server.addr).unwrap().max_frame_size(1024);
    transport.set_read_timeout_ms(2000).unwrap();
    let client = QueryClient::new(transport);

    match client.data(&DataRequest::new("big")) {
        Err(VstorageError::Remote(remote)) => {
            assert_eq!(remote.code, Code::Internal);
            assert!(remote.message.contains("too large"));
        }
        other => panic!("expected Internal status, got {:?}", other),
    }

    // Same connection keeps working
    assert_eq!(client.data(&DataRequest::new("small")).unwrap().value, "ok");
}

#[test]
fn test_raised_frame_limit_carries_large_values() {
    let limit = 32 * 1024 * 1024;
    let value = "v".repeat(17 * 1024 * 1024);
    let store = MemoryStore::from_entries([("big", value.clone())]).unwrap();
    let server = start_server_with(store, Config::builder().max_frame_size(limit));

    let transport = TcpTransport::connect(server.addr).unwrap().max_frame_size(limit);
    transport.set_read_timeout_ms(10_000).unwrap();
    let client = QueryClient::new(transport);

    let response = client.data(&DataRequest::new("big")).unwrap();
    assert_eq!(response.value.len(), value.len());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_clients() {
    let server = start_server();
    let addr = server.addr;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(move || {
                let transport = TcpTransport::connect(addr).unwrap();
                transport.set_read_timeout_ms(2000).unwrap();
                let client = QueryClient::new(transport);
                for _ in 0..20 {
                    let response = client
                        .children(&ChildrenRequest::new("published/wallet"))
                        .unwrap();
                    assert_eq!(response.children.len(), 3);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_abrupt_clients_do_not_stop_server() {
    let server = start_server();

    for _ in 0..20 {
        let stream = TcpStream::connect(server.addr).unwrap();
        drop(stream);
    }
    let mut half_written = TcpStream::connect(server.addr).unwrap();
    half_written.write_all(&[0x00, 0x10, b'/']).unwrap();
    drop(half_written);

    let client = connect(&server);
    assert_eq!(
        client
            .data(&DataRequest::new("published/wallet/agoric1abc"))
            .unwrap()
            .value,
        "abc"
    );
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_shutdown_stops_run() {
    let mut server = start_server();
    assert!(!server.shutdown.is_shutdown());

    server.shutdown.shutdown();
    assert!(server.shutdown.is_shutdown());
    server.thread.take().unwrap().join().unwrap();
}

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use futures_util::SinkExt;
use planwatch_core::{SyncClient, SyncClientBuilder, SyncView};
use serde_json::{json, Value};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

/// How long tests wait for anything before failing.
pub const WAIT: Duration = Duration::from_secs(5);

pub type ServerSocket = WebSocketStream<TcpStream>;

#[derive(Debug)]
struct SnapshotResponse {
    status: u16,
    body: String,
}

/// In-process tracker server: serves `/api/plans`, accepts WebSocket
/// upgrades on `/api/ws`, and holds open event streams on `/api/events`.
pub struct TestServer {
    addr: SocketAddr,
    snapshot: Arc<Mutex<SnapshotResponse>>,
    snapshot_hits: Arc<AtomicUsize>,
    sockets: mpsc::UnboundedReceiver<ServerSocket>,
    streams: mpsc::UnboundedReceiver<TcpStream>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(plans: Value) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to read local address");

        let snapshot = Arc::new(Mutex::new(SnapshotResponse {
            status: 200,
            body: plans.to_string(),
        }));
        let snapshot_hits = Arc::new(AtomicUsize::new(0));
        let (sockets_tx, sockets) = mpsc::unbounded_channel();
        let (streams_tx, streams) = mpsc::unbounded_channel();

        let task = tokio::spawn({
            let snapshot = Arc::clone(&snapshot);
            let snapshot_hits = Arc::clone(&snapshot_hits);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(handle_connection(
                        stream,
                        Arc::clone(&snapshot),
                        Arc::clone(&snapshot_hits),
                        sockets_tx.clone(),
                        streams_tx.clone(),
                    ));
                }
            }
        });

        Self {
            addr,
            snapshot,
            snapshot_hits,
            sockets,
            streams,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A builder pointed at this server with test-friendly timings.
    pub fn client_builder(&self) -> SyncClientBuilder {
        SyncClientBuilder::new()
            .with_base_url(self.base_url())
            .with_reconnect_interval(Duration::from_millis(20))
            .with_max_reconnect_interval(Duration::from_millis(100))
    }

    pub fn set_plans(&self, plans: Value) {
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.status = 200;
        snapshot.body = plans.to_string();
    }

    pub fn fail_snapshots(&self, status: u16) {
        self.snapshot.lock().unwrap().status = status;
    }

    pub fn snapshot_hits(&self) -> usize {
        self.snapshot_hits.load(Ordering::SeqCst)
    }

    pub async fn wait_for_snapshot_hits(&self, at_least: usize) {
        tokio::time::timeout(WAIT, async {
            while self.snapshot_hits() < at_least {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "Expected {at_least} snapshot requests, saw {}",
                self.snapshot_hits()
            )
        });
    }

    /// Waits for the client to open a WebSocket.
    pub async fn accept_socket(&mut self) -> ServerSocket {
        tokio::time::timeout(WAIT, self.sockets.recv())
            .await
            .expect("Timed out waiting for a WebSocket connection")
            .expect("Server stopped")
    }

    /// Waits for the client to open an event stream. Response headers have
    /// already been written.
    pub async fn accept_stream(&mut self) -> TcpStream {
        tokio::time::timeout(WAIT, self.streams.recv())
            .await
            .expect("Timed out waiting for an event stream")
            .expect("Server stopped")
    }

    /// Asserts that no new WebSocket arrives within `window`.
    pub async fn assert_no_socket(&mut self, window: Duration) {
        if let Ok(Some(_)) = tokio::time::timeout(window, self.sockets.recv()).await {
            panic!("Unexpected WebSocket connection");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    snapshot: Arc<Mutex<SnapshotResponse>>,
    snapshot_hits: Arc<AtomicUsize>,
    sockets: mpsc::UnboundedSender<ServerSocket>,
    streams: mpsc::UnboundedSender<TcpStream>,
) {
    let Some(path) = peek_request_path(&stream).await else {
        return;
    };

    if path.starts_with("/api/ws") {
        if let Ok(socket) = accept_async(stream).await {
            let _ = sockets.send(socket);
        }
        return;
    }

    let mut stream = stream;
    if read_request_head(&mut stream).await.is_none() {
        return;
    }

    if path.starts_with("/api/plans") {
        snapshot_hits.fetch_add(1, Ordering::SeqCst);
        let (status, body) = {
            let snapshot = snapshot.lock().unwrap();
            (snapshot.status, snapshot.body.clone())
        };
        let response = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            reason(status),
            body.len()
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    } else if path.starts_with("/api/events") {
        let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n";
        if stream.write_all(head.as_bytes()).await.is_ok() {
            let _ = streams.send(stream);
        }
    } else {
        let _ = stream
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await;
    }
}

/// Reads the request path without consuming any bytes, so the WebSocket
/// handshake can still see the whole request.
async fn peek_request_path(stream: &TcpStream) -> Option<String> {
    let mut buf = [0u8; 1024];
    for _ in 0..200 {
        let n = stream.peek(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        if let Some(end) = buf[..n].windows(2).position(|w| w == b"\r\n") {
            let line = String::from_utf8_lossy(&buf[..end]).into_owned();
            return line.split_whitespace().nth(1).map(str::to_string);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    None
}

async fn read_request_head(stream: &mut TcpStream) -> Option<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }
    Some(())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Sends a JSON envelope over the server side of a WebSocket.
pub async fn send_envelope(socket: &mut ServerSocket, envelope: Value) {
    socket
        .send(Message::text(envelope.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Writes one server-sent event to an open stream.
pub async fn send_event(stream: &mut TcpStream, name: &str, data: &Value) {
    let frame = format!("event: {name}\ndata: {data}\n\n");
    stream
        .write_all(frame.as_bytes())
        .await
        .expect("Failed to write event");
}

pub fn envelope(kind: &str, data: Value, id: Option<&str>) -> Value {
    let mut envelope = json!({
        "type": kind,
        "data": data,
        "timestamp": "2024-05-01T10:00:00Z",
    });
    if let Some(id) = id {
        envelope["id"] = json!(id);
    }
    envelope
}

pub fn plan_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "parent_id": null,
        "title": title,
        "description": null,
        "status": "pending",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
    })
}

pub fn step_json(id: &str, plan_id: &str, order: i64) -> Value {
    json!({
        "id": id,
        "plan_id": plan_id,
        "title": format!("Step {id}"),
        "description": null,
        "status": "pending",
        "step_order": order,
        "progress": 0,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
    })
}

/// Waits until the client's view satisfies `predicate`.
pub async fn wait_for_view(
    client: &SyncClient,
    predicate: impl FnMut(&SyncView) -> bool,
) -> SyncView {
    let mut views = client.subscribe();
    let view = tokio::time::timeout(WAIT, views.wait_for(predicate))
        .await
        .expect("Timed out waiting for view")
        .expect("Client stopped");
    view.clone()
}

/// Builds a client and waits for its first WebSocket and on-connect
/// snapshot.
pub async fn connected_client(server: &mut TestServer) -> (SyncClient, ServerSocket) {
    let client = server
        .client_builder()
        .build()
        .await
        .expect("Failed to build client");
    let socket = server.accept_socket().await;
    wait_for_view(&client, |view| view.is_connected() && !view.loading).await;
    server.wait_for_snapshot_hits(2).await;
    (client, socket)
}

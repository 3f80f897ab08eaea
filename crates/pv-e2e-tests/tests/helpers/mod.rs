//! Shared test harness for E2E integration tests.
//!
//! Serves the real router on an ephemeral port and talks to it over real
//! WebSocket connections, so every hop from ingestion to the socket is
//! exercised.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use pv_server::routes::build_router;
use pv_server::state::AppState;

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub const WRITE_LINE: &str = r"21:06:14.1822 System (4.6048) FileIO/Write 'C:\WINDOWS\system32\Logfiles\WMI\RtBackup\EtwRTwtrace-rt.etl' offset: 72, size: 65392 -> SUCCESS";
pub const READ_LINE: &str =
    r"21:06:14.1900 explorer.exe (5120.77) FileIO/Read 'C:\Users\desktop.ini' -> SUCCESS";
pub const REG_LINE: &str =
    r"21:06:15.0002 svchost.exe (880.12) Registry/QueryValue 'HKLM\SYSTEM\Select' -> SUCCESS";

/// A running server bound to 127.0.0.1 on a random port.
pub struct TestServer {
    pub state: AppState,
    pub addr: SocketAddr,
    server: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let state = AppState::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            state,
            addr,
            server,
        }
    }

    /// Connect a subscriber and consume the welcome message.
    pub async fn connect(&self) -> Client {
        self.connect_path("/").await
    }

    pub async fn connect_path(&self, path: &str) -> Client {
        let url = format!("ws://{}{}", self.addr, path);
        let (mut client, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("ws connect failed");
        let welcome = next_json(&mut client).await;
        assert_eq!(welcome["status"], "connected");
        client
    }

    /// Wait until the hub has exactly `n` subscribers.
    pub async fn wait_for_subscribers(&self, n: usize) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.state.hub.subscriber_count().await != n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("subscriber count never settled");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Receive the next text frame as JSON, skipping control frames.
pub async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for message")
            .expect("connection closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("non-JSON text frame");
        }
    }
}

/// Assert nothing arrives within `ms` milliseconds.
pub async fn expect_silence(client: &mut Client, ms: u64) {
    if let Ok(Some(Ok(msg))) =
        tokio::time::timeout(Duration::from_millis(ms), client.next()).await
    {
        panic!("unexpected message: {msg:?}");
    }
}

/// Send a JSON value as a text frame.
pub async fn send_json(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

pub async fn send_text(client: &mut Client, text: &str) {
    client.send(Message::Text(text.into())).await.unwrap();
}

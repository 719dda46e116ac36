//! Common test utilities: frame builders and a scripted transport.

// Allow unused items since this module is shared across multiple test
// files and not every helper is used in every file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use rootbot::Root;
#[allow(unused_imports)]
pub use rootbot::error::RootError;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rootbot::transport::{Peripheral, ScanFilter, Transport};
use tokio::sync::mpsc;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// Build a 20-byte inbound frame with the payload left-aligned in the
/// 16-byte window.
#[allow(dead_code)]
pub fn frame(device: u8, command: u8, payload: &[u8]) -> Bytes {
    assert!(payload.len() <= 16, "payload too long for a frame");
    let mut bytes = vec![0u8; 20];
    bytes[0] = device;
    bytes[1] = command;
    bytes[3..3 + payload.len()].copy_from_slice(payload);
    Bytes::from(bytes)
}

/// Test-side handle onto a [`MockTransport`] that has been moved into a
/// session: inject inbound frames, inspect writes, flip the link state.
#[allow(dead_code)]
pub struct MockHandle {
    pub written: Arc<Mutex<Vec<Vec<u8>>>>,
    pub inbound: mpsc::Sender<Bytes>,
    pub connected: Arc<AtomicBool>,
}

/// In-memory transport: records every write, plays back injected frames
/// as notifications.
#[allow(dead_code)]
pub struct MockTransport {
    connected: Arc<AtomicBool>,
    written: Arc<Mutex<Vec<Vec<u8>>>>,
    notifications: Option<mpsc::Receiver<Bytes>>,
}

impl MockTransport {
    #[allow(dead_code)]
    pub fn new() -> (Self, MockHandle) {
        let (inbound, notifications) = mpsc::channel(32);
        let connected = Arc::new(AtomicBool::new(false));
        let written = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                connected: Arc::clone(&connected),
                written: Arc::clone(&written),
                notifications: Some(notifications),
            },
            MockHandle {
                written,
                inbound,
                connected,
            },
        )
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn scan(&mut self, _filter: &ScanFilter) -> Result<Vec<Peripheral>, RootError> {
        Ok(vec![Peripheral {
            id: "robot-0".to_string(),
            name: Some("Root".to_string()),
        }])
    }

    async fn connect(&mut self, _id: &str) -> Result<(), RootError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), RootError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn write(
        &mut self,
        _service: &str,
        _characteristic: &str,
        bytes: &[u8],
    ) -> Result<(), RootError> {
        self.written.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    async fn start_notifications(
        &mut self,
        _service: &str,
        _characteristic: &str,
    ) -> Result<mpsc::Receiver<Bytes>, RootError> {
        self.notifications
            .take()
            .ok_or_else(|| RootError::Transport("notifications already started".to_string()))
    }
}

/// Opt-in log output for debugging test runs: `RUST_LOG=debug cargo test`
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A session already connected to a fresh mock transport.
#[allow(dead_code)]
pub async fn connected_session() -> (Root<MockTransport>, MockHandle) {
    init_tracing();
    let (transport, handle) = MockTransport::new();
    let mut robot = Root::new(transport);
    robot.connect("robot-0").await.expect("mock connect failed");
    (robot, handle)
}

/// Let the session's pump drain everything already injected.
#[allow(dead_code)]
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

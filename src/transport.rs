use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::RootError;

/// Identifier service the robot advertises; discovery filters on it.
pub const IDENTIFIER_SERVICE: &str = "48c5d828-ac2a-442d-97a3-0c9822b04979";

/// Nordic-style UART service carrying the 20-byte frames.
pub const UART_SERVICE: &str = "6e400001-b5a3-f393-e0a9-e50e24dcca9e";

/// Write characteristic (host to robot).
pub const RX_CHARACTERISTIC: &str = "6e400002-b5a3-f393-e0a9-e50e24dcca9e";

/// Notify characteristic (robot to host).
pub const TX_CHARACTERISTIC: &str = "6e400003-b5a3-f393-e0a9-e50e24dcca9e";

/// Discovery filter: required advertised services plus the services the
/// session touches after connecting.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub services: Vec<&'static str>,
    pub optional_services: Vec<&'static str>,
}

impl ScanFilter {
    /// The canonical filter for this protocol.
    pub fn for_robot() -> Self {
        Self {
            services: vec![IDENTIFIER_SERVICE],
            optional_services: vec![UART_SERVICE],
        }
    }
}

/// A discovered connection candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripheral {
    pub id: String,
    pub name: Option<String>,
}

/// The link-layer capability the session drives.
///
/// Implementations own discovery, connection establishment and raw byte
/// delivery; the session layers framing, sensor state and command
/// correlation on top. Notification payloads arrive on the channel
/// returned by [`Transport::start_notifications`].
#[allow(async_fn_in_trait)]
pub trait Transport: Send {
    fn is_connected(&self) -> bool;

    async fn scan(&mut self, filter: &ScanFilter) -> Result<Vec<Peripheral>, RootError>;

    async fn connect(&mut self, id: &str) -> Result<(), RootError>;

    async fn disconnect(&mut self) -> Result<(), RootError>;

    async fn write(
        &mut self,
        service: &str,
        characteristic: &str,
        bytes: &[u8],
    ) -> Result<(), RootError>;

    async fn start_notifications(
        &mut self,
        service: &str,
        characteristic: &str,
    ) -> Result<mpsc::Receiver<Bytes>, RootError>;
}

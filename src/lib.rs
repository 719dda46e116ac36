//! Driver for the Root educational robot's BLE protocol.
//!
//! The robot speaks fixed-size 20-byte frames over a Nordic-style UART
//! service: `[device][command][packet id][16-byte payload][checksum]`.
//! Commands are fire-and-forget on the wire; long-running ones (drive,
//! rotate, tone, phrase, marker) are correlated with the asynchronous
//! "finished" frame the robot sends back, bounded by a per-command
//! deadline. The link is lossy and unordered, so the driver also keeps a
//! snapshot of the latest bumper/touch/color readings and throttles
//! outbound writes to what the radio tolerates.
//!
//! The BLE stack itself is not part of this crate: hosts supply a
//! [`transport::Transport`] implementation and drive a [`Root`] session
//! on top of it.

pub mod command;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod limiter;
pub mod packet;
pub mod robot;
pub mod sensors;
pub mod transport;

// Re-export the session type and error for easy access
pub use error::RootError;
pub use robot::{Root, SessionConfig};

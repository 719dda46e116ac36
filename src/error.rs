use std::time::Duration;
use thiserror::Error;

use crate::command::CommandKind;

/// The primary error type for the `rootbot` library.
///
/// Disconnected and rate-limited sends are deliberately absent: both
/// resolve as silent no-ops on the send path.
#[derive(Error, Debug)]
pub enum RootError {
    #[error("{command} did not report completion within {timeout:?}")]
    Timeout {
        command: CommandKind,
        timeout: Duration,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    #[error("unrecognized {menu} selector: {value:?}")]
    UnrecognizedSelector { menu: &'static str, value: String },
}

use num_enum::{FromPrimitive, IntoPrimitive};
use tracing::warn;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::RootError;

/// Size of a wire frame: header, payload window, checksum.
pub const FRAME_SIZE: usize = 20;

/// Size of the payload window inside every frame.
pub const PAYLOAD_SIZE: usize = 16;

/// Offset of the payload window within the frame.
pub const PAYLOAD_OFFSET: usize = 3;

/// Device ids multiplexed on the single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Device {
    General = 0,
    Motors = 1,
    Marker = 2,
    LightRing = 3,
    ColorSensor = 4,
    Sound = 5,
    Bumpers = 12,
    Touch = 17,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Command ids, grouped by device. Several devices reuse the same id for
/// the outbound command and its inbound "finished" notification.
pub mod cmd {
    // General (0)
    pub const STOP_AND_RESET: u8 = 3;
    pub const NOSE_PRESS: u8 = 4;

    // Motors (1)
    pub const SET_WHEEL_SPEEDS: u8 = 4;
    pub const DRIVE_DISTANCE: u8 = 8;
    pub const ROTATE_ANGLE: u8 = 12;

    // Marker (2)
    pub const SET_MARKER: u8 = 0;

    // Light ring (3)
    pub const SET_LIGHTS: u8 = 2;

    // Color sensor (4)
    pub const COLOR_SCAN: u8 = 2;

    // Sound (5)
    pub const PLAY_TONE: u8 = 0;
    pub const SAY_PHRASE: u8 = 4;

    // Bumpers (12) / touch (17)
    pub const BUMPER_EVENT: u8 = 0;
    pub const TOUCH_EVENT: u8 = 0;
}

/// One 20-byte wire frame.
///
/// `packet_id` and `checksum` exist in the frame layout but carry no
/// meaning in this driver: both are always written as zero and never
/// validated on receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawFrame {
    pub device: u8,
    pub command: u8,
    pub packet_id: u8,
    pub payload: [u8; PAYLOAD_SIZE],
    pub checksum: u8,
}

impl RawFrame {
    /// Build an outbound frame. The payload is right-padded with zeros to
    /// the 16-byte window; anything longer is truncated to it.
    pub fn for_command(device: Device, command: u8, payload: &[u8]) -> Self {
        if payload.len() > PAYLOAD_SIZE {
            warn!(
                len = payload.len(),
                "payload exceeds the {PAYLOAD_SIZE}-byte window, truncating"
            );
        }
        let mut window = [0u8; PAYLOAD_SIZE];
        let n = payload.len().min(PAYLOAD_SIZE);
        window[..n].copy_from_slice(&payload[..n]);
        RawFrame {
            device: device.into(),
            command,
            packet_id: 0,
            payload: window,
            checksum: 0,
        }
    }

    /// Parse an inbound notification. Anything shorter than a full frame
    /// is rejected; trailing bytes beyond the frame are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, RootError> {
        if bytes.len() < FRAME_SIZE {
            return Err(RootError::FrameTooShort {
                expected: FRAME_SIZE,
                actual: bytes.len(),
            });
        }
        let (frame, _rest) = Self::read_from_prefix(bytes).map_err(|_| RootError::FrameTooShort {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        })?;
        Ok(frame)
    }
}

/// Split a color-scan payload into 32 channel readings. Each payload byte
/// carries two readings: high nibble first, then low nibble.
pub fn decode_color_nibbles(payload: &[u8; PAYLOAD_SIZE]) -> [u8; 2 * PAYLOAD_SIZE] {
    let mut readings = [0u8; 2 * PAYLOAD_SIZE];
    for i in 0..PAYLOAD_SIZE {
        readings[2 * i] = payload[i] >> 4;
        readings[2 * i + 1] = payload[i] & 0x0F;
    }
    readings
}

/// UTF-8 bytes of `text` fitted to the payload window: truncated on a char
/// boundary, zero-padded on the right.
pub fn text_payload(text: &str) -> [u8; PAYLOAD_SIZE] {
    let mut window = [0u8; PAYLOAD_SIZE];
    let mut end = text.len().min(PAYLOAD_SIZE);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    window[..end].copy_from_slice(&text.as_bytes()[..end]);
    window
}

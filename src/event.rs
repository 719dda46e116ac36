use modular_bitfield::prelude::*;
use num_enum::FromPrimitive;

use crate::dispatch::Signal;
use crate::packet::{Device, RawFrame, cmd, decode_color_nibbles};

// Bumper and touch events carry a 4-byte timestamp before the state byte;
// the driver reads only the state byte at payload offset 4.
const STATE_BYTE: usize = 4;

/// Bumper state byte: bit 7 = left, bit 6 = right.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy)]
pub struct BumperBits {
    #[skip]
    unused: B6,
    pub right: bool,
    pub left: bool,
}

/// Touch state byte, one bit per zone from bit 7 down:
/// front-left, front-right, rear-left, rear-right.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy)]
pub struct TouchBits {
    #[skip]
    unused: B4,
    pub rear_right: bool,
    pub rear_left: bool,
    pub front_right: bool,
    pub front_left: bool,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Nose button press; hosts treat this as stop-all.
    NosePress,
    Bumper {
        left: bool,
        right: bool,
    },
    Touch {
        front_left: bool,
        front_right: bool,
        rear_left: bool,
        rear_right: bool,
    },
    /// 32 color-channel readings, one per physical sensor slot.
    ColorScan([u8; 32]),
    DriveFinished,
    RotateFinished,
    MarkerFinished,
    ToneFinished,
    PhraseFinished,
    /// A (device, command) pair this driver does not model. Ignored
    /// downstream; newer firmware is free to send these.
    Unhandled(RawFrame),
}

impl From<RawFrame> for Event {
    fn from(frame: RawFrame) -> Self {
        match (Device::from_primitive(frame.device), frame.command) {
            (Device::General, cmd::NOSE_PRESS) => Event::NosePress,
            (Device::Bumpers, cmd::BUMPER_EVENT) => {
                let bits = BumperBits::from_bytes([frame.payload[STATE_BYTE]]);
                Event::Bumper {
                    left: bits.left(),
                    right: bits.right(),
                }
            }
            (Device::Touch, cmd::TOUCH_EVENT) => {
                let bits = TouchBits::from_bytes([frame.payload[STATE_BYTE]]);
                Event::Touch {
                    front_left: bits.front_left(),
                    front_right: bits.front_right(),
                    rear_left: bits.rear_left(),
                    rear_right: bits.rear_right(),
                }
            }
            (Device::ColorSensor, cmd::COLOR_SCAN) => {
                Event::ColorScan(decode_color_nibbles(&frame.payload))
            }
            (Device::Marker, cmd::SET_MARKER) => Event::MarkerFinished,
            (Device::Motors, cmd::DRIVE_DISTANCE) => Event::DriveFinished,
            (Device::Motors, cmd::ROTATE_ANGLE) => Event::RotateFinished,
            (Device::Sound, cmd::PLAY_TONE) => Event::ToneFinished,
            (Device::Sound, cmd::SAY_PHRASE) => Event::PhraseFinished,
            _ => Event::Unhandled(frame),
        }
    }
}

impl Event {
    /// The completion signal this event publishes, if any.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Event::DriveFinished | Event::RotateFinished => Some(Signal::MotorFinished),
            Event::MarkerFinished => Some(Signal::MarkerFinished),
            Event::ToneFinished | Event::PhraseFinished => Some(Signal::SoundFinished),
            Event::NosePress => Some(Signal::NosePressed),
            _ => None,
        }
    }
}

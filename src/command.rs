use std::str::FromStr;
use std::time::Duration;

use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::warn;

use crate::dispatch::Signal;
use crate::error::RootError;
use crate::packet::{Device, RawFrame, cmd, text_payload};

/// Marker actuator positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum MarkerPosition {
    #[strum(to_string = "up")]
    Up = 0x00,
    #[strum(to_string = "down")]
    Down = 0x01,
    #[strum(to_string = "eraser down")]
    EraserDown = 0x02,
}

impl FromStr for MarkerPosition {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "eraser down" | "eraser-down" => Ok(Self::EraserDown),
            other => {
                warn!(value = other, "unrecognized marker selector");
                Err(RootError::UnrecognizedSelector {
                    menu: "marker",
                    value: other.to_string(),
                })
            }
        }
    }
}

/// Outbound commands understood by the robot.
///
/// Long-running commands carry a completion signal and a deadline; the
/// rest resolve as soon as the frame is on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DriveDistance { cm: f64 },
    RotateAngle { degrees: f64 },
    SetWheelSpeeds { left_cm_s: f64, right_cm_s: f64 },
    SetMarker(MarkerPosition),
    SetLights { red: u8, green: u8, blue: u8 },
    PlayTone { frequency_hz: u32, duration: Duration },
    SayPhrase(String),
    StopAll,
}

/// Command discriminant, used in timeout errors and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CommandKind {
    #[strum(to_string = "drive distance")]
    DriveDistance,
    #[strum(to_string = "rotate angle")]
    RotateAngle,
    #[strum(to_string = "set wheel speeds")]
    SetWheelSpeeds,
    #[strum(to_string = "set marker")]
    SetMarker,
    #[strum(to_string = "set lights")]
    SetLights,
    #[strum(to_string = "play tone")]
    PlayTone,
    #[strum(to_string = "say phrase")]
    SayPhrase,
    #[strum(to_string = "stop all")]
    StopAll,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::DriveDistance { .. } => CommandKind::DriveDistance,
            Command::RotateAngle { .. } => CommandKind::RotateAngle,
            Command::SetWheelSpeeds { .. } => CommandKind::SetWheelSpeeds,
            Command::SetMarker(_) => CommandKind::SetMarker,
            Command::SetLights { .. } => CommandKind::SetLights,
            Command::PlayTone { .. } => CommandKind::PlayTone,
            Command::SayPhrase(_) => CommandKind::SayPhrase,
            Command::StopAll => CommandKind::StopAll,
        }
    }

    /// The signal that reports this command finished, for correlated
    /// commands only.
    pub fn completion_signal(&self) -> Option<Signal> {
        match self {
            Command::DriveDistance { .. } | Command::RotateAngle { .. } => {
                Some(Signal::MotorFinished)
            }
            Command::SetMarker(_) => Some(Signal::MarkerFinished),
            Command::PlayTone { .. } | Command::SayPhrase(_) => Some(Signal::SoundFinished),
            _ => None,
        }
    }

    /// Deadline for the completion signal. These formulas are the
    /// protocol's only flow control: no acknowledgement field is checked.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Command::DriveDistance { cm } => {
                Some(Duration::from_millis((cm.abs() * 100.0) as u64 + 5000))
            }
            Command::RotateAngle { degrees } => {
                Some(Duration::from_millis((degrees.abs() * 15.0) as u64 + 5000))
            }
            Command::PlayTone { duration, .. } => {
                Some(Duration::from_millis(u64::from(clamp_tone_ms(duration)) + 500))
            }
            Command::SetMarker(_) | Command::SayPhrase(_) => Some(Duration::from_millis(5000)),
            _ => None,
        }
    }

    /// Lower the command to its wire frame.
    pub fn to_frame(&self) -> RawFrame {
        match self {
            Command::DriveDistance { cm } => {
                let mm = (cm * 10.0) as i32;
                RawFrame::for_command(Device::Motors, cmd::DRIVE_DISTANCE, &mm.to_be_bytes())
            }
            Command::RotateAngle { degrees } => {
                let decideg = (degrees * 10.0) as i32;
                RawFrame::for_command(Device::Motors, cmd::ROTATE_ANGLE, &decideg.to_be_bytes())
            }
            Command::SetWheelSpeeds { left_cm_s, right_cm_s } => {
                let mut payload = [0u8; 8];
                payload[..4].copy_from_slice(&clamp_speed(*left_cm_s).to_be_bytes());
                payload[4..].copy_from_slice(&clamp_speed(*right_cm_s).to_be_bytes());
                RawFrame::for_command(Device::Motors, cmd::SET_WHEEL_SPEEDS, &payload)
            }
            Command::SetMarker(position) => {
                RawFrame::for_command(Device::Marker, cmd::SET_MARKER, &[(*position).into()])
            }
            Command::SetLights { red, green, blue } => {
                let payload = [1, scale_channel(*red), scale_channel(*green), scale_channel(*blue)];
                RawFrame::for_command(Device::LightRing, cmd::SET_LIGHTS, &payload)
            }
            Command::PlayTone { frequency_hz, duration } => {
                let mut payload = [0u8; 6];
                payload[..4].copy_from_slice(&(*frequency_hz).clamp(20, 10_000).to_be_bytes());
                payload[4..].copy_from_slice(&clamp_tone_ms(duration).to_be_bytes());
                RawFrame::for_command(Device::Sound, cmd::PLAY_TONE, &payload)
            }
            Command::SayPhrase(text) => {
                RawFrame::for_command(Device::Sound, cmd::SAY_PHRASE, &text_payload(text))
            }
            Command::StopAll => RawFrame::for_command(Device::General, cmd::STOP_AND_RESET, &[]),
        }
    }
}

// All clamps saturate; out-of-range input is never an error.

fn clamp_speed(cm_s: f64) -> i32 {
    ((cm_s * 10.0) as i32).clamp(-100, 100)
}

fn clamp_tone_ms(duration: &Duration) -> u16 {
    duration.as_millis().min(u128::from(u16::MAX)) as u16
}

/// Rescale a 0..=100 percentage to the 0..=255 channel range.
fn scale_channel(percent: u8) -> u8 {
    ((u32::from(percent.min(100)) * 255 + 50) / 100) as u8
}

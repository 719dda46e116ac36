use std::str::FromStr;

use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::warn;

use crate::error::RootError;
use crate::event::Event;

/// Number of physical color-sensor slots.
pub const COLOR_SLOTS: usize = 32;

/// Number of possible color-index values.
pub const COLOR_BINS: usize = 16;

/// Colors the sensor reports, by protocol index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    #[strum(to_string = "white")]
    White = 0,
    #[strum(to_string = "black")]
    Black = 1,
    #[strum(to_string = "red")]
    Red = 2,
    #[strum(to_string = "green")]
    Green = 3,
    #[strum(to_string = "blue")]
    Blue = 4,
    #[strum(to_string = "orange")]
    Orange = 5,
    #[strum(to_string = "yellow")]
    Yellow = 6,
    #[strum(to_string = "magenta")]
    Magenta = 7,

    #[num_enum(catch_all)]
    #[strum(to_string = "unknown")]
    Unknown(u8),
}

impl FromStr for Color {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "orange" => Ok(Self::Orange),
            "yellow" => Ok(Self::Yellow),
            "magenta" => Ok(Self::Magenta),
            other => {
                warn!(value = other, "unrecognized color selector");
                Err(RootError::UnrecognizedSelector {
                    menu: "color",
                    value: other.to_string(),
                })
            }
        }
    }
}

/// Bumper query selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum BumperSide {
    #[strum(to_string = "left")]
    Left,
    #[strum(to_string = "right")]
    Right,
    #[strum(to_string = "either")]
    Either,
}

impl FromStr for BumperSide {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "either" | "any" => Ok(Self::Either),
            other => {
                warn!(value = other, "unrecognized bumper selector");
                Err(RootError::UnrecognizedSelector {
                    menu: "bumper",
                    value: other.to_string(),
                })
            }
        }
    }
}

/// Top-touch query selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum TouchZone {
    #[strum(to_string = "front-left")]
    FrontLeft,
    #[strum(to_string = "front-right")]
    FrontRight,
    #[strum(to_string = "rear-left")]
    RearLeft,
    #[strum(to_string = "rear-right")]
    RearRight,
    #[strum(to_string = "any")]
    Any,
}

impl FromStr for TouchZone {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front-left" => Ok(Self::FrontLeft),
            "front-right" => Ok(Self::FrontRight),
            "rear-left" => Ok(Self::RearLeft),
            "rear-right" => Ok(Self::RearRight),
            "any" => Ok(Self::Any),
            other => {
                warn!(value = other, "unrecognized touch selector");
                Err(RootError::UnrecognizedSelector {
                    menu: "touch",
                    value: other.to_string(),
                })
            }
        }
    }
}

/// Snapshot of the most recently observed sensor readings.
///
/// Mutated exclusively by the inbound decode path via [`SensorState::apply`];
/// every other method is a pure read. Each field is fully overwritten when
/// its packet type arrives, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorState {
    bumper_left: bool,
    bumper_right: bool,
    touch_front_left: bool,
    touch_front_right: bool,
    touch_rear_left: bool,
    touch_rear_right: bool,
    colors: [u8; COLOR_SLOTS],
    color_counts: [u8; COLOR_BINS],
}

impl SensorState {
    /// Fold one decoded event into the snapshot. Events without a sensor
    /// payload are no-ops.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Bumper { left, right } => {
                self.bumper_left = *left;
                self.bumper_right = *right;
            }
            Event::Touch {
                front_left,
                front_right,
                rear_left,
                rear_right,
            } => {
                self.touch_front_left = *front_left;
                self.touch_front_right = *front_right;
                self.touch_rear_left = *rear_left;
                self.touch_rear_right = *rear_right;
            }
            Event::ColorScan(readings) => {
                self.colors = *readings;
                let mut counts = [0u8; COLOR_BINS];
                for i in 0..COLOR_SLOTS {
                    counts[usize::from(self.colors[i] & 0x0F)] += 1;
                }
                self.color_counts = counts;
            }
            _ => {}
        }
    }

    pub fn bumper_pressed(&self, side: BumperSide) -> bool {
        match side {
            BumperSide::Left => self.bumper_left,
            BumperSide::Right => self.bumper_right,
            BumperSide::Either => self.bumper_left || self.bumper_right,
        }
    }

    pub fn touch_pressed(&self, zone: TouchZone) -> bool {
        match zone {
            TouchZone::FrontLeft => self.touch_front_left,
            TouchZone::FrontRight => self.touch_front_right,
            TouchZone::RearLeft => self.touch_rear_left,
            TouchZone::RearRight => self.touch_rear_right,
            TouchZone::Any => {
                self.touch_front_left
                    || self.touch_front_right
                    || self.touch_rear_left
                    || self.touch_rear_right
            }
        }
    }

    /// Whether any slot currently reports `color`.
    pub fn color_detected(&self, color: Color) -> bool {
        self.color_count(color) > 0
    }

    /// How many of the 32 slots currently report `color`.
    pub fn color_count(&self, color: Color) -> u8 {
        let index: u8 = color.into();
        self.color_counts[usize::from(index & 0x0F)]
    }

    /// Raw per-slot color indices from the latest scan.
    pub fn colors(&self) -> &[u8; COLOR_SLOTS] {
        &self.colors
    }

    /// Per-color-index counts over the 32 slots.
    pub fn color_histogram(&self) -> &[u8; COLOR_BINS] {
        &self.color_counts
    }
}

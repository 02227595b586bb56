//! Rotary dial input: raw evdev triples and their meaning
//!
//! A Surface Dial reports its button as `EV_KEY`/`BTN_0` and rotation as
//! `EV_REL`/`REL_DIAL`. Everything else it emits (sync reports, autorepeat,
//! haptics acknowledgements) decodes to [`InputEvent::Other`].

#[cfg(target_os = "linux")]
mod dial;

#[cfg(target_os = "linux")]
pub use dial::DialDevice;

use async_trait::async_trait;
use serde::Deserialize;

const EV_KEY: u16 = 1;
const EV_REL: u16 = 2;
const BTN_0: u16 = 256;
const REL_DIAL: u16 = 7;

/// Raw `(type, code, value)` triple as read from the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }
}

/// Which rotation values count as a detent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RotationMatch {
    /// Any positive value is clockwise, any negative value counter-clockwise
    #[default]
    #[serde(rename = "any")]
    AnySign,
    /// Only exactly `1` / `-1`; larger jumps are ignored
    #[serde(rename = "unit")]
    UnitStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ButtonPress,
    ButtonRelease,
    RotateClockwise,
    RotateCounterClockwise,
    Other,
}

impl InputEvent {
    pub fn decode(raw: RawEvent, rotation: RotationMatch) -> Self {
        match (raw.event_type, raw.code) {
            (EV_KEY, BTN_0) => match raw.value {
                1 => InputEvent::ButtonPress,
                0 => InputEvent::ButtonRelease,
                _ => InputEvent::Other,
            },
            (EV_REL, REL_DIAL) => match (rotation, raw.value) {
                (RotationMatch::AnySign, v) if v > 0 => InputEvent::RotateClockwise,
                (RotationMatch::AnySign, v) if v < 0 => InputEvent::RotateCounterClockwise,
                (RotationMatch::UnitStep, 1) => InputEvent::RotateClockwise,
                (RotationMatch::UnitStep, -1) => InputEvent::RotateCounterClockwise,
                _ => InputEvent::Other,
            },
            _ => InputEvent::Other,
        }
    }
}

/// Serialized stream of raw input events
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next event. An error means the device is gone.
    async fn next_event(&mut self) -> std::io::Result<RawEvent>;
}

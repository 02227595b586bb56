//! Dial Volume Bridge
//!
//! Turns a rotary dial (Surface Dial or any evdev device reporting `BTN_0` and
//! `REL_DIAL`) into a volume knob for a BluOS player.
//!
//! This library provides:
//! - Input decoding and an async evdev event source
//! - The press-and-rotate volume controller
//! - A BluOS volume adapter with ceiling and dead-time policy
//! - Layered configuration (defaults, config file, `DIAL_*` env vars)

pub mod adapters;
pub mod config;
pub mod controller;
pub mod input;

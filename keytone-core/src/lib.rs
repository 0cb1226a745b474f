//! Shared keypad, tone and dispatch logic for the keytone firmware.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI tool, which runs the very same controller
//! against a simulated board.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod macros;

pub mod controller;
pub mod hal;
pub mod keymap;
pub mod leds;
pub mod melody;
pub mod pins;
pub mod scanner;
pub mod tone;

#[cfg(test)]
mod testutil;

/// Number of rows in the keypad matrix.
pub const ROWS: usize = 4;
/// Number of columns in the keypad matrix.
pub const COLS: usize = 4;

pub use controller::{action_for, Action, BuzzerAction, Controller};
pub use hal::{Buzzer, Delay, Gpio};
pub use keymap::{Keymap, KEYPAD};
pub use leds::{LedPins, LedState};
pub use melody::{Note, IMPERIAL_MARCH};
pub use pins::{PinAssignment, Wiring};
pub use scanner::{KeypadScanner, ScanState, Step};
pub use tone::{pwm_period, PwmPeriod, ToneError, ToneGenerator};

//! Hardware seams.
//!
//! The scanner, tone generator and controller only ever talk to the board
//! through these traits. The firmware implements them on top of the
//! ATmega32U4 registers; the CLI simulator and the unit tests implement
//! them in memory.

use crate::tone::PwmPeriod;

/// Digital I/O by pin identifier.
pub trait Gpio {
    type Pin: Copy;

    /// Configure a pin as a push-pull output.
    fn set_output(&mut self, pin: Self::Pin);

    /// Configure a pin as an input with the internal pull-up enabled.
    fn set_input_pullup(&mut self, pin: Self::Pin);

    /// Drive an output pin high (`true`) or low (`false`).
    fn write(&mut self, pin: Self::Pin, high: bool);

    /// Sample the current level of a pin.
    fn is_high(&mut self, pin: Self::Pin) -> bool;
}

/// Blocking millisecond delay.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// A PWM channel wired to a piezo buzzer.
pub trait Buzzer {
    /// Current timer input clock in Hz. Read on every call since the
    /// system clock prescaler may change at runtime.
    fn clock_hz(&self) -> u32;

    /// Program counter top and compare value. Does not touch the enable state.
    fn set_period(&mut self, period: PwmPeriod);

    /// Start or stop the output without reprogramming the period.
    fn set_enabled(&mut self, enabled: bool);
}

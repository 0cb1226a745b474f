//! Teensy 2.0 wiring.
//!
//!   Keypad columns (outputs, idle high): PB0, PB1, PB2, PB3
//!   Keypad rows (inputs w/ pull-up):     PF0, PF1, PF4, PF5
//!   LEDs:                                PD4 red, PD5 blue, PD7 green
//!   Buzzer:                              PB5 (OC1A, see `pwm`)

use keytone_core::{LedPins, PinAssignment, Wiring};

use crate::gpio::{Pin, Port};

pub const WIRING: Wiring<Pin> = Wiring {
    keypad: PinAssignment {
        columns: [
            Pin::new(Port::B, 0),
            Pin::new(Port::B, 1),
            Pin::new(Port::B, 2),
            Pin::new(Port::B, 3),
        ],
        rows: [
            Pin::new(Port::F, 0),
            Pin::new(Port::F, 1),
            Pin::new(Port::F, 4),
            Pin::new(Port::F, 5),
        ],
    },
    leds: LedPins {
        red: Pin::new(Port::D, 4),
        blue: Pin::new(Port::D, 5),
        green: Pin::new(Port::D, 7),
    },
};

/// Teensy on-board LED.
pub const STATUS_LED: Pin = Pin::new(Port::D, 6);

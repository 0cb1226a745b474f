//! Board wiring tables.

use crate::hal::Gpio;
use crate::leds::LedPins;
use crate::{COLS, ROWS};

/// Keypad pin assignment.
///
/// Column pins are driven (idle high, active low); row pins are read with
/// pull-ups enabled (idle high, low while a key in the driven column is
/// held).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinAssignment<P> {
    pub columns: [P; COLS],
    pub rows: [P; ROWS],
}

impl<P: Copy> PinAssignment<P> {
    /// Columns as outputs parked high, rows as pulled-up inputs.
    pub fn configure<G: Gpio<Pin = P>>(&self, gpio: &mut G) {
        for &column in &self.columns {
            gpio.set_output(column);
            gpio.write(column, true);
        }
        for &row in &self.rows {
            gpio.set_input_pullup(row);
        }
    }
}

/// Everything the controller needs to know about where things are connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wiring<P> {
    pub keypad: PinAssignment<P>,
    pub leds: LedPins<P>,
}

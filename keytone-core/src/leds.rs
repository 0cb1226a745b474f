//! The three indicator LEDs.

use crate::hal::Gpio;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedPins<P> {
    pub red: P,
    pub blue: P,
    pub green: P,
}

/// A complete LED pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedState {
    pub red: bool,
    pub blue: bool,
    pub green: bool,
}

impl LedState {
    pub const OFF: Self = Self::new(false, false, false);
    pub const RED: Self = Self::new(true, false, false);
    pub const BLUE: Self = Self::new(false, true, false);
    pub const GREEN: Self = Self::new(false, false, true);
    pub const ALL: Self = Self::new(true, true, true);

    pub const fn new(red: bool, blue: bool, green: bool) -> Self {
        Self { red, blue, green }
    }
}

impl<P: Copy> LedPins<P> {
    /// Configure all three pins as outputs and switch them off.
    pub fn init<G: Gpio<Pin = P>>(&self, gpio: &mut G) {
        for pin in [self.red, self.blue, self.green] {
            gpio.set_output(pin);
        }
        self.set_leds(gpio, false, false, false);
    }

    pub fn set_leds<G: Gpio<Pin = P>>(&self, gpio: &mut G, red: bool, blue: bool, green: bool) {
        gpio.write(self.red, red);
        gpio.write(self.blue, blue);
        gpio.write(self.green, green);
    }

    pub fn apply<G: Gpio<Pin = P>>(&self, gpio: &mut G, state: LedState) {
        self.set_leds(gpio, state.red, state.blue, state.green);
    }
}

//! Millisecond busy-wait delays.

use avr_device::atmega32u4::Peripherals;
use keytone_core::Delay;

use crate::clock;

/// Busy-wait delay calibrated against the current system clock.
pub struct BusyDelay<'a> {
    dp: &'a Peripherals,
}

impl<'a> BusyDelay<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }
}

impl Delay for BusyDelay<'_> {
    fn delay_ms(&mut self, ms: u32) {
        // ~4 cycles per loop iteration: 4000 iterations per ms at 16MHz
        let loops = (clock::system_clock_hz(self.dp) / 4000) as u16;
        for _ in 0..ms {
            for _ in 0..loops {
                unsafe { core::arch::asm!("nop") };
            }
        }
    }
}

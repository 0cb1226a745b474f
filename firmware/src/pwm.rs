//! Piezo buzzer on Timer/Counter1.
//!
//! Fast PWM mode 14: the counter runs 0..=ICR1 at the undivided system
//! clock and OC1A (PB5) is set at BOTTOM, cleared on compare match with
//! OCR1A. Output frequency is `F_sys / (ICR1 + 1)`, so the `wrap` from
//! `keytone_core::pwm_period` goes straight into ICR1.

use avr_device::atmega32u4::Peripherals;
use keytone_core::{Buzzer, PwmPeriod};

use crate::clock;

// TCCR1A
const COM1A1: u8 = 1 << 7;
const WGM11: u8 = 1 << 1;
// TCCR1B
const WGM13: u8 = 1 << 4;
const WGM12: u8 = 1 << 3;
const CS10: u8 = 1 << 0;

/// PB5 / OC1A
const BUZZER_MASK: u8 = 1 << 5;

pub struct Timer1Buzzer<'a> {
    dp: &'a Peripherals,
}

impl<'a> Timer1Buzzer<'a> {
    /// Set up mode 14 with the clock stopped and the pin driven low.
    pub fn new(dp: &'a Peripherals) -> Self {
        dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | BUZZER_MASK) });
        dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() & !BUZZER_MASK) });

        let tc1 = &dp.TC1;
        tc1.tccr1a.write(|w| unsafe { w.bits(WGM11) });
        tc1.tccr1b.write(|w| unsafe { w.bits(WGM13 | WGM12) });

        Self { dp }
    }
}

impl Buzzer for Timer1Buzzer<'_> {
    fn clock_hz(&self) -> u32 {
        // Timer1 runs without its own prescaler
        clock::system_clock_hz(self.dp)
    }

    fn set_period(&mut self, period: PwmPeriod) {
        let tc1 = &self.dp.TC1;
        tc1.icr1.write(|w| unsafe { w.bits(period.wrap) });
        tc1.ocr1a.write(|w| unsafe { w.bits(period.duty) });
        // A counter already past the new TOP would run on to 0xFFFF first
        tc1.tcnt1.write(|w| unsafe { w.bits(0) });
    }

    fn set_enabled(&mut self, enabled: bool) {
        let tc1 = &self.dp.TC1;
        if enabled {
            tc1.tccr1a.write(|w| unsafe { w.bits(COM1A1 | WGM11) });
            tc1.tccr1b.write(|w| unsafe { w.bits(WGM13 | WGM12 | CS10) });
        } else {
            tc1.tccr1b.write(|w| unsafe { w.bits(WGM13 | WGM12) });
            tc1.tccr1a.write(|w| unsafe { w.bits(WGM11) });
            // Disconnected from OC1A, the pin falls back to PORTB5
            self.dp
                .PORTB
                .portb
                .modify(|r, w| unsafe { w.bits(r.bits() & !BUZZER_MASK) });
        }
    }
}

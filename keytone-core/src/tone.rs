//! Square-wave tone generation on a PWM channel.
//!
//! The counter runs from 0 to `wrap` and restarts, so one PWM period lasts
//! `wrap + 1` timer clocks:
//!
//! ```text
//! wrap = clock_hz / frequency_hz - 1
//! duty = wrap / 2                      (50%)
//! ```

use core::fmt;

use crate::hal::{Buzzer, Delay};
use crate::melody::{Note, NOTE_GAP_MS};

/// Counter top and compare values for one tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmPeriod {
    pub wrap: u16,
    pub duty: u16,
}

impl PwmPeriod {
    /// Frequency actually produced at `clock_hz` (integer division loses a
    /// fraction of a Hz against the requested pitch).
    pub fn frequency_hz(&self, clock_hz: u32) -> u32 {
        clock_hz / (self.wrap as u32 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneError {
    /// Frequency zero, nothing to program.
    Rest,
    /// Fewer than two clocks per period.
    TooHigh,
    /// Period does not fit the 16-bit counter.
    TooLow,
}

impl fmt::Display for ToneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneError::Rest => write!(f, "rest"),
            ToneError::TooHigh => write!(f, "frequency too high for timer clock"),
            ToneError::TooLow => write!(f, "frequency too low for 16-bit counter"),
        }
    }
}

/// Compute the PWM period for `frequency_hz` at a timer clock of `clock_hz`.
pub fn pwm_period(clock_hz: u32, frequency_hz: u32) -> Result<PwmPeriod, ToneError> {
    if frequency_hz == 0 {
        return Err(ToneError::Rest);
    }

    let ticks = clock_hz / frequency_hz;
    if ticks < 2 {
        return Err(ToneError::TooHigh);
    }

    let wrap = u16::try_from(ticks - 1).map_err(|_| ToneError::TooLow)?;
    Ok(PwmPeriod {
        wrap,
        duty: wrap / 2,
    })
}

/// Drives a [`Buzzer`] with tones and melodies.
pub struct ToneGenerator<B> {
    buzzer: B,
}

impl<B: Buzzer> ToneGenerator<B> {
    pub fn new(buzzer: B) -> Self {
        Self { buzzer }
    }

    /// Program the PWM for `frequency_hz` without changing whether it runs.
    pub fn configure(&mut self, frequency_hz: u32) -> Result<PwmPeriod, ToneError> {
        let clock_hz = self.buzzer.clock_hz();
        let period = pwm_period(clock_hz, frequency_hz)?;
        trace!(
            "{} Hz at {} Hz clock: wrap {} duty {}",
            frequency_hz,
            clock_hz,
            period.wrap,
            period.duty
        );
        self.buzzer.set_period(period);
        Ok(period)
    }

    /// Start or stop the buzzer at whatever period is currently programmed.
    pub fn set_buzzer(&mut self, enabled: bool) {
        self.buzzer.set_enabled(enabled);
    }

    /// Sound `frequency_hz` for `duration_ms`, then silence the buzzer.
    ///
    /// A rest, or a pitch the timer cannot produce, only waits out the
    /// duration and leaves the enable state untouched.
    pub fn play<D: Delay>(&mut self, delay: &mut D, frequency_hz: u32, duration_ms: u32) {
        match self.configure(frequency_hz) {
            Ok(_) => {
                self.buzzer.set_enabled(true);
                delay.delay_ms(duration_ms);
                self.buzzer.set_enabled(false);
            }
            Err(ToneError::Rest) => delay.delay_ms(duration_ms),
            Err(e) => {
                warn!("skipping {} Hz: {}", frequency_hz, e);
                delay.delay_ms(duration_ms);
            }
        }
    }

    /// Play each note in order, with [`NOTE_GAP_MS`] of silence after every one.
    pub fn play_melody<D: Delay>(&mut self, delay: &mut D, melody: &[Note]) {
        debug!("playing {} notes", melody.len());
        for note in melody {
            self.play(delay, note.frequency_hz.into(), note.duration_ms.into());
            delay.delay_ms(NOTE_GAP_MS);
        }
    }

    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }

    pub fn buzzer_mut(&mut self) -> &mut B {
        &mut self.buzzer
    }
}

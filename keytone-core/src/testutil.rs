//! Recording mock hardware for unit tests.
//!
//! All mocks share one event log so tests can assert on the exact
//! interleaving of GPIO writes, PWM programming and delays.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use crate::hal::{Buzzer, Delay, Gpio};
use crate::keymap::KEYPAD;
use crate::leds::LedPins;
use crate::pins::{PinAssignment, Wiring};
use crate::tone::PwmPeriod;
use crate::ROWS;

/// Pico-style pin numbers for the bench wiring.
pub const WIRING: Wiring<u8> = Wiring {
    keypad: PinAssignment {
        columns: [4, 3, 2, 1],
        rows: [5, 6, 7, 8],
    },
    leds: LedPins {
        red: 13,
        blue: 12,
        green: 11,
    },
};

pub const CLOCK_HZ: u32 = 16_000_000;

const PINS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Write { pin: u8, high: bool },
    Delay(u32),
    Period(PwmPeriod),
    Enabled(bool),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Logged events without the GPIO writes.
pub fn timeline(log: &Log) -> Vec<Event> {
    log.borrow()
        .iter()
        .copied()
        .filter(|e| !matches!(e, Event::Write { .. }))
        .collect()
}

struct Short {
    row: u8,
    column: u8,
    remaining_low: usize,
}

pub struct MockGpio {
    log: Log,
    levels: [bool; PINS],
    outputs: [bool; PINS],
    pullups: [bool; PINS],
    shorts: Vec<Short>,
}

impl MockGpio {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            levels: [false; PINS],
            outputs: [false; PINS],
            pullups: [false; PINS],
            shorts: Vec::new(),
        }
    }

    /// Short electrical row `row` to column `col` (indices into `WIRING`).
    ///
    /// The first low reading detects the key, the next `held_polls` readings
    /// still see it down, then it is released.
    pub fn press(&mut self, row: usize, col: usize, held_polls: usize) {
        self.shorts.push(Short {
            row: WIRING.keypad.rows[row],
            column: WIRING.keypad.columns[col],
            remaining_low: held_polls.saturating_add(1),
        });
    }

    /// Press a key by its legend character.
    pub fn press_key(&mut self, key: char, held_polls: usize) {
        let (legend_row, col) = KEYPAD.position(key).expect("key not on keypad");
        self.press(ROWS - 1 - legend_row, col, held_polls);
    }

    pub fn level(&self, pin: u8) -> bool {
        self.levels[pin as usize]
    }

    pub fn is_output(&self, pin: u8) -> bool {
        self.outputs[pin as usize]
    }

    pub fn is_pulled_up(&self, pin: u8) -> bool {
        self.pullups[pin as usize]
    }

    /// Number of keypad columns currently driven low.
    pub fn columns_low(&self) -> usize {
        WIRING
            .keypad
            .columns
            .iter()
            .filter(|&&c| self.outputs[c as usize] && !self.levels[c as usize])
            .count()
    }
}

impl Gpio for MockGpio {
    type Pin = u8;

    fn set_output(&mut self, pin: u8) {
        self.outputs[pin as usize] = true;
        self.pullups[pin as usize] = false;
    }

    fn set_input_pullup(&mut self, pin: u8) {
        self.outputs[pin as usize] = false;
        self.pullups[pin as usize] = true;
    }

    fn write(&mut self, pin: u8, high: bool) {
        self.levels[pin as usize] = high;
        self.log.borrow_mut().push(Event::Write { pin, high });
        assert!(self.columns_low() <= 1, "more than one column driven low");
    }

    fn is_high(&mut self, pin: u8) -> bool {
        let p = pin as usize;
        if self.outputs[p] {
            return self.levels[p];
        }
        for short in self.shorts.iter_mut() {
            let c = short.column as usize;
            if short.row == pin && short.remaining_low > 0 && self.outputs[c] && !self.levels[c] {
                short.remaining_low -= 1;
                return false;
            }
        }
        self.pullups[p]
    }
}

pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::Delay(ms));
    }
}

pub struct MockBuzzer {
    log: Log,
    pub clock_hz: u32,
    pub enabled: bool,
    /// Last period programmed.
    pub period: Option<PwmPeriod>,
}

impl MockBuzzer {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            clock_hz: CLOCK_HZ,
            enabled: false,
            period: None,
        }
    }
}

impl Buzzer for MockBuzzer {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn set_period(&mut self, period: PwmPeriod) {
        self.period = Some(period);
        self.log.borrow_mut().push(Event::Period(period));
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.log.borrow_mut().push(Event::Enabled(enabled));
    }
}

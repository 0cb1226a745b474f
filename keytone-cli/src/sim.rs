//! Run the firmware controller against a simulated board.
//!
//! Time is virtual: delays advance a shared millisecond counter instead of
//! sleeping (unless running in real time), and every LED or buzzer change
//! is logged with its timestamp.

use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use keytone_core::{
    Buzzer, Controller, Delay, Gpio, LedPins, LedState, PinAssignment, PwmPeriod, Wiring,
    KEYPAD, ROWS,
};
use log::{info, trace, warn};

/// Pin numbers on the simulated board.
pub const WIRING: Wiring<u8> = Wiring {
    keypad: PinAssignment {
        columns: [0, 1, 2, 3],
        rows: [4, 5, 6, 7],
    },
    leds: LedPins {
        red: 8,
        blue: 9,
        green: 10,
    },
};

const PIN_COUNT: usize = 11;

/// Release polls a simulated key press stays down for.
pub const HOLD_POLLS: usize = 3;

/// Same crystal as the Teensy 2.0.
pub const CLOCK_HZ: u32 = 16_000_000;

/// Milliseconds since the simulation started.
#[derive(Clone, Default)]
pub struct VirtualClock(Rc<Cell<u64>>);

impl VirtualClock {
    pub fn now_ms(&self) -> u64 {
        self.0.get()
    }

    fn advance(&self, ms: u32) {
        self.0.set(self.0.get() + ms as u64);
    }
}

struct Press {
    row: usize,
    column: usize,
    remaining_low: usize,
}

pub struct SimGpio {
    clock: VirtualClock,
    levels: [bool; PIN_COUNT],
    press: Option<Press>,
}

impl SimGpio {
    fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            levels: [false; PIN_COUNT],
            press: None,
        }
    }

    /// Hold `key` for one detection plus [`HOLD_POLLS`] release polls.
    /// Returns false if the key is not on the keypad.
    pub fn press(&mut self, key: char) -> bool {
        let Some((legend_row, column)) = KEYPAD.position(key) else {
            return false;
        };
        self.press = Some(Press {
            row: ROWS - 1 - legend_row,
            column,
            remaining_low: HOLD_POLLS + 1,
        });
        true
    }

    pub fn leds(&self) -> LedState {
        let leds = WIRING.leds;
        LedState::new(
            self.levels[leds.red as usize],
            self.levels[leds.blue as usize],
            self.levels[leds.green as usize],
        )
    }

    fn led_name(pin: u8) -> Option<&'static str> {
        let leds = WIRING.leds;
        match pin {
            p if p == leds.red => Some("red"),
            p if p == leds.blue => Some("blue"),
            p if p == leds.green => Some("green"),
            _ => None,
        }
    }
}

impl Gpio for SimGpio {
    type Pin = u8;

    fn set_output(&mut self, pin: u8) {
        trace!("pin {} output", pin);
    }

    fn set_input_pullup(&mut self, pin: u8) {
        trace!("pin {} input pull-up", pin);
    }

    fn write(&mut self, pin: u8, high: bool) {
        let level = &mut self.levels[pin as usize];
        if *level == high {
            return;
        }
        *level = high;
        if let Some(name) = Self::led_name(pin) {
            info!(
                "[{:>6} ms] {} LED {}",
                self.clock.now_ms(),
                name,
                if high { "on" } else { "off" }
            );
        }
    }

    fn is_high(&mut self, pin: u8) -> bool {
        let Some(row) = WIRING.keypad.rows.iter().position(|&r| r == pin) else {
            return self.levels[pin as usize];
        };
        let Some(press) = self.press.as_mut() else {
            return true;
        };
        let column_low = !self.levels[WIRING.keypad.columns[press.column] as usize];
        if press.row == row && column_low && press.remaining_low > 0 {
            press.remaining_low -= 1;
            if press.remaining_low == 0 {
                self.press = None;
            }
            return false;
        }
        true
    }
}

pub struct SimBuzzer {
    clock: VirtualClock,
    clock_hz: u32,
    period: Option<PwmPeriod>,
    enabled: bool,
}

impl SimBuzzer {
    fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            clock_hz: CLOCK_HZ,
            period: None,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Buzzer for SimBuzzer {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn set_period(&mut self, period: PwmPeriod) {
        self.period = Some(period);
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        let now = self.clock.now_ms();
        match (enabled, self.period) {
            (true, Some(period)) => info!(
                "[{:>6} ms] buzzer on, {} Hz (wrap {})",
                now,
                period.frequency_hz(self.clock_hz),
                period.wrap
            ),
            (true, None) => warn!("[{:>6} ms] buzzer on with no period programmed", now),
            (false, _) => info!("[{:>6} ms] buzzer off", now),
        }
    }
}

pub struct SimDelay {
    clock: VirtualClock,
    realtime: bool,
}

impl Delay for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(ms);
        if self.realtime {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

pub struct Simulator {
    controller: Controller<SimGpio, SimBuzzer, SimDelay>,
    clock: VirtualClock,
}

impl Simulator {
    pub fn new(realtime: bool) -> Self {
        let clock = VirtualClock::default();
        let mut controller = Controller::new(
            SimGpio::new(clock.clone()),
            SimBuzzer::new(clock.clone()),
            SimDelay {
                clock: clock.clone(),
                realtime,
            },
            WIRING,
            &KEYPAD,
        );
        controller.init();
        Self { controller, clock }
    }

    /// Run one loop iteration with `key` held. `.` scans with no key held.
    pub fn feed(&mut self, key: char) -> Option<char> {
        if key != '.' && !self.controller.gpio_mut().press(key) {
            warn!("'{}' is not on the keypad, scanning with no key held", key);
        }
        let handled = self.controller.run_once();
        if let Some(k) = handled {
            info!("[{:>6} ms] handled key '{}'", self.clock.now_ms(), k);
        }
        handled
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn leds(&self) -> LedState {
        self.controller.gpio().leds()
    }

    pub fn buzzer_enabled(&self) -> bool {
        self.controller.tone().buzzer().is_enabled()
    }
}

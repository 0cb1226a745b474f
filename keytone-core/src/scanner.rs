//! Keypad matrix scanning.
//!
//! Columns are driven low one at a time while the pulled-up rows are
//! sampled; a row reading low means the key at that row/column is held.
//! Only one column is ever low at a time, so keys in other columns cannot
//! bleed into the reading.
//!
//! A detected key is not reported until it is physically released. That
//! wait is modelled as an explicit state machine:
//!
//! ```text
//! Idle --(row low)--> Pressed --(row low)--> WaitingRelease --(row high)--> Idle
//!                        \----------------(row high)------------------------/
//! ```
//!
//! [`KeypadScanner::step`] advances it by one transition, which is what
//! tests drive. [`KeypadScanner::scan`] blocks on `step` until a full pass
//! comes up empty or the key is released. There is no timeout: a key that
//! never comes up keeps `scan` spinning forever.

use crate::hal::{Delay, Gpio};
use crate::keymap::Keymap;
use crate::pins::PinAssignment;
use crate::{COLS, ROWS};

/// Poll interval while waiting for a held key to be released.
pub const RELEASE_POLL_MS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// Key just detected, its column is still driven low.
    Pressed { key: char, row: usize, column: usize },
    /// Key seen down on at least one release poll.
    WaitingRelease { key: char, row: usize, column: usize },
}

/// Outcome of a single [`KeypadScanner::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A full pass over the matrix found nothing.
    NoKey,
    Pressed(char),
    Held(char),
    Released(char),
}

pub struct KeypadScanner<P> {
    pins: PinAssignment<P>,
    keymap: &'static Keymap,
    state: ScanState,
    last_key: Option<char>,
}

impl<P: Copy> KeypadScanner<P> {
    pub fn new(pins: PinAssignment<P>, keymap: &'static Keymap) -> Self {
        Self {
            pins,
            keymap,
            state: ScanState::Idle,
            last_key: None,
        }
    }

    pub fn init<G: Gpio<Pin = P>>(&self, gpio: &mut G) {
        self.pins.configure(gpio);
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Most recently reported key. Informational only: it never suppresses
    /// a fresh report of the same key.
    pub fn last_key(&self) -> Option<char> {
        self.last_key
    }

    /// Advance the state machine by one transition.
    pub fn step<G: Gpio<Pin = P>>(&mut self, gpio: &mut G) -> Step {
        match self.state {
            ScanState::Idle => match self.find_press(gpio) {
                Some((key, row, column)) => {
                    trace!("key {:?} down at row {} column {}", key, row, column);
                    self.state = ScanState::Pressed { key, row, column };
                    Step::Pressed(key)
                }
                None => Step::NoKey,
            },
            ScanState::Pressed { key, row, column }
            | ScanState::WaitingRelease { key, row, column } => {
                if gpio.is_high(self.pins.rows[row]) {
                    gpio.write(self.pins.columns[column], true);
                    self.state = ScanState::Idle;
                    self.last_key = Some(key);
                    debug!("key {:?} released", key);
                    Step::Released(key)
                } else {
                    self.state = ScanState::WaitingRelease { key, row, column };
                    Step::Held(key)
                }
            }
        }
    }

    /// One full scan. Returns once no key is found or the detected key has
    /// been released.
    pub fn scan<G, D>(&mut self, gpio: &mut G, delay: &mut D) -> Option<char>
    where
        G: Gpio<Pin = P>,
        D: Delay,
    {
        loop {
            match self.step(gpio) {
                Step::NoKey => return None,
                Step::Released(key) => return Some(key),
                Step::Pressed(_) => {}
                Step::Held(_) => delay.delay_ms(RELEASE_POLL_MS),
            }
        }
    }

    /// Column-major pass, first hit wins. On a hit the column is left
    /// driven low so the release can be watched on the same row.
    fn find_press<G: Gpio<Pin = P>>(&self, gpio: &mut G) -> Option<(char, usize, usize)> {
        for column in 0..COLS {
            gpio.write(self.pins.columns[column], false);

            for row in 0..ROWS {
                if !gpio.is_high(self.pins.rows[row]) {
                    // Row wiring runs bottom-up relative to the legend
                    let key = self.keymap.key(ROWS - 1 - row, column);
                    return Some((key, row, column));
                }
            }

            gpio.write(self.pins.columns[column], true);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::KEYPAD;
    use crate::testutil::{self, Event, MockDelay, MockGpio, WIRING};

    fn setup() -> (KeypadScanner<u8>, MockGpio, MockDelay, testutil::Log) {
        let log = testutil::log();
        let mut gpio = MockGpio::new(log.clone());
        let scanner = KeypadScanner::new(WIRING.keypad, &KEYPAD);
        scanner.init(&mut gpio);
        log.borrow_mut().clear();
        (scanner, gpio, MockDelay::new(log.clone()), log)
    }

    #[test]
    fn test_init_configures_pins() {
        let (_, gpio, _, _) = setup();
        for &c in &WIRING.keypad.columns {
            assert!(gpio.is_output(c));
            assert!(gpio.level(c));
        }
        for &r in &WIRING.keypad.rows {
            assert!(!gpio.is_output(r));
            assert!(gpio.is_pulled_up(r));
        }
    }

    #[test]
    fn test_every_position_maps_to_keymap() {
        for row in 0..ROWS {
            for col in 0..COLS {
                let (mut scanner, mut gpio, mut delay, _) = setup();
                gpio.press(row, col, 0);
                assert_eq!(
                    scanner.scan(&mut gpio, &mut delay),
                    Some(KEYPAD.key(3 - row, col)),
                    "row {} col {}",
                    row,
                    col
                );
                assert_eq!(gpio.columns_low(), 0);
            }
        }
    }

    #[test]
    fn test_physical_corners() {
        let (mut scanner, mut gpio, mut delay, _) = setup();
        gpio.press(3, 0, 0);
        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some('1'));

        gpio.press(0, 3, 0);
        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some('D'));
    }

    #[test]
    fn test_no_key_returns_none() {
        let (mut scanner, mut gpio, mut delay, log) = setup();
        assert_eq!(scanner.scan(&mut gpio, &mut delay), None);
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(gpio.columns_low(), 0);
        // Every column was visited and restored, no delays
        assert!(testutil::timeline(&log).is_empty());
        assert_eq!(log.borrow().len(), 2 * COLS);
    }

    #[test]
    fn test_columns_driven_one_at_a_time_in_order() {
        let (mut scanner, mut gpio, mut delay, log) = setup();
        scanner.scan(&mut gpio, &mut delay);

        let writes: Vec<Event> = log.borrow().clone();
        let mut expected = Vec::new();
        for &c in &WIRING.keypad.columns {
            expected.push(Event::Write { pin: c, high: false });
            expected.push(Event::Write { pin: c, high: true });
        }
        assert_eq!(writes, expected);
    }

    #[test]
    fn test_waits_for_release() {
        let (mut scanner, mut gpio, mut delay, log) = setup();
        gpio.press_key('5', 3);

        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some('5'));
        assert_eq!(
            testutil::timeline(&log),
            vec![Event::Delay(RELEASE_POLL_MS); 3]
        );
    }

    #[test]
    fn test_first_column_wins() {
        let (mut scanner, mut gpio, mut delay, _) = setup();
        gpio.press(0, 3, 0);
        gpio.press(2, 1, 0);

        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some(KEYPAD.key(1, 1)));
    }

    #[test]
    fn test_first_row_wins_within_column() {
        let (mut scanner, mut gpio, mut delay, _) = setup();
        gpio.press(3, 0, 0);
        gpio.press(1, 0, 0);

        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some('7'));
    }

    #[test]
    fn test_state_transitions() {
        let (mut scanner, mut gpio, _, _) = setup();
        gpio.press_key('#', 1);

        assert_eq!(scanner.step(&mut gpio), Step::Pressed('#'));
        assert_eq!(
            scanner.state(),
            ScanState::Pressed {
                key: '#',
                row: 0,
                column: 2
            }
        );
        assert_eq!(gpio.columns_low(), 1);
        assert!(!gpio.level(WIRING.keypad.columns[2]));

        assert_eq!(scanner.step(&mut gpio), Step::Held('#'));
        assert!(matches!(
            scanner.state(),
            ScanState::WaitingRelease { key: '#', .. }
        ));
        assert_eq!(scanner.last_key(), None);

        assert_eq!(scanner.step(&mut gpio), Step::Released('#'));
        assert_eq!(scanner.state(), ScanState::Idle);
        assert_eq!(scanner.last_key(), Some('#'));
        assert_eq!(gpio.columns_low(), 0);
    }

    #[test]
    fn test_stuck_key_never_releases() {
        let (mut scanner, mut gpio, _, _) = setup();
        gpio.press_key('0', usize::MAX);

        assert_eq!(scanner.step(&mut gpio), Step::Pressed('0'));
        for _ in 0..1000 {
            assert_eq!(scanner.step(&mut gpio), Step::Held('0'));
        }
        assert_eq!(gpio.columns_low(), 1);
    }

    #[test]
    fn test_same_key_reported_again() {
        let (mut scanner, mut gpio, mut delay, _) = setup();
        gpio.press_key('A', 0);
        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some('A'));

        gpio.press_key('A', 0);
        assert_eq!(scanner.scan(&mut gpio, &mut delay), Some('A'));
        assert_eq!(scanner.last_key(), Some('A'));
    }
}

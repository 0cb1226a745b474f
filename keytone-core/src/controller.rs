//! Main loop: scan, dispatch, wait.
//!
//! | key        | LEDs (R,B,G) | buzzer                          |
//! |------------|--------------|---------------------------------|
//! | `1`        | red          | 1 s at the 350 Hz init tone     |
//! | `A`        | red          | -                               |
//! | `B`        | green        | -                               |
//! | `C`        | blue         | -                               |
//! | `D`        | all          | -                               |
//! | `#`        | -            | Imperial March                  |
//! | none/other | off          | -                               |

use crate::hal::{Buzzer, Delay, Gpio};
use crate::keymap::Keymap;
use crate::leds::{LedPins, LedState};
use crate::melody::IMPERIAL_MARCH;
use crate::pins::Wiring;
use crate::scanner::KeypadScanner;
use crate::tone::ToneGenerator;

/// Tone the PWM is programmed with at start-up, used by the `1` key.
pub const INIT_FREQUENCY_HZ: u32 = 350;
/// How long the `1` key sounds the buzzer.
pub const BEEP_MS: u32 = 1000;
/// Extra settle time inside the LED and melody actions.
pub const ACTION_HOLD_MS: u32 = 200;
/// Delay after every loop iteration.
pub const LOOP_DELAY_MS: u32 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuzzerAction {
    Unchanged,
    /// Enable at the currently programmed period, wait, disable.
    Beep { duration_ms: u32 },
    Melody,
}

/// What a scan result turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    /// `None` leaves the LEDs as they are.
    pub leds: Option<LedState>,
    pub buzzer: BuzzerAction,
    pub hold_ms: u32,
}

impl Action {
    const fn leds(state: LedState) -> Self {
        Self {
            leds: Some(state),
            buzzer: BuzzerAction::Unchanged,
            hold_ms: ACTION_HOLD_MS,
        }
    }
}

pub fn action_for(key: Option<char>) -> Action {
    match key {
        Some('1') => Action {
            leds: Some(LedState::RED),
            buzzer: BuzzerAction::Beep {
                duration_ms: BEEP_MS,
            },
            hold_ms: 0,
        },
        Some('A') => Action::leds(LedState::RED),
        Some('B') => Action::leds(LedState::GREEN),
        Some('C') => Action::leds(LedState::BLUE),
        Some('D') => Action::leds(LedState::ALL),
        Some('#') => Action {
            leds: None,
            buzzer: BuzzerAction::Melody,
            hold_ms: ACTION_HOLD_MS,
        },
        _ => Action {
            leds: Some(LedState::OFF),
            buzzer: BuzzerAction::Unchanged,
            hold_ms: 0,
        },
    }
}

pub struct Controller<G: Gpio, B, D> {
    gpio: G,
    delay: D,
    scanner: KeypadScanner<G::Pin>,
    leds: LedPins<G::Pin>,
    tone: ToneGenerator<B>,
}

impl<G, B, D> Controller<G, B, D>
where
    G: Gpio,
    B: Buzzer,
    D: Delay,
{
    pub fn new(gpio: G, buzzer: B, delay: D, wiring: Wiring<G::Pin>, keymap: &'static Keymap) -> Self {
        Self {
            gpio,
            delay,
            scanner: KeypadScanner::new(wiring.keypad, keymap),
            leds: wiring.leds,
            tone: ToneGenerator::new(buzzer),
        }
    }

    /// Configure pins, switch the LEDs off and program the start-up tone
    /// with the buzzer stopped.
    pub fn init(&mut self) {
        self.leds.init(&mut self.gpio);
        self.scanner.init(&mut self.gpio);
        self.tone.set_buzzer(false);
        self.restore_beep_tone();
    }

    /// Program the 350 Hz tone that key '1' beeps with.
    fn restore_beep_tone(&mut self) {
        if let Err(e) = self.tone.configure(INIT_FREQUENCY_HZ) {
            warn!("start-up tone unavailable: {}", e);
        }
    }

    /// One loop iteration. Returns the key that was handled.
    pub fn run_once(&mut self) -> Option<char> {
        let key = self.scanner.scan(&mut self.gpio, &mut self.delay);
        let action = action_for(key);
        if key.is_some() {
            debug!("key {:?}: {:?}", key, action);
        }
        self.perform(action);
        self.delay.delay_ms(LOOP_DELAY_MS);
        key
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    pub fn perform(&mut self, action: Action) {
        if let Some(state) = action.leds {
            self.leds.apply(&mut self.gpio, state);
        }

        match action.buzzer {
            BuzzerAction::Unchanged => {}
            BuzzerAction::Beep { duration_ms } => {
                self.tone.set_buzzer(true);
                self.delay.delay_ms(duration_ms);
                self.tone.set_buzzer(false);
            }
            BuzzerAction::Melody => {
                self.tone.play_melody(&mut self.delay, &IMPERIAL_MARCH);
                // the melody leaves its last pitch programmed
                self.restore_beep_tone();
            }
        }

        if action.hold_ms > 0 {
            self.delay.delay_ms(action.hold_ms);
        }
    }

    pub fn scanner(&self) -> &KeypadScanner<G::Pin> {
        &self.scanner
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    pub fn tone(&self) -> &ToneGenerator<B> {
        &self.tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::KEYPAD;
    use crate::melody::NOTE_GAP_MS;
    use crate::testutil::{self, Event, MockBuzzer, MockDelay, MockGpio, WIRING};
    use crate::tone::{pwm_period, PwmPeriod};

    type TestController = Controller<MockGpio, MockBuzzer, MockDelay>;

    fn setup() -> (TestController, testutil::Log) {
        let log = testutil::log();
        let mut controller = Controller::new(
            MockGpio::new(log.clone()),
            MockBuzzer::new(log.clone()),
            MockDelay::new(log.clone()),
            WIRING,
            &KEYPAD,
        );
        controller.init();
        log.borrow_mut().clear();
        (controller, log)
    }

    fn leds(controller: &TestController) -> LedState {
        let gpio = controller.gpio();
        LedState::new(
            gpio.level(WIRING.leds.red),
            gpio.level(WIRING.leds.blue),
            gpio.level(WIRING.leds.green),
        )
    }

    #[test]
    fn test_action_table() {
        assert_eq!(action_for(Some('A')).leds, Some(LedState::RED));
        assert_eq!(action_for(Some('B')).leds, Some(LedState::GREEN));
        assert_eq!(action_for(Some('C')).leds, Some(LedState::BLUE));
        assert_eq!(action_for(Some('D')).leds, Some(LedState::ALL));
        assert_eq!(action_for(Some('#')).leds, None);
        assert_eq!(action_for(Some('#')).buzzer, BuzzerAction::Melody);
        assert_eq!(
            action_for(Some('1')).buzzer,
            BuzzerAction::Beep { duration_ms: 1000 }
        );

        for key in [None, Some('2'), Some('*'), Some('0'), Some('9')] {
            let action = action_for(key);
            assert_eq!(action.leds, Some(LedState::OFF));
            assert_eq!(action.buzzer, BuzzerAction::Unchanged);
            assert_eq!(action.hold_ms, 0);
        }
    }

    #[test]
    fn test_init_programs_startup_tone() {
        let log = testutil::log();
        let mut controller = Controller::new(
            MockGpio::new(log.clone()),
            MockBuzzer::new(log.clone()),
            MockDelay::new(log.clone()),
            WIRING,
            &KEYPAD,
        );
        controller.init();

        assert_eq!(
            testutil::timeline(&log),
            vec![
                Event::Enabled(false),
                Event::Period(PwmPeriod {
                    wrap: 45713,
                    duty: 22856
                }),
            ]
        );
        assert_eq!(leds(&controller), LedState::OFF);
    }

    #[test]
    fn test_key_1_beeps_at_init_frequency() {
        let (mut controller, log) = setup();
        controller.gpio_mut().press_key('1', 0);

        assert_eq!(controller.run_once(), Some('1'));
        assert_eq!(leds(&controller), LedState::RED);
        assert_eq!(
            testutil::timeline(&log),
            vec![
                Event::Enabled(true),
                Event::Delay(BEEP_MS),
                Event::Enabled(false),
                Event::Delay(LOOP_DELAY_MS),
            ]
        );
        assert!(!controller.tone().buzzer().enabled);
    }

    #[test]
    fn test_no_key_turns_leds_off() {
        let (mut controller, log) = setup();
        controller.perform(action_for(Some('D')));
        assert_eq!(leds(&controller), LedState::ALL);
        log.borrow_mut().clear();

        assert_eq!(controller.run_once(), None);
        assert_eq!(leds(&controller), LedState::OFF);
        assert_eq!(
            testutil::timeline(&log),
            vec![Event::Delay(LOOP_DELAY_MS)]
        );
    }

    #[test]
    fn test_letter_keys_set_leds() {
        for (key, expected) in [
            ('A', LedState::RED),
            ('B', LedState::GREEN),
            ('C', LedState::BLUE),
            ('D', LedState::ALL),
        ] {
            let (mut controller, log) = setup();
            controller.gpio_mut().press_key(key, 2);

            assert_eq!(controller.run_once(), Some(key));
            assert_eq!(leds(&controller), expected, "key {}", key);
            assert_eq!(
                testutil::timeline(&log),
                vec![
                    Event::Delay(10),
                    Event::Delay(10),
                    Event::Delay(ACTION_HOLD_MS),
                    Event::Delay(LOOP_DELAY_MS),
                ]
            );
        }
    }

    #[test]
    fn test_hash_plays_melody_leaving_leds() {
        let (mut controller, log) = setup();
        controller.perform(action_for(Some('C')));
        log.borrow_mut().clear();

        controller.gpio_mut().press_key('#', 0);
        assert_eq!(controller.run_once(), Some('#'));
        assert_eq!(leds(&controller), LedState::BLUE);

        let timeline = testutil::timeline(&log);
        let periods: Vec<PwmPeriod> = timeline
            .iter()
            .filter_map(|e| match e {
                Event::Period(p) => Some(*p),
                _ => None,
            })
            .collect();
        let mut expected: Vec<PwmPeriod> = IMPERIAL_MARCH
            .iter()
            .map(|n| pwm_period(testutil::CLOCK_HZ, n.frequency_hz.into()).unwrap())
            .collect();
        expected.push(pwm_period(testutil::CLOCK_HZ, INIT_FREQUENCY_HZ).unwrap());
        assert_eq!(periods, expected);

        let tail = timeline[timeline.len() - 3..].to_vec();
        assert_eq!(
            tail,
            vec![
                Event::Delay(NOTE_GAP_MS),
                Event::Delay(ACTION_HOLD_MS),
                Event::Delay(LOOP_DELAY_MS),
            ]
        );
    }

    #[test]
    fn test_key_1_after_melody() {
        let (mut controller, log) = setup();
        controller.gpio_mut().press_key('#', 0);
        assert_eq!(controller.run_once(), Some('#'));
        log.borrow_mut().clear();

        controller.gpio_mut().press_key('1', 0);
        assert_eq!(controller.run_once(), Some('1'));

        let beep = pwm_period(testutil::CLOCK_HZ, INIT_FREQUENCY_HZ).unwrap();
        assert_eq!(
            beep,
            PwmPeriod {
                wrap: 45713,
                duty: 22856
            }
        );
        assert_eq!(controller.tone().buzzer().period, Some(beep));
        assert_eq!(
            testutil::timeline(&log),
            vec![
                Event::Enabled(true),
                Event::Delay(BEEP_MS),
                Event::Enabled(false),
                Event::Delay(LOOP_DELAY_MS),
            ]
        );
    }

    #[test]
    fn test_unmapped_key_turns_leds_off() {
        let (mut controller, _) = setup();
        controller.perform(action_for(Some('A')));

        controller.gpio_mut().press_key('5', 0);
        assert_eq!(controller.run_once(), Some('5'));
        assert_eq!(leds(&controller), LedState::OFF);
        assert_eq!(controller.scanner().last_key(), Some('5'));
    }
}

//! Keypad LED/buzzer firmware for ATmega32U4 (Teensy 2.0).
//!
//! Polls a 4x4 membrane keypad and, depending on the key:
//! - lights the red, green or blue LED (or all of them)
//! - beeps the piezo buzzer for a second
//! - plays the Imperial March on the buzzer
//!
//! All of the logic lives in `keytone-core`; this crate only supplies the
//! register-level GPIO, Timer1 PWM, clock and delay implementations.

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod board;
mod clock;
mod delay;
mod gpio;
mod pwm;

use avr_device::atmega32u4::Peripherals;
use keytone_core::{Controller, Gpio, KEYPAD};

use delay::BusyDelay;
use gpio::AvrGpio;
use pwm::Timer1Buzzer;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Run from the undivided 16MHz crystal. The Teensy bootloader may leave
    // CLKPR at /2 depending on fuses.
    clock::set_prescaler(&dp, 0);

    let mut gpio = AvrGpio::new(&dp);
    gpio.set_output(board::STATUS_LED);

    let mut controller = Controller::new(
        gpio,
        Timer1Buzzer::new(&dp),
        BusyDelay::new(&dp),
        board::WIRING,
        &KEYPAD,
    );
    controller.init();

    // On-board LED on to indicate firmware is running
    controller.gpio_mut().write(board::STATUS_LED, true);

    controller.run()
}

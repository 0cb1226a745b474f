//! System clock prescaler (CLKPR).

use avr_device::atmega32u4::Peripherals;

/// Teensy 2.0 crystal frequency.
pub const CRYSTAL_HZ: u32 = 16_000_000;

/// CLKPCE: must be written alone, then CLKPS within four cycles.
const CLKPCE: u8 = 0x80;
const CLKPS_MASK: u8 = 0x0F;
/// Largest valid CLKPS value (divide by 256).
const CLKPS_MAX: u8 = 8;

/// Current system clock in Hz, derived from the live prescaler setting.
pub fn system_clock_hz(dp: &Peripherals) -> u32 {
    let clkps = (dp.CPU.clkpr.read().bits() & CLKPS_MASK).min(CLKPS_MAX);
    CRYSTAL_HZ >> clkps
}

/// Set the system clock to `CRYSTAL_HZ >> clkps`.
pub fn set_prescaler(dp: &Peripherals, clkps: u8) {
    let clkps = clkps.min(CLKPS_MAX);
    avr_device::interrupt::free(|_| {
        dp.CPU.clkpr.write(|w| unsafe { w.bits(CLKPCE) });
        dp.CPU.clkpr.write(|w| unsafe { w.bits(clkps) });
    });
}

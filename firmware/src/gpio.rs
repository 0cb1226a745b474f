//! Register-level GPIO for the ports this board uses.

use avr_device::atmega32u4::Peripherals;
use keytone_core::Gpio;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    B,
    D,
    F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pin {
    port: Port,
    bit: u8,
}

impl Pin {
    pub const fn new(port: Port, bit: u8) -> Self {
        Self { port, bit }
    }

    fn mask(self) -> u8 {
        1 << self.bit
    }
}

pub struct AvrGpio<'a> {
    dp: &'a Peripherals,
}

impl<'a> AvrGpio<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }

    /// Read-modify-write the data direction register of a port.
    fn modify_ddr(&self, port: Port, f: impl Fn(u8) -> u8) {
        match port {
            Port::B => self.dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::D => self.dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::F => self.dp.PORTF.ddrf.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
        }
    }

    /// Read-modify-write the output (or pull-up enable) register of a port.
    fn modify_port(&self, port: Port, f: impl Fn(u8) -> u8) {
        match port {
            Port::B => self.dp.PORTB.portb.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::D => self.dp.PORTD.portd.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
            Port::F => self.dp.PORTF.portf.modify(|r, w| unsafe { w.bits(f(r.bits())) }),
        }
    }

    fn read_pins(&self, port: Port) -> u8 {
        match port {
            Port::B => self.dp.PORTB.pinb.read().bits(),
            Port::D => self.dp.PORTD.pind.read().bits(),
            Port::F => self.dp.PORTF.pinf.read().bits(),
        }
    }
}

impl Gpio for AvrGpio<'_> {
    type Pin = Pin;

    fn set_output(&mut self, pin: Pin) {
        self.modify_ddr(pin.port, |bits| bits | pin.mask());
    }

    fn set_input_pullup(&mut self, pin: Pin) {
        // DDR bit clear = input, PORT bit set = pull-up enabled
        self.modify_ddr(pin.port, |bits| bits & !pin.mask());
        self.modify_port(pin.port, |bits| bits | pin.mask());
    }

    fn write(&mut self, pin: Pin, high: bool) {
        if high {
            self.modify_port(pin.port, |bits| bits | pin.mask());
        } else {
            self.modify_port(pin.port, |bits| bits & !pin.mask());
        }
    }

    fn is_high(&mut self, pin: Pin) -> bool {
        // A freshly driven column needs a moment before the rows follow
        tiny_delay();
        self.read_pins(pin.port) & pin.mask() != 0
    }
}

/// Short delay for pin settling (~5us at 16MHz).
#[inline(always)]
fn tiny_delay() {
    for _ in 0..20u8 {
        unsafe { core::arch::asm!("nop") };
    }
}

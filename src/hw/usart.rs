// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debug log over USART.
//!
//! Output only: the firmware never reads from the port. Lines end in CRLF; when using `writeln!`,
//! put the `\r` in the format string.
//!
//! On the NUCLEO-F767ZI, USART3 is bridged to the ST-LINK virtual COM port:
//! ```text
//! $ screen /dev/ttyACM0 115200
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use crate::control::{Position, PulseWidth};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    /// Keep the TX half; RX is dropped.
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the last byte has left the shift register.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    /// One line per sweep transition, e.g. `MIN 50 ticks (1000 us)`.
    pub fn log_position(&mut self, position: Position, ticks: u16, tick_hz: u32) {
        let us = PulseWidth::from_ticks(u32::from(ticks), tick_hz).as_micros();
        let _ = fmt::Write::write_fmt(
            self,
            format_args!("{} {} ticks ({} us)\r\n", position, ticks, us),
        );
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

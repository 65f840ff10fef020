// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED on a push-pull GPIO.
//!
//! Green marks PWM running, red marks the fault state.

use stm32f7xx_hal::gpio::{self, Output, PushPull};

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED driven through its board active level.
pub struct Led<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
    active: ActiveLevel,
}

impl<const P: char, const N: u8> Led<P, N> {
    /// Take the pin and switch the LED off.
    pub fn new(pin: gpio::Pin<P, N, Output<PushPull>>, active: ActiveLevel) -> Self {
        let mut led = Self { pin, active };
        led.off();
        led
    }

    /// Nucleo user LEDs sink through a resistor to ground.
    #[inline]
    pub fn active_high(pin: gpio::Pin<P, N, Output<PushPull>>) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn set(&mut self, on: bool) {
        match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low(),
        }
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the NUCLEO-F767ZI servo board.
//!
//! `split()` enables each GPIO bank's AHB1 clock gate before any pin is touched.

use stm32f7xx_hal::{
    gpio::{gpiob, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

use crate::hw::pwm::ServoPin;

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: Leds,
    pub usart3: Usart3Pins,
    /// TIM3_CH1 on PA6 (Arduino D12 on CN7).
    pub servo: ServoPin,
}

pub struct Leds {
    pub green: gpiob::PB0<Output<PushPull>>, // LD1
    pub blue: gpiob::PB7<Output<PushPull>>,  // LD2
    pub red: gpiob::PB14<Output<PushPull>>,  // LD3
}

/// USART3 routed to the ST-LINK virtual COM port
pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    ///
    /// The servo pin is muxed as AF2 push-pull. Pull resistors (off) and output speed (low) stay at
    /// their reset values.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();

        Self {
            leds: Leds {
                green: gpiob.pb0.into_push_pull_output(),
                blue: gpiob.pb7.into_push_pull_output(),
                red: gpiob.pb14.into_push_pull_output(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            servo: gpioa.pa6.into_alternate::<2>(),
        }
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Terminal fault state.
//!
//! Entered on the first start-up failure. Servo pulses stop, the reason is printed once and the
//! red LED stays lit until reset.

use core::fmt::Write;

use stm32f7xx_hal::serial::Instance;

use crate::error::Error;
use crate::hw::{Led, Tim3Pwm, Usart};

/// Park the MCU. `pwm` is `None` when the failure happened before TIM3 was configured.
pub fn halt<U, const P: char, const N: u8>(
    usart: &mut Usart<U>,
    red: &mut Led<P, N>,
    pwm: Option<&mut Tim3Pwm>,
    err: Error,
) -> !
where
    U: Instance,
{
    if let Some(pwm) = pwm {
        let channel = pwm.channel();
        pwm.disable_output(channel);
        pwm.stop();
    }

    let _ = writeln!(usart, "FAULT: {}\r", err);
    usart.flush();
    red.on();

    loop {
        cortex_m::asm::nop();
    }
}

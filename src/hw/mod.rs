// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU Peripheral Layer
//!
//! Thin wrappers over the STM32F767 HAL/PAC used by the servo firmware.
//!
//! - [`clock`] - RCC freeze and read-back checks.
//! - [`pins`] - NUCLEO-F767ZI pin map.
//! - [`pwm`] - TIM3 PWM servo channel.
//! - [`led`] - Status LEDs.
//! - [`usart`] - Debug log.

pub mod clock;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod usart;

pub use led::Led;
pub use pins::BoardPins;
pub use pwm::Tim3Pwm;
pub use usart::Usart;

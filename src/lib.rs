// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # servo_cycle Firmware
//!
//! Drives one hobby servo from TIM3 on an STM32F767 (NUCLEO-F767ZI), cycling it through its
//! minimum, center and maximum positions once per second.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Clock, pin, timer and channel records with validation (host-testable) |
//! | [`control`] | Pulse widths and the MIN/CENTER/MAX sweep (host-testable) |
//! | [`error`] | Start-up error types |
//! | `hw` | MCU-level wrappers: RCC, pins, TIM3 PWM, LEDs, USART (`device` feature) |
//! | `fault` | Terminal fault state (`device` feature) |
//!
//! ## Getting Started
//!
//! Flash the board:
//!
//! ```bash
//! cargo firmware
//! ```
//!
//! Run the host tests:
//!
//! ```bash
//! cargo host-test
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod error;

#[cfg(feature = "device")]
pub mod fault;
#[cfg(feature = "device")]
pub mod hw;

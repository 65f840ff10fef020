// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Servo Control
//!
//! Open-loop position cycling. Nothing here touches registers; the hardware PWM channel plugs in
//! through [`PulseOutput`].
//!
//! ## Modules
//!
//! - [`pulse`] - Pulse width in microseconds and its conversion to compare ticks.
//! - [`sweep`] - MIN/CENTER/MAX cycle with a fixed hold time.

pub mod pulse;
pub mod sweep;

pub use pulse::PulseWidth;
pub use sweep::{Hold, Position, PulseOutput, Sweep, HOLD_MS};

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Three-position servo cycle.
//!
//! The sweep writes one of three fixed pulse widths, holds it for a second, and moves on:
//!
//! ```text
//! MIN (1.0 ms) -> CENTER (1.5 ms) -> MAX (2.0 ms) -> MIN ...
//! ```
//!
//! There is no input and no exit. The compare value is written first and the hold callback runs
//! right after, so anything done inside the hold (logging) comes out of the hold time instead of
//! stretching the period between writes:
//!
//! ```ignore
//! let mut sweep = Sweep::new(setup.tick_hz());
//!
//! sweep.run(&mut pwm, |hold| {
//!     log(hold.position);
//!     delay.delay_us(hold.remaining_us(spent_us));
//! });
//! ```

use derive_more::Display;

use crate::control::PulseWidth;

/// Time each position is held.
pub const HOLD_MS: u32 = 1_000;

/// Something that can emit a servo pulse: the hardware PWM channel, or a recorder in tests.
pub trait PulseOutput {
    /// Write a new compare value, in timer ticks. Takes effect from the next frame.
    fn set_pulse_ticks(&mut self, ticks: u16);
}

/// Servo position held by the sweep.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum Position {
    #[display("MIN")]
    Min,
    #[display("CENTER")]
    Center,
    #[display("MAX")]
    Max,
}

impl Position {
    /// Cycle order, starting from the first position written.
    pub const SEQUENCE: [Position; 3] = [Position::Min, Position::Center, Position::Max];

    #[inline]
    pub const fn pulse_us(self) -> u32 {
        match self {
            Position::Min => 1_000,
            Position::Center => 1_500,
            Position::Max => 2_000,
        }
    }

    #[inline]
    pub const fn pulse(self) -> PulseWidth {
        PulseWidth::from_micros(self.pulse_us())
    }

    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Position::Min => Position::Center,
            Position::Center => Position::Max,
            Position::Max => Position::Min,
        }
    }
}

/// What was just written, passed to the hold callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Hold {
    pub position: Position,
    pub ticks: u16,
    pub ms: u32,
}

impl Hold {
    /// Time left of the hold once `spent_us` has already gone by since the write.
    #[inline]
    pub fn remaining_us(&self, spent_us: u32) -> u32 {
        self.ms.saturating_mul(1_000).saturating_sub(spent_us)
    }
}

/// Sweep state: the position to write next and the compare values for the active tick rate.
pub struct Sweep {
    position: Position,
    /// Compare ticks for `Position::SEQUENCE`, in order.
    ticks: [u16; 3],
}

impl Sweep {
    /// Start at `Position::Min`, converting every position for a counter ticking at `tick_hz`.
    ///
    /// Positions that do not land on a whole tick are rounded down; `ServoSetup::validate`
    /// rejects such tick rates before the sweep is built.
    pub fn new(tick_hz: u32) -> Self {
        let ticks = Position::SEQUENCE.map(|p| {
            let exact = p.pulse().to_ticks(tick_hz);
            exact.unwrap_or_else(|| {
                let us = u64::from(p.pulse_us()) * u64::from(tick_hz) / 1_000_000;
                u16::try_from(us).unwrap_or(u16::MAX)
            })
        });

        Self {
            position: Position::Min,
            ticks,
        }
    }

    /// Position the next `step()` will write.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Compare value for `position`.
    #[inline]
    pub fn ticks(&self, position: Position) -> u16 {
        match position {
            Position::Min => self.ticks[0],
            Position::Center => self.ticks[1],
            Position::Max => self.ticks[2],
        }
    }

    /// Write the current position, block for the hold time, then advance.
    ///
    /// Returns the position that was written.
    pub fn step<O, H>(&mut self, out: &mut O, mut hold: H) -> Position
    where
        O: PulseOutput,
        H: FnMut(Hold),
    {
        let current = self.position;
        let ticks = self.ticks(current);
        out.set_pulse_ticks(ticks);
        hold(Hold {
            position: current,
            ticks,
            ms: HOLD_MS,
        });
        self.position = current.next();
        current
    }

    /// Run forever.
    pub fn run<O, H>(&mut self, out: &mut O, mut hold: H) -> !
    where
        O: PulseOutput,
        H: FnMut(Hold),
    {
        loop {
            self.step(out, &mut hold);
        }
    }
}

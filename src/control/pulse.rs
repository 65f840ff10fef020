// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo pulse width in physical units.
//!
//! Hobby servos read the high time of each 20 ms frame: 1.0 ms is one end stop, 1.5 ms is
//! center, 2.0 ms is the other end stop. Converting to compare ticks depends on the timer tick
//! rate, so positions are kept in microseconds and converted at the edge.

/// Shortest pulse a standard servo accepts.
pub const SERVO_MIN_US: u32 = 1_000;

/// Longest pulse a standard servo accepts.
pub const SERVO_MAX_US: u32 = 2_000;

/// High time of one PWM frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct PulseWidth {
    micros: u32,
}

impl PulseWidth {
    #[inline]
    pub const fn from_micros(micros: u32) -> Self {
        Self { micros }
    }

    /// Pulse width produced by `ticks` counter ticks at `tick_hz` (rounded down to whole us).
    pub fn from_ticks(ticks: u32, tick_hz: u32) -> Self {
        let micros = (u64::from(ticks) * 1_000_000)
            .checked_div(u64::from(tick_hz))
            .unwrap_or(0);
        Self {
            micros: micros as u32,
        }
    }

    #[inline]
    pub const fn as_micros(self) -> u32 {
        self.micros
    }

    /// Compare value for this pulse at `tick_hz`.
    ///
    /// Returns `None` if the pulse does not land on a whole tick or does not fit a 16-bit compare
    /// register.
    pub fn to_ticks(self, tick_hz: u32) -> Option<u16> {
        let scaled = u64::from(self.micros) * u64::from(tick_hz);
        if scaled % 1_000_000 != 0 {
            return None;
        }
        u16::try_from(scaled / 1_000_000).ok()
    }

    /// Duty cycle in basis points (1/100 %) within a frame of `frame_us`.
    pub fn duty_bp(self, frame_us: u32) -> u32 {
        (u64::from(self.micros.min(frame_us)) * 10_000)
            .checked_div(u64::from(frame_us))
            .unwrap_or(0) as u32
    }

    /// Inside the 1.0-2.0 ms range every standard servo tolerates.
    #[inline]
    pub fn is_servo_safe(self) -> bool {
        (SERVO_MIN_US..=SERVO_MAX_US).contains(&self.micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_at_50khz() {
        assert_eq!(PulseWidth::from_micros(1_000).to_ticks(50_000), Some(50));
        assert_eq!(PulseWidth::from_micros(1_500).to_ticks(50_000), Some(75));
        assert_eq!(PulseWidth::from_micros(2_000).to_ticks(50_000), Some(100));
    }

    #[test]
    fn ticks_at_1mhz() {
        assert_eq!(PulseWidth::from_micros(1_500).to_ticks(1_000_000), Some(1_500));
        assert_eq!(PulseWidth::from_ticks(1_500, 1_000_000).as_micros(), 1_500);
    }

    #[test]
    fn inexact_or_oversized_ticks() {
        // 20 us tick cannot express 1.51 ms
        assert_eq!(PulseWidth::from_micros(1_510).to_ticks(50_000), None);
        // 70 ms at 1 MHz overflows a 16-bit compare register
        assert_eq!(PulseWidth::from_micros(70_000).to_ticks(1_000_000), None);
    }

    #[test]
    fn duty_in_basis_points() {
        assert_eq!(PulseWidth::from_micros(1_500).duty_bp(20_000), 750);
        assert_eq!(PulseWidth::from_micros(0).duty_bp(20_000), 0);
        assert_eq!(PulseWidth::from_micros(25_000).duty_bp(20_000), 10_000);
        assert_eq!(PulseWidth::from_micros(1_500).duty_bp(0), 0);
    }

    #[test]
    fn servo_safe_range() {
        assert!(PulseWidth::from_micros(1_000).is_servo_safe());
        assert!(PulseWidth::from_micros(2_000).is_servo_safe());
        assert!(!PulseWidth::from_micros(999).is_servo_safe());
        assert!(!PulseWidth::from_ticks(50, 1_000_000).is_servo_safe());
    }
}

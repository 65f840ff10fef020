// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Timer base and output-compare channel records.
//!
//! The prescaler and period are stored as the divisor and tick count they stand for; the values
//! written to PSC/ARR are one less.

use crate::error::ConfigError;

/// Largest divisor / tick count a 16-bit PSC or ARR can express.
const REG16_SPAN: u32 = 1 << 16;

/// Standard hobby-servo frame: 20 ms (50 Hz).
pub const SERVO_FRAME_US: u32 = 20_000;

/// Output-compare channel of a general-purpose timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Channel {
    C1,
    C2,
    C3,
    C4,
}

impl Channel {
    /// Zero-based index, used for CCER/CCMR bit offsets.
    #[inline]
    pub const fn index(self) -> u8 {
        match self {
            Channel::C1 => 0,
            Channel::C2 => 1,
            Channel::C3 => 2,
            Channel::C4 => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CountDirection {
    Up,
    Down,
}

/// Dead-time/filter sampling clock division (CR1.CKD).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClockDivision {
    Div1,
    Div2,
    Div4,
}

impl ClockDivision {
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            ClockDivision::Div1 => 0b00,
            ClockDivision::Div2 => 0b01,
            ClockDivision::Div4 => 0b10,
        }
    }
}

/// Counter configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimerConfig {
    /// Timer clock divisor, 1..=65536.
    pub prescaler: u32,
    /// Ticks per PWM frame, 1..=65536.
    pub period: u32,
    pub direction: CountDirection,
    pub clock_division: ClockDivision,
}

impl TimerConfig {
    /// 50 kHz tick (20 us resolution), 1000-tick 20 ms frame from an 84 MHz timer clock.
    ///
    /// At this tick rate the servo pulses are 50 / 75 / 100 ticks.
    pub const fn servo_50hz() -> Self {
        Self {
            prescaler: 1_680,
            period: 1_000,
            direction: CountDirection::Up,
            clock_division: ClockDivision::Div1,
        }
    }

    /// 1 MHz tick (1 us resolution), 20000-tick 20 ms frame from an 84 MHz timer clock.
    pub const fn servo_50hz_1mhz() -> Self {
        Self {
            prescaler: 84,
            period: 20_000,
            direction: CountDirection::Up,
            clock_division: ClockDivision::Div1,
        }
    }

    /// Value for the PSC register.
    #[inline]
    pub fn psc_bits(&self) -> u16 {
        self.prescaler.saturating_sub(1) as u16
    }

    /// Value for the ARR register.
    #[inline]
    pub fn arr_bits(&self) -> u16 {
        self.period.saturating_sub(1) as u16
    }

    /// Counter tick rate for a given timer input clock.
    #[inline]
    pub fn tick_hz(&self, timer_clock_hz: u32) -> u32 {
        timer_clock_hz.checked_div(self.prescaler).unwrap_or(0)
    }

    /// Frame period in microseconds.
    pub fn frame_us(&self, timer_clock_hz: u32) -> u32 {
        let tick = u64::from(self.tick_hz(timer_clock_hz));
        (u64::from(self.period) * 1_000_000)
            .checked_div(tick)
            .unwrap_or(0) as u32
    }

    /// PWM frequency in Hz.
    #[inline]
    pub fn frame_hz(&self, timer_clock_hz: u32) -> u32 {
        self.tick_hz(timer_clock_hz)
            .checked_div(self.period)
            .unwrap_or(0)
    }

    /// Compare value actually used by the hardware path: out-of-range requests are clamped to
    /// `[0, period]`. `period` keeps the output high for the whole frame.
    #[inline]
    pub fn clamp_pulse(&self, ticks: u32) -> u32 {
        ticks.min(self.period)
    }

    /// Number of ticks the output is high per frame for a compare value (PWM mode 1, counting
    /// up, active high).
    #[inline]
    pub fn high_ticks(&self, compare: u32) -> u32 {
        self.clamp_pulse(compare)
    }

    /// Duty cycle in basis points (1/100 %).
    pub fn duty_bp(&self, compare: u32) -> u32 {
        (self.high_ticks(compare) * 10_000)
            .checked_div(self.period)
            .unwrap_or(0)
    }

    /// Register ranges only; frame/tick exactness is checked by `ServoSetup`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=REG16_SPAN).contains(&self.prescaler) {
            return Err(ConfigError::PrescalerOutOfRange(self.prescaler));
        }
        if !(1..=REG16_SPAN).contains(&self.period) {
            return Err(ConfigError::PeriodOutOfRange(self.period));
        }
        Ok(())
    }
}

/// Output-compare mode (CCMRx.OCxM).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputCompareMode {
    Frozen,
    /// Active while CNT < CCR (counting up).
    Pwm1,
    /// Inactive while CNT < CCR (counting up).
    Pwm2,
}

impl OutputCompareMode {
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            OutputCompareMode::Frozen => 0b000,
            OutputCompareMode::Pwm1 => 0b110,
            OutputCompareMode::Pwm2 => 0b111,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

/// Output-compare channel configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelConfig {
    pub channel: Channel,
    pub mode: OutputCompareMode,
    /// Starting compare value in ticks.
    pub pulse: u16,
    pub polarity: Polarity,
    pub fast_mode: bool,
}

impl ChannelConfig {
    /// Channel 1, PWM mode 1, active high, no fast mode, parked at `pulse`.
    pub const fn servo(pulse: u16) -> Self {
        Self {
            channel: Channel::C1,
            mode: OutputCompareMode::Pwm1,
            pulse,
            polarity: Polarity::ActiveHigh,
            fast_mode: false,
        }
    }

    pub fn validate(&self, timer: &TimerConfig) -> Result<(), ConfigError> {
        if self.mode == OutputCompareMode::Frozen {
            return Err(ConfigError::NotPwmMode);
        }
        if u32::from(self.pulse) > timer.period {
            return Err(ConfigError::PulseExceedsPeriod {
                pulse: self.pulse,
                period: timer.period,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMCLK: u32 = 84_000_000;

    #[test]
    fn default_servo_timer_is_50hz() {
        let t = TimerConfig::servo_50hz();
        assert_eq!(t.tick_hz(TIMCLK), 50_000);
        assert_eq!(t.frame_us(TIMCLK), SERVO_FRAME_US);
        assert_eq!(t.frame_hz(TIMCLK), 50);
        assert_eq!(t.psc_bits(), 1_679);
        assert_eq!(t.arr_bits(), 999);
        assert_eq!(t.validate(), Ok(()));
    }

    #[test]
    fn one_mhz_variant_is_50hz() {
        let t = TimerConfig::servo_50hz_1mhz();
        assert_eq!(t.tick_hz(TIMCLK), 1_000_000);
        assert_eq!(t.frame_us(TIMCLK), 20_000);
        assert_eq!(t.frame_hz(TIMCLK), 50);
        assert_eq!(t.psc_bits(), 83);
        assert_eq!(t.arr_bits(), 19_999);
    }

    #[test]
    fn clamp_keeps_compare_inside_frame() {
        let t = TimerConfig::servo_50hz();
        assert_eq!(t.clamp_pulse(0), 0);
        assert_eq!(t.clamp_pulse(75), 75);
        assert_eq!(t.clamp_pulse(1_000), 1_000);
        assert_eq!(t.clamp_pulse(60_000), 1_000);
    }

    #[test]
    fn duty_extremes() {
        let t = TimerConfig::servo_50hz();
        assert_eq!(t.duty_bp(0), 0);
        assert_eq!(t.duty_bp(75), 750);
        assert_eq!(t.duty_bp(1_000), 10_000);
        assert_eq!(t.duty_bp(u32::from(u16::MAX)), 10_000);
    }

    #[test]
    fn register_ranges() {
        let zero = TimerConfig {
            prescaler: 0,
            ..TimerConfig::servo_50hz()
        };
        assert_eq!(zero.validate(), Err(ConfigError::PrescalerOutOfRange(0)));

        let wide = TimerConfig {
            period: 70_000,
            ..TimerConfig::servo_50hz()
        };
        assert_eq!(wide.validate(), Err(ConfigError::PeriodOutOfRange(70_000)));

        let full = TimerConfig {
            prescaler: 65_536,
            period: 65_536,
            ..TimerConfig::servo_50hz()
        };
        assert_eq!(full.validate(), Ok(()));
        assert_eq!(full.psc_bits(), u16::MAX);
        assert_eq!(full.arr_bits(), u16::MAX);
    }

    #[test]
    fn channel_checks() {
        let t = TimerConfig::servo_50hz();
        assert_eq!(ChannelConfig::servo(75).validate(&t), Ok(()));
        assert_eq!(
            ChannelConfig::servo(1_001).validate(&t),
            Err(ConfigError::PulseExceedsPeriod {
                pulse: 1_001,
                period: 1_000
            })
        );

        let frozen = ChannelConfig {
            mode: OutputCompareMode::Frozen,
            ..ChannelConfig::servo(75)
        };
        assert_eq!(frozen.validate(&t), Err(ConfigError::NotPwmMode));
    }

    #[test]
    fn channel_indices() {
        assert_eq!(Channel::C1.index(), 0);
        assert_eq!(Channel::C4.index(), 3);
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware Configuration Records
//!
//! Flat, write-once descriptions of everything the firmware programs at boot. They are plain data
//! so they can be validated (and unit tested) without the MCU.
//!
//! ## Modules
//!
//! - [`clock`] - HSI/PLL clock tree and bus dividers.
//! - [`pin`] - Pin mux record and timer-channel routing table.
//! - [`timer`] - Timer base and output-compare channel.

pub mod clock;
pub mod pin;
pub mod timer;

pub use clock::ClockConfig;
pub use pin::{PinConfig, Timer};
pub use timer::{Channel, ChannelConfig, TimerConfig, SERVO_FRAME_US};

use crate::control::{Position, PulseWidth};
use crate::error::ConfigError;

/// Everything needed to bring up one servo output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ServoSetup {
    pub clock: ClockConfig,
    pub pin: PinConfig,
    pub timer_instance: Timer,
    pub timer: TimerConfig,
    pub channel: ChannelConfig,
}

impl ServoSetup {
    /// TIM3_CH1 on PA6, channel parked at the center position.
    pub fn new(clock: ClockConfig, timer: TimerConfig) -> Self {
        let tick_hz = timer.tick_hz(clock.apb1_timer_hz());
        let center = PulseWidth::from_micros(Position::Center.pulse_us())
            .to_ticks(tick_hz)
            .unwrap_or(0);

        Self {
            clock,
            pin: PinConfig::tim3_ch1_pa6(),
            timer_instance: Timer::Tim3,
            timer,
            channel: ChannelConfig::servo(center),
        }
    }

    /// Board defaults for the NUCLEO-F767ZI: 84 MHz from the HSI, 50 kHz tick, 20 ms frame.
    pub fn nucleo_f767zi() -> Self {
        Self::new(ClockConfig::hsi_84mhz(), TimerConfig::servo_50hz())
    }

    /// Input clock of the selected timer.
    #[inline]
    pub fn timer_clock_hz(&self) -> u32 {
        match self.timer_instance {
            Timer::Tim3 => self.clock.apb1_timer_hz(),
        }
    }

    /// Counter tick rate.
    #[inline]
    pub fn tick_hz(&self) -> u32 {
        self.timer.tick_hz(self.timer_clock_hz())
    }

    /// Validate every record, then the cross-record timing: the tick must divide evenly out of the
    /// timer clock, the frame must be exactly 20 ms, and every servo position must land on a whole
    /// tick inside the frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clock.validate()?;
        self.pin
            .validate(self.timer_instance, self.channel.channel)?;
        self.timer.validate()?;
        self.channel.validate(&self.timer)?;

        let timer_clock = self.timer_clock_hz();
        if timer_clock % self.timer.prescaler != 0 {
            return Err(ConfigError::TickRateNotExact);
        }

        let tick_hz = self.tick_hz();
        let frame_us = self.timer.frame_us(timer_clock);
        let frame_exact = (u64::from(self.timer.period) * 1_000_000)
            .checked_rem(u64::from(tick_hz))
            .is_some_and(|rem| rem == 0);
        if !frame_exact || frame_us != SERVO_FRAME_US {
            return Err(ConfigError::FrameNotStandard(frame_us));
        }

        for position in Position::SEQUENCE {
            let ticks = PulseWidth::from_micros(position.pulse_us())
                .to_ticks(tick_hz)
                .ok_or(ConfigError::TickRateNotExact)?;
            if u32::from(ticks) > self.timer.period {
                return Err(ConfigError::PulseExceedsPeriod {
                    pulse: ticks,
                    period: self.timer.period,
                });
            }
        }

        Ok(())
    }
}

impl Default for ServoSetup {
    fn default() -> Self {
        Self::nucleo_f767zi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_defaults_validate() {
        let setup = ServoSetup::nucleo_f767zi();
        assert_eq!(setup.validate(), Ok(()));
        assert_eq!(setup.timer_clock_hz(), 84_000_000);
        assert_eq!(setup.tick_hz(), 50_000);
        assert_eq!(setup.channel.pulse, 75);
    }

    #[test]
    fn one_mhz_tick_parks_at_1500() {
        let setup = ServoSetup::new(ClockConfig::hsi_84mhz(), TimerConfig::servo_50hz_1mhz());
        assert_eq!(setup.validate(), Ok(()));
        assert_eq!(setup.tick_hz(), 1_000_000);
        assert_eq!(setup.channel.pulse, 1_500);
    }

    #[test]
    fn inexact_prescaler_is_rejected() {
        // 84 MHz / 1001 is not an integer rate
        let timer = TimerConfig {
            prescaler: 1_001,
            ..TimerConfig::servo_50hz()
        };
        let setup = ServoSetup::new(ClockConfig::hsi_84mhz(), timer);
        assert_eq!(setup.validate(), Err(ConfigError::TickRateNotExact));
    }

    #[test]
    fn non_20ms_frame_is_rejected() {
        let timer = TimerConfig {
            period: 500,
            ..TimerConfig::servo_50hz()
        };
        let setup = ServoSetup::new(ClockConfig::hsi_84mhz(), timer);
        assert_eq!(setup.validate(), Err(ConfigError::FrameNotStandard(10_000)));
    }

    #[test]
    fn coarse_tick_cannot_hit_positions() {
        // 3 kHz tick: 20 ms is 60 ticks, but 1.5 ms is 4.5 ticks
        let timer = TimerConfig {
            prescaler: 28_000,
            period: 60,
            ..TimerConfig::servo_50hz()
        };
        let setup = ServoSetup::new(ClockConfig::hsi_84mhz(), timer);
        assert_eq!(setup.tick_hz(), 3_000);
        assert_eq!(setup.validate(), Err(ConfigError::TickRateNotExact));
    }
}

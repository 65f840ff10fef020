// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin multiplexer record and the timer-channel routing table.
//!
//! On the device the routing is also enforced by the pin's type (`PA6<Alternate<2>>`); this record
//! keeps the same facts as data so they can be checked and reported.

use crate::config::timer::Channel;
use crate::error::ConfigError;

/// General-purpose timer instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Timer {
    Tim3,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PinMode {
    Input,
    Output,
    AlternatePushPull,
    AlternateOpenDrain,
    Analog,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Output speed class (OSPEEDR).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Speed {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Single-pin mux configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PinConfig {
    pub port: char,
    pub pin: u8,
    pub mode: PinMode,
    pub pull: Pull,
    pub speed: Speed,
    /// Alternate-function selector (AFRL/AFRH), 0..=15.
    pub alternate: u8,
}

struct Route {
    timer: Timer,
    channel: Channel,
    port: char,
    pin: u8,
    af: u8,
}

const fn route(timer: Timer, channel: Channel, port: char, pin: u8, af: u8) -> Route {
    Route {
        timer,
        channel,
        port,
        pin,
        af,
    }
}

/// TIM3 output pins on the LQFP144 package.
const ROUTES: &[Route] = &[
    route(Timer::Tim3, Channel::C1, 'A', 6, 2),
    route(Timer::Tim3, Channel::C1, 'B', 4, 2),
    route(Timer::Tim3, Channel::C1, 'C', 6, 2),
    route(Timer::Tim3, Channel::C2, 'A', 7, 2),
    route(Timer::Tim3, Channel::C2, 'B', 5, 2),
    route(Timer::Tim3, Channel::C2, 'C', 7, 2),
    route(Timer::Tim3, Channel::C3, 'B', 0, 2),
    route(Timer::Tim3, Channel::C3, 'C', 8, 2),
    route(Timer::Tim3, Channel::C4, 'B', 1, 2),
    route(Timer::Tim3, Channel::C4, 'C', 9, 2),
];

/// Alternate function that routes `timer`/`channel` onto `port`/`pin`, if that pin can carry it.
pub fn alternate_function(timer: Timer, channel: Channel, port: char, pin: u8) -> Option<u8> {
    ROUTES
        .iter()
        .find(|r| r.timer == timer && r.channel == channel && r.port == port && r.pin == pin)
        .map(|r| r.af)
}

impl PinConfig {
    /// PA6 as TIM3_CH1: AF2 push-pull, no pull, low speed.
    pub const fn tim3_ch1_pa6() -> Self {
        Self {
            port: 'A',
            pin: 6,
            mode: PinMode::AlternatePushPull,
            pull: Pull::None,
            speed: Speed::Low,
            alternate: 2,
        }
    }

    /// Check that the pin is muxed to the given timer channel.
    pub fn validate(&self, timer: Timer, channel: Channel) -> Result<(), ConfigError> {
        if !matches!(
            self.mode,
            PinMode::AlternatePushPull | PinMode::AlternateOpenDrain
        ) {
            return Err(ConfigError::NotAlternateFunction);
        }

        let expected =
            alternate_function(timer, channel, self.port, self.pin).ok_or(ConfigError::NoRoute)?;
        if expected != self.alternate {
            return Err(ConfigError::AlternateFunctionMismatch {
                expected,
                found: self.alternate,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pa6_carries_tim3_ch1_on_af2() {
        assert_eq!(
            alternate_function(Timer::Tim3, Channel::C1, 'A', 6),
            Some(2)
        );
        assert_eq!(
            PinConfig::tim3_ch1_pa6().validate(Timer::Tim3, Channel::C1),
            Ok(())
        );
    }

    #[test]
    fn wrong_af_is_rejected() {
        // AF5 on PA6 is SPI1_MISO
        let pin = PinConfig {
            alternate: 5,
            ..PinConfig::tim3_ch1_pa6()
        };
        assert_eq!(
            pin.validate(Timer::Tim3, Channel::C1),
            Err(ConfigError::AlternateFunctionMismatch {
                expected: 2,
                found: 5
            })
        );
    }

    #[test]
    fn pa6_only_carries_channel_1() {
        for channel in [Channel::C2, Channel::C3, Channel::C4] {
            assert_eq!(
                PinConfig::tim3_ch1_pa6().validate(Timer::Tim3, channel),
                Err(ConfigError::NoRoute)
            );
        }
    }

    #[test]
    fn plain_output_is_not_muxed() {
        let pin = PinConfig {
            mode: PinMode::Output,
            ..PinConfig::tim3_ch1_pa6()
        };
        assert_eq!(
            pin.validate(Timer::Tim3, Channel::C1),
            Err(ConfigError::NotAlternateFunction)
        );
    }
}

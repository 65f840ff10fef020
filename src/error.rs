// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types shared by the configuration records and the start-up sequence.
//!
//! Every start-up step returns a [`Result`]; the first failure is reported once and the firmware
//! parks in the fault state (see `fault`). Nothing is retried.

use derive_more::{Display, From};

use crate::config::clock::{PllFactors, VoltageScale};

/// A configuration record failed validation.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum ConfigError {
    /// PLL input (source / M) must be within 1..=2 MHz.
    #[display("PLL input {_0} Hz outside 1-2 MHz")]
    PllInputOutOfRange(u32),

    /// VCO output (input x N) must be within 100..=432 MHz.
    #[display("PLL VCO {_0} Hz outside 100-432 MHz")]
    VcoOutOfRange(u32),

    /// A PLL factor (M, N, P or Q) is outside the values the RCC accepts.
    #[display("invalid PLL factor")]
    InvalidPllFactor,

    /// SYSCLK/HCLK above what the selected regulator scale allows.
    #[display("SYSCLK {_0} Hz too high for voltage scale")]
    SysclkTooHigh(u32),

    #[display("PCLK1 {_0} Hz above 54 MHz")]
    Pclk1TooHigh(u32),

    #[display("PCLK2 {_0} Hz above 108 MHz")]
    Pclk2TooHigh(u32),

    /// AHB/APB divider that the prescaler fields cannot encode.
    #[display("invalid bus divider")]
    InvalidBusDivider,

    #[display("flash latency {configured} WS below required {required} WS")]
    FlashLatencyTooLow { required: u8, configured: u8 },

    #[display("pin is not in alternate-function mode")]
    NotAlternateFunction,

    #[display("pin cannot carry this timer channel")]
    NoRoute,

    #[display("alternate function AF{found} does not route the channel (needs AF{expected})")]
    AlternateFunctionMismatch { expected: u8, found: u8 },

    /// Prescaler divisor must be within 1..=65536.
    #[display("prescaler {_0} out of range")]
    PrescalerOutOfRange(u32),

    /// Period must be within 1..=65536 ticks on a 16-bit counter.
    #[display("period {_0} ticks out of range")]
    PeriodOutOfRange(u32),

    /// Timer clock is not an integer multiple of the requested tick, or a servo position does not
    /// land on a whole tick.
    #[display("tick rate is not exact")]
    TickRateNotExact,

    #[display("frame is {_0} us, expected 20000 us")]
    FrameNotStandard(u32),

    #[display("pulse {pulse} ticks exceeds period {period} ticks")]
    PulseExceedsPeriod { pulse: u16, period: u32 },

    #[display("channel is not in a PWM mode")]
    NotPwmMode,
}

/// Clock domain checked after the RCC has been frozen.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum ClockDomain {
    #[display("SYSCLK")]
    Sysclk,
    #[display("HCLK")]
    Hclk,
    #[display("PCLK1")]
    Pclk1,
    #[display("PCLK2")]
    Pclk2,
    #[display("APB1 timer clock")]
    Apb1Timer,
}

/// Start-up failure.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, From)]
pub enum Error {
    #[from]
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),

    /// A frozen clock differs from the `ClockConfig` derivation.
    #[display("{domain} is {actual_hz} Hz, expected {expected_hz} Hz")]
    ClockMismatch {
        domain: ClockDomain,
        expected_hz: u32,
        actual_hz: u32,
    },

    /// SYSCLK is not running from the PLL fed by the HSI.
    #[display("SYSCLK not sourced from HSI-fed PLL")]
    ClockSource,

    /// RCC_PLLCFGR read back with factors other than the `ClockConfig` ones.
    #[display("PLL is {actual}, expected {expected}")]
    PllMismatch {
        expected: PllFactors,
        actual: PllFactors,
    },

    /// PWR_CR1.VOS read back with a different regulator scale.
    #[display("regulator VOS={actual_vos:#04b}, expected {expected}")]
    VoltageScaleMismatch {
        expected: VoltageScale,
        actual_vos: u8,
    },

    /// Flash latency programmed by the RCC freeze is below what HCLK needs.
    #[display("flash latency {actual} WS, need {required} WS")]
    FlashLatency { required: u8, actual: u8 },

    /// Counter or channel output did not come up after `start()`.
    #[display("PWM output not running")]
    PwmNotRunning,
}

pub type Result<T> = core::result::Result<T, Error>;

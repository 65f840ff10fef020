// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! System clock tree description.
//!
//! `ClockConfig` records how SYSCLK is derived from the oscillator through the main PLL and how
//! the AHB/APB domains are divided from it. `hw::clock` lets the HAL set the bus dividers and flash
//! latency, then writes the PLL factors and regulator scale from this record and reads every field
//! back. The timer prescaler is computed from the same record.
//!
//! ```text
//! HSI 16 MHz -> /M 16 -> 1 MHz -> xN 336 -> VCO 336 MHz -> /P 4 -> SYSCLK 84 MHz
//!                                                       -> /Q 7 -> PLL48  48 MHz
//! SYSCLK -> /1 HCLK 84 MHz -> /2 PCLK1 42 MHz (timers x2 = 84 MHz)
//!                          -> /1 PCLK2 84 MHz
//! ```

use derive_more::Display;

use crate::error::ConfigError;

/// Internal RC oscillator frequency.
pub const HSI_HZ: u32 = 16_000_000;

const VCO_IN_MIN_HZ: u32 = 1_000_000;
const VCO_IN_MAX_HZ: u32 = 2_000_000;
const VCO_OUT_MIN_HZ: u32 = 100_000_000;
const VCO_OUT_MAX_HZ: u32 = 432_000_000;
const PCLK1_MAX_HZ: u32 = 54_000_000;
const PCLK2_MAX_HZ: u32 = 108_000_000;

/// Width of one flash wait-state band at 2.7-3.6 V.
const FLASH_BAND_HZ: u32 = 30_000_000;

/// PLL reference oscillator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Oscillator {
    /// 16 MHz internal RC.
    Hsi,
    /// External crystal/clock with the given frequency.
    Hse(u32),
}

impl Oscillator {
    #[inline]
    pub const fn freq_hz(self) -> u32 {
        match self {
            Oscillator::Hsi => HSI_HZ,
            Oscillator::Hse(hz) => hz,
        }
    }
}

// RCC_PLLCFGR field layout.
const PLLM_MASK: u32 = 0x3f;
const PLLN_SHIFT: u32 = 6;
const PLLN_MASK: u32 = 0x1ff << PLLN_SHIFT;
const PLLP_SHIFT: u32 = 16;
const PLLP_MASK: u32 = 0b11 << PLLP_SHIFT;
const PLLSRC_HSE: u32 = 1 << 22;
const PLLQ_SHIFT: u32 = 24;
const PLLQ_MASK: u32 = 0xf << PLLQ_SHIFT;

/// PLLCFGR bits owned by [`PllFactors`]; everything else (PLLR on the F76x) is left alone.
pub const PLLCFGR_MASK: u32 = PLLM_MASK | PLLN_MASK | PLLP_MASK | PLLSRC_HSE | PLLQ_MASK;

/// PWR_CR1.VOS field.
pub const VOS_SHIFT: u32 = 14;
pub const VOS_MASK: u32 = 0b11 << VOS_SHIFT;

/// Main regulator output scale (PWR_CR1.VOS).
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum VoltageScale {
    #[display("scale 1")]
    Scale1,
    #[display("scale 2")]
    Scale2,
    #[display("scale 3")]
    Scale3,
}

impl VoltageScale {
    /// Highest HCLK the scale supports with over-drive off.
    #[inline]
    pub const fn max_hclk_hz(self) -> u32 {
        match self {
            VoltageScale::Scale1 => 180_000_000,
            VoltageScale::Scale2 => 168_000_000,
            VoltageScale::Scale3 => 144_000_000,
        }
    }

    /// VOS field value, already shifted into place.
    #[inline]
    pub const fn vos_bits(self) -> u32 {
        let vos = match self {
            VoltageScale::Scale1 => 0b11,
            VoltageScale::Scale2 => 0b10,
            VoltageScale::Scale3 => 0b01,
        };
        vos << VOS_SHIFT
    }

    /// Decode PWR_CR1. `None` for the reserved VOS value 0b00.
    pub fn from_cr1(cr1: u32) -> Option<Self> {
        match (cr1 & VOS_MASK) >> VOS_SHIFT {
            0b11 => Some(VoltageScale::Scale1),
            0b10 => Some(VoltageScale::Scale2),
            0b01 => Some(VoltageScale::Scale3),
            _ => None,
        }
    }
}

/// Main PLL factors as programmed in RCC_PLLCFGR.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
#[display("M={m} N={n} P={p} Q={q}")]
pub struct PllFactors {
    pub m: u8,
    pub n: u16,
    pub p: u8,
    pub q: u8,
    pub hse: bool,
}

impl PllFactors {
    /// PLLCFGR value for these factors, restricted to [`PLLCFGR_MASK`].
    pub fn pllcfgr_bits(&self) -> u32 {
        let mut bits = u32::from(self.m) & PLLM_MASK;
        bits |= (u32::from(self.n) << PLLN_SHIFT) & PLLN_MASK;
        // P is encoded as P/2 - 1
        bits |= ((u32::from(self.p / 2).saturating_sub(1)) << PLLP_SHIFT) & PLLP_MASK;
        bits |= (u32::from(self.q) << PLLQ_SHIFT) & PLLQ_MASK;
        if self.hse {
            bits |= PLLSRC_HSE;
        }
        bits
    }

    /// Decode a PLLCFGR value read back from the RCC.
    pub fn from_pllcfgr(bits: u32) -> Self {
        Self {
            m: (bits & PLLM_MASK) as u8,
            n: ((bits & PLLN_MASK) >> PLLN_SHIFT) as u16,
            p: ((((bits & PLLP_MASK) >> PLLP_SHIFT) + 1) * 2) as u8,
            q: ((bits & PLLQ_MASK) >> PLLQ_SHIFT) as u8,
            hse: bits & PLLSRC_HSE != 0,
        }
    }
}

/// Write-once clock tree configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClockConfig {
    pub source: Oscillator,
    /// PLLM, 2..=63
    pub pll_m: u8,
    /// PLLN, 50..=432
    pub pll_n: u16,
    /// PLLP, one of 2, 4, 6, 8
    pub pll_p: u8,
    /// PLLQ, 2..=15
    pub pll_q: u8,
    /// AHB prescaler: 1, 2, 4, 8, 16, 64, 128, 256, 512
    pub ahb_div: u16,
    /// APB1 prescaler: 1, 2, 4, 8, 16
    pub apb1_div: u8,
    /// APB2 prescaler: 1, 2, 4, 8, 16
    pub apb2_div: u8,
    pub flash_wait_states: u8,
    pub voltage_scale: VoltageScale,
}

impl ClockConfig {
    /// 84 MHz from the HSI; APB1 at half speed, everything else undivided.
    pub const fn hsi_84mhz() -> Self {
        Self {
            source: Oscillator::Hsi,
            pll_m: 16,
            pll_n: 336,
            pll_p: 4,
            pll_q: 7,
            ahb_div: 1,
            apb1_div: 2,
            apb2_div: 1,
            flash_wait_states: 2,
            voltage_scale: VoltageScale::Scale1,
        }
    }

    /// PLL factors this record asks the RCC for.
    #[inline]
    pub fn pll_factors(&self) -> PllFactors {
        PllFactors {
            m: self.pll_m,
            n: self.pll_n,
            p: self.pll_p,
            q: self.pll_q,
            hse: matches!(self.source, Oscillator::Hse(_)),
        }
    }

    #[inline]
    pub fn vco_in_hz(&self) -> u32 {
        self.source
            .freq_hz()
            .checked_div(u32::from(self.pll_m))
            .unwrap_or(0)
    }

    #[inline]
    pub fn vco_out_hz(&self) -> u32 {
        self.vco_in_hz().saturating_mul(u32::from(self.pll_n))
    }

    #[inline]
    pub fn sysclk_hz(&self) -> u32 {
        self.vco_out_hz()
            .checked_div(u32::from(self.pll_p))
            .unwrap_or(0)
    }

    /// 48 MHz domain (USB/SDMMC/RNG) from the Q output.
    #[inline]
    pub fn pll48_hz(&self) -> u32 {
        self.vco_out_hz()
            .checked_div(u32::from(self.pll_q))
            .unwrap_or(0)
    }

    #[inline]
    pub fn hclk_hz(&self) -> u32 {
        self.sysclk_hz()
            .checked_div(u32::from(self.ahb_div))
            .unwrap_or(0)
    }

    #[inline]
    pub fn pclk1_hz(&self) -> u32 {
        self.hclk_hz()
            .checked_div(u32::from(self.apb1_div))
            .unwrap_or(0)
    }

    #[inline]
    pub fn pclk2_hz(&self) -> u32 {
        self.hclk_hz()
            .checked_div(u32::from(self.apb2_div))
            .unwrap_or(0)
    }

    /// Clock fed to TIM2..TIM7 and TIM12..TIM14 (TIM3 lives here).
    #[inline]
    pub fn apb1_timer_hz(&self) -> u32 {
        timer_clock(self.pclk1_hz(), self.apb1_div)
    }

    /// Clock fed to TIM1, TIM8..TIM11.
    #[inline]
    pub fn apb2_timer_hz(&self) -> u32 {
        timer_clock(self.pclk2_hz(), self.apb2_div)
    }

    /// Check every factor against the RCC encoding and the derived frequencies against the
    /// datasheet limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=63).contains(&self.pll_m)
            || !(50..=432).contains(&self.pll_n)
            || !matches!(self.pll_p, 2 | 4 | 6 | 8)
            || !(2..=15).contains(&self.pll_q)
        {
            return Err(ConfigError::InvalidPllFactor);
        }

        if !matches!(self.ahb_div, 1 | 2 | 4 | 8 | 16 | 64 | 128 | 256 | 512)
            || !matches!(self.apb1_div, 1 | 2 | 4 | 8 | 16)
            || !matches!(self.apb2_div, 1 | 2 | 4 | 8 | 16)
        {
            return Err(ConfigError::InvalidBusDivider);
        }

        let vco_in = self.vco_in_hz();
        if !(VCO_IN_MIN_HZ..=VCO_IN_MAX_HZ).contains(&vco_in) {
            return Err(ConfigError::PllInputOutOfRange(vco_in));
        }

        let vco_out = self.vco_out_hz();
        if !(VCO_OUT_MIN_HZ..=VCO_OUT_MAX_HZ).contains(&vco_out) {
            return Err(ConfigError::VcoOutOfRange(vco_out));
        }

        let hclk = self.hclk_hz();
        if hclk > self.voltage_scale.max_hclk_hz() {
            return Err(ConfigError::SysclkTooHigh(self.sysclk_hz()));
        }

        let pclk1 = self.pclk1_hz();
        if pclk1 > PCLK1_MAX_HZ {
            return Err(ConfigError::Pclk1TooHigh(pclk1));
        }

        let pclk2 = self.pclk2_hz();
        if pclk2 > PCLK2_MAX_HZ {
            return Err(ConfigError::Pclk2TooHigh(pclk2));
        }

        let required = required_wait_states(hclk);
        if self.flash_wait_states < required {
            return Err(ConfigError::FlashLatencyTooLow {
                required,
                configured: self.flash_wait_states,
            });
        }

        Ok(())
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::hsi_84mhz()
    }
}

/// Minimum flash wait states for `hclk_hz` at 2.7-3.6 V: one per started 30 MHz band.
#[inline]
pub fn required_wait_states(hclk_hz: u32) -> u8 {
    (hclk_hz.saturating_sub(1) / FLASH_BAND_HZ) as u8
}

/// Timers run at twice the bus clock whenever the APB prescaler divides.
#[inline]
fn timer_clock(pclk_hz: u32, apb_div: u8) -> u32 {
    if apb_div == 1 {
        pclk_hz
    } else {
        pclk_hz.saturating_mul(2)
    }
}

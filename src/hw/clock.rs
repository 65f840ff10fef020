// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! RCC bring-up and post-freeze verification.
//!
//! The HAL sets the bus dividers and flash latency while freezing, but chooses its own PLL factors
//! and regulator scale. [`freeze`] therefore reprograms the PLL with the factors from
//! [`ClockConfig`] (same SYSCLK, so the HAL's [`Clocks`] stays valid) and [`verify`] reads the
//! whole tree back from RCC, PWR and FLASH.

use core::fmt::Write;

use stm32f7xx_hal::{
    pac,
    prelude::*,
    rcc::{Clocks, CFGR},
    serial::Instance,
};

use crate::config::{
    clock::{
        required_wait_states, PllFactors, VoltageScale, PLLCFGR_MASK, VOS_MASK, VOS_SHIFT,
    },
    ClockConfig,
};
use crate::error::{ClockDomain, Error, Result};
use crate::hw::Usart;

// RCC_CFGR SW/SWS values.
const SW_MASK: u32 = 0b11;
const SW_HSI: u32 = 0b00;
const SW_PLL: u32 = 0b10;
const SWS_SHIFT: u32 = 2;

/// PWR_CSR1.VOSRDY
const VOSRDY: u32 = 1 << 14;

/// Switch SYSCLK to the HSI-fed PLL with the factors and regulator scale of `config`, and set the
/// bus dividers it describes.
///
/// Must run before any other peripheral is configured.
pub fn freeze(cfgr: CFGR, config: &ClockConfig) -> Clocks {
    let clocks = cfgr
        .use_pll()
        .sysclk(config.sysclk_hz().Hz())
        .hclk(config.hclk_hz().Hz())
        .pclk1(config.pclk1_hz().Hz())
        .pclk2(config.pclk2_hz().Hz())
        .freeze();
    apply_pll(config);
    clocks
}

/// Rewrite PLLCFGR and PWR_CR1.VOS from `config`.
///
/// SYSCLK runs from the HSI while the PLL is off; the flash latency set by the HAL covers both.
fn apply_pll(config: &ClockConfig) {
    // SAFETY: runs once, right after the HAL released the RCC and before any other peripheral
    // is brought up.
    let rcc = unsafe { &*pac::RCC::ptr() };
    let pwr = unsafe { &*pac::PWR::ptr() };

    switch_sysclk(rcc, SW_HSI);

    rcc.cr.modify(|_, w| w.pllon().clear_bit());
    while rcc.cr.read().pllrdy().bit_is_set() {}

    // VOS only takes writes while the PLL is off
    rcc.apb1enr.modify(|_, w| w.pwren().set_bit());
    let vos = config.voltage_scale.vos_bits();
    pwr.cr1
        .modify(|r, w| unsafe { w.bits((r.bits() & !VOS_MASK) | vos) });

    let pll = config.pll_factors().pllcfgr_bits();
    rcc.pllcfgr
        .modify(|r, w| unsafe { w.bits((r.bits() & !PLLCFGR_MASK) | pll) });

    rcc.cr.modify(|_, w| w.pllon().set_bit());
    while rcc.cr.read().pllrdy().bit_is_clear() {}
    while pwr.csr1.read().bits() & VOSRDY == 0 {}

    switch_sysclk(rcc, SW_PLL);
}

fn switch_sysclk(rcc: &pac::rcc::RegisterBlock, sw: u32) {
    rcc.cfgr
        .modify(|r, w| unsafe { w.bits((r.bits() & !SW_MASK) | sw) });
    while (rcc.cfgr.read().bits() >> SWS_SHIFT) & SW_MASK != sw {}
}

/// Check the frozen clocks against `config`.
pub fn verify(clocks: &Clocks, config: &ClockConfig) -> Result<()> {
    check(ClockDomain::Sysclk, config.sysclk_hz(), clocks.sysclk().raw())?;
    check(ClockDomain::Hclk, config.hclk_hz(), clocks.hclk().raw())?;
    check(ClockDomain::Pclk1, config.pclk1_hz(), clocks.pclk1().raw())?;
    check(ClockDomain::Pclk2, config.pclk2_hz(), clocks.pclk2().raw())?;
    check(
        ClockDomain::Apb1Timer,
        config.apb1_timer_hz(),
        clocks.timclk1().raw(),
    )?;

    // SAFETY: read-only access after the RCC/PWR/FLASH configuration is done.
    let rcc = unsafe { &*pac::RCC::ptr() };
    let pwr = unsafe { &*pac::PWR::ptr() };
    let flash = unsafe { &*pac::FLASH::ptr() };

    let actual = PllFactors::from_pllcfgr(rcc.pllcfgr.read().bits());
    let sysclk_from_pll = (rcc.cfgr.read().bits() >> SWS_SHIFT) & SW_MASK == SW_PLL;
    if actual.hse || !sysclk_from_pll {
        return Err(Error::ClockSource);
    }
    let expected = config.pll_factors();
    if actual != expected {
        return Err(Error::PllMismatch { expected, actual });
    }

    let cr1 = pwr.cr1.read().bits();
    if VoltageScale::from_cr1(cr1) != Some(config.voltage_scale) {
        return Err(Error::VoltageScaleMismatch {
            expected: config.voltage_scale,
            actual_vos: ((cr1 & VOS_MASK) >> VOS_SHIFT) as u8,
        });
    }

    let required = required_wait_states(config.hclk_hz());
    let actual = flash.acr.read().latency().bits();
    if actual < required {
        return Err(Error::FlashLatency { required, actual });
    }

    Ok(())
}

#[inline]
fn check(domain: ClockDomain, expected_hz: u32, actual_hz: u32) -> Result<()> {
    if expected_hz == actual_hz {
        Ok(())
    } else {
        Err(Error::ClockMismatch {
            domain,
            expected_hz,
            actual_hz,
        })
    }
}

/// Print the frozen clock tree to the debug terminal.
pub fn report<U: Instance>(usart: &mut Usart<U>, clocks: &Clocks) {
    let _ = writeln!(
        usart,
        "clocks: SYSCLK {} Hz, HCLK {} Hz, PCLK1 {} Hz, PCLK2 {} Hz, TIMCLK1 {} Hz\r",
        clocks.sysclk().raw(),
        clocks.hclk().raw(),
        clocks.pclk1().raw(),
        clocks.pclk2().raw(),
        clocks.timclk1().raw(),
    );
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Edge-aligned PWM on TIM3 for a hobby servo.
//!
//! TIM3 is programmed directly through the PAC so the prescaler, period and output-compare mode
//! are exactly what [`TimerConfig`]/[`ChannelConfig`] describe. The servo pin is owned by the
//! driver and its type pins the routing: only `PA6<Alternate<2>>` (TIM3_CH1) is accepted.
//!
//! Compare registers are preloaded, so a new pulse width takes effect at the next update event
//! (start of the next frame). Requests above the period are clamped to the period, which keeps the
//! output high for the whole frame.

use stm32f7xx_hal::{
    gpio::{gpioa, Alternate},
    pac,
};

use crate::config::{Channel, ChannelConfig, PinConfig, Timer, TimerConfig};
use crate::config::timer::{CountDirection, Polarity};
use crate::control::PulseOutput;
use crate::error::ConfigError;

/// TIM3_CH1 servo pin.
pub type ServoPin = gpioa::PA6<Alternate<2>>;

// CCMRx output-compare field layout, per channel within the register.
const OCM_SHIFT: u32 = 4;
const OCM_MASK: u32 = 0b111 << OCM_SHIFT;
const OCPE: u32 = 1 << 3;
const OCFE: u32 = 1 << 2;
const CCS_MASK: u32 = 0b11;
/// Second channel of a CCMR register sits 8 bits higher.
const CCMR_HALF: u32 = 8;

// CCER: four bits per channel.
const CCE: u32 = 1 << 0;
const CCP: u32 = 1 << 1;

pub struct Tim3Pwm {
    tim: pac::TIM3,
    _pin: ServoPin,
    timer: TimerConfig,
    channel: Channel,
}

impl Tim3Pwm {
    /// Enable and reset TIM3, program the time base and configure the servo channel.
    ///
    /// The counter is left stopped and the channel output disabled; call
    /// [`enable_output`](Self::enable_output) and [`start`](Self::start).
    pub fn new(
        tim3: pac::TIM3,
        pin: ServoPin,
        timer: &TimerConfig,
        channel: &ChannelConfig,
    ) -> Result<Self, ConfigError> {
        // The pin type is PA6 AF2, which only carries TIM3_CH1
        PinConfig::tim3_ch1_pa6().validate(Timer::Tim3, channel.channel)?;
        timer.validate()?;
        channel.validate(timer)?;

        // SAFETY: single-bit RMW on TIM3's own enable/reset bits, nothing else touches them.
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());
        rcc.apb1rstr.modify(|_, w| w.tim3rst().set_bit());
        rcc.apb1rstr.modify(|_, w| w.tim3rst().clear_bit());

        let tim = tim3;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Edge-aligned, auto-reload preloaded, direction and clock division
        tim.cr1.modify(|_, w| {
            let w = match timer.direction {
                CountDirection::Up => w.dir().clear_bit(),
                CountDirection::Down => w.dir().set_bit(),
            };
            unsafe { w.cms().bits(0b00).ckd().bits(timer.clock_division.bits()) }
                .arpe()
                .set_bit()
        });

        tim.psc.write(|w| unsafe { w.bits(u32::from(timer.psc_bits())) });
        tim.arr.write(|w| unsafe { w.bits(u32::from(timer.arr_bits())) });

        let mut pwm = Self {
            tim,
            _pin: pin,
            timer: *timer,
            channel: channel.channel,
        };
        pwm.configure_channel(channel);

        // Latch PSC/ARR/CCR from their preload registers, then drop the update flag it raised
        pwm.tim.egr.write(|w| w.ug().set_bit());
        pwm.tim.sr.modify(|_, w| w.uif().clear_bit());
        pwm.tim.cnt.write(|w| unsafe { w.bits(0) });

        Ok(pwm)
    }

    fn configure_channel(&mut self, cfg: &ChannelConfig) {
        let (shift, low_half) = match cfg.channel {
            Channel::C1 => (0, true),
            Channel::C2 => (CCMR_HALF, true),
            Channel::C3 => (0, false),
            Channel::C4 => (CCMR_HALF, false),
        };

        let mask = (OCM_MASK | OCPE | OCFE | CCS_MASK) << shift;
        let mut value = (cfg.mode.bits() << OCM_SHIFT) | OCPE;
        if cfg.fast_mode {
            value |= OCFE;
        }
        let value = value << shift;

        // CCxS = 00 keeps the channel an output
        if low_half {
            self.tim
                .ccmr1_output()
                .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | value) });
        } else {
            self.tim
                .ccmr2_output()
                .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | value) });
        }

        let ccer_shift = 4 * u32::from(cfg.channel.index());
        let polarity = match cfg.polarity {
            Polarity::ActiveHigh => 0,
            Polarity::ActiveLow => CCP,
        };
        self.tim.ccer.modify(|r, w| unsafe {
            w.bits((r.bits() & !((CCE | CCP) << ccer_shift)) | (polarity << ccer_shift))
        });

        self.write_compare(cfg.channel, u32::from(cfg.pulse));
    }

    #[inline]
    fn write_compare(&mut self, channel: Channel, ticks: u32) {
        let ticks = self.timer.clamp_pulse(ticks);
        match channel {
            Channel::C1 => self.tim.ccr1.write(|w| unsafe { w.bits(ticks) }),
            Channel::C2 => self.tim.ccr2.write(|w| unsafe { w.bits(ticks) }),
            Channel::C3 => self.tim.ccr3.write(|w| unsafe { w.bits(ticks) }),
            Channel::C4 => self.tim.ccr4.write(|w| unsafe { w.bits(ticks) }),
        }
    }

    /// Start the counter. PWM appears on the pin once the channel output is enabled.
    #[inline]
    pub fn start(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    /// Stop the counter; the output holds its current level.
    #[inline]
    pub fn stop(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
    }

    /// Set the pulse width of `channel` in timer ticks, clamped to `[0, period]`.
    #[inline]
    pub fn set_pulse_width(&mut self, channel: Channel, ticks: u16) {
        self.write_compare(channel, u32::from(ticks));
    }

    /// Last compare value written to `channel`.
    pub fn pulse_width(&self, channel: Channel) -> u16 {
        let bits = match channel {
            Channel::C1 => self.tim.ccr1.read().bits(),
            Channel::C2 => self.tim.ccr2.read().bits(),
            Channel::C3 => self.tim.ccr3.read().bits(),
            Channel::C4 => self.tim.ccr4.read().bits(),
        };
        bits as u16
    }

    /// Drive `channel`'s compare output onto its pin.
    #[inline]
    pub fn enable_output(&mut self, channel: Channel) {
        let bit = CCE << (4 * u32::from(channel.index()));
        self.tim
            .ccer
            .modify(|r, w| unsafe { w.bits(r.bits() | bit) });
    }

    /// Stop driving `channel`'s compare output onto its pin.
    #[inline]
    pub fn disable_output(&mut self, channel: Channel) {
        let bit = CCE << (4 * u32::from(channel.index()));
        self.tim
            .ccer
            .modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
    }

    /// Counter running and the servo channel driving its pin.
    pub fn is_running(&self) -> bool {
        let bit = CCE << (4 * u32::from(self.channel.index()));
        self.tim.cr1.read().cen().bit_is_set() && (self.tim.ccer.read().bits() & bit) != 0
    }

    /// Channel wired to the servo pin.
    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Ticks per frame.
    #[inline]
    pub fn period(&self) -> u32 {
        self.timer.period
    }
}

impl PulseOutput for Tim3Pwm {
    #[inline]
    fn set_pulse_ticks(&mut self, ticks: u16) {
        self.set_pulse_width(self.channel, ticks);
    }
}

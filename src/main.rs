// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::fmt::Write;

use cortex_m::{delay::Delay, peripheral::DWT};
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use servo_cycle::{
    config::ServoSetup,
    control::Sweep,
    error::Error,
    fault,
    hw::{clock, BoardPins, Led, Tim3Pwm, Usart},
};

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let mut cp = cortex_m::Peripherals::take().unwrap();

    let setup = ServoSetup::nucleo_f767zi();
    let checked = setup.validate();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = clock::freeze(rcc.cfgr, &setup.clock);

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
    let mut led_green = Led::active_high(pins.leds.green);
    let mut led_red = Led::active_high(pins.leds.red);

    // USART3 (ST-LINK VCP)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        usart_cfg,
    );
    let mut usart = Usart::new(serial);

    usart.println("servo_cycle: boot");
    clock::report(&mut usart, &clocks);

    if let Err(e) = checked
        .map_err(Error::from)
        .and_then(|()| clock::verify(&clocks, &setup.clock))
    {
        fault::halt(&mut usart, &mut led_red, None, e);
    }

    // TIM3 PWM on PA6
    let mut pwm = match Tim3Pwm::new(dp.TIM3, pins.servo, &setup.timer, &setup.channel) {
        Ok(pwm) => pwm,
        Err(e) => fault::halt(&mut usart, &mut led_red, None, e.into()),
    };
    let _ = writeln!(
        usart,
        "tim3: {} Hz tick, {} ticks/frame, parked at {} ticks\r",
        setup.tick_hz(),
        pwm.period(),
        pwm.pulse_width(pwm.channel()),
    );

    pwm.enable_output(setup.channel.channel);
    pwm.start();
    if !pwm.is_running() {
        fault::halt(&mut usart, &mut led_red, Some(&mut pwm), Error::PwmNotRunning);
    }
    led_green.on();
    usart.println("pwm: running");

    // SysTick delay from cortex-m, needs core clock in Hz (u32)
    let mut delay = Delay::new(cp.SYST, clocks.sysclk().raw());

    // Cycle counter to take the log time out of each hold
    cp.DCB.enable_trace();
    cp.DWT.enable_cycle_counter();
    let cycles_per_us = clocks.sysclk().raw() / 1_000_000;

    let tick_hz = setup.tick_hz();
    let mut sweep = Sweep::new(tick_hz);

    sweep.run(&mut pwm, |hold| {
        let start = DWT::cycle_count();
        usart.log_position(hold.position, hold.ticks, tick_hz);
        let spent_us = DWT::cycle_count().wrapping_sub(start) / cycles_per_us;
        delay.delay_us(hold.remaining_us(spent_us));
    })
}

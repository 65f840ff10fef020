// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side checks of the servo timing: configuration arithmetic, the compare sequence the sweep
//! writes, and the waveform an edge-aligned PWM1 channel would produce from it.

use std::cell::Cell;

use servo_cycle::config::clock::PllFactors;
use servo_cycle::config::{ClockConfig, ServoSetup, TimerConfig, SERVO_FRAME_US};
use servo_cycle::control::{Hold, Position, PulseOutput, PulseWidth, Sweep, HOLD_MS};
use servo_cycle::error::ConfigError;

/// Software model of a TIM3 channel: compare preload latched at each update event, clamped like
/// the hardware path, and a millisecond clock advanced by the sweep's hold callback.
struct SimTimer {
    timer: TimerConfig,
    compare: u32,
    now_ms: u32,
    /// (time written, compare latched)
    log: Vec<(u32, u32)>,
}

impl SimTimer {
    fn new(timer: TimerConfig, initial: u16) -> Self {
        Self {
            timer,
            compare: timer.clamp_pulse(u32::from(initial)),
            now_ms: 0,
            log: Vec::new(),
        }
    }

    /// High time in microseconds of one frame at `tick_hz`.
    fn high_us(&self, tick_hz: u32) -> u32 {
        PulseWidth::from_ticks(self.timer.high_ticks(self.compare), tick_hz).as_micros()
    }
}

impl PulseOutput for SimTimer {
    fn set_pulse_ticks(&mut self, ticks: u16) {
        self.compare = self.timer.clamp_pulse(u32::from(ticks));
        self.log.push((self.now_ms, self.compare));
    }
}

fn run(sweep: &mut Sweep, sim: &mut SimTimer, steps: usize) {
    for _ in 0..steps {
        // The hold callback only advances the simulated clock.
        let mut held = 0u32;
        sweep.step(sim, |hold| held += hold.ms);
        sim.now_ms += held;
    }
}

#[test]
fn board_setup_is_valid_and_50hz() {
    let setup = ServoSetup::nucleo_f767zi();
    assert_eq!(setup.validate(), Ok(()));

    let timclk = setup.timer_clock_hz();
    assert_eq!(timclk, 84_000_000);
    assert_eq!(setup.timer.frame_hz(timclk), 50);
    assert_eq!(setup.timer.frame_us(timclk), SERVO_FRAME_US);
    assert_eq!(setup.channel.pulse, 75);
}

#[test]
fn compare_values_match_documented_pulse_widths() {
    let setup = ServoSetup::nucleo_f767zi();
    let tick = setup.tick_hz();
    let sweep = Sweep::new(tick);

    for (position, ticks, us) in [
        (Position::Min, 50u16, 1_000),
        (Position::Center, 75, 1_500),
        (Position::Max, 100, 2_000),
    ] {
        assert_eq!(sweep.ticks(position), ticks);
        assert_eq!(PulseWidth::from_ticks(u32::from(ticks), tick).as_micros(), us);
        assert!(PulseWidth::from_micros(us).is_servo_safe());
    }
}

#[test]
fn sequence_is_strictly_cyclic_with_one_second_holds() {
    let setup = ServoSetup::nucleo_f767zi();
    let mut sweep = Sweep::new(setup.tick_hz());
    let mut sim = SimTimer::new(setup.timer, setup.channel.pulse);

    run(&mut sweep, &mut sim, 12);

    let written: Vec<u32> = sim.log.iter().map(|&(_, c)| c).collect();
    assert_eq!(written, [50u32, 75, 100].repeat(4));

    for pair in sim.log.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        assert_eq!(t1 - t0, HOLD_MS);
        assert_ne!(c0, c1, "a position was repeated back to back");
    }
    assert_eq!(sim.log[0].0, 0);
    assert_eq!(sim.now_ms, 12 * HOLD_MS);
}

#[test]
fn logging_inside_the_hold_does_not_stretch_the_period() {
    struct Stamp<'a> {
        now_us: &'a Cell<u32>,
        writes: Vec<u32>,
    }

    impl PulseOutput for Stamp<'_> {
        fn set_pulse_ticks(&mut self, _ticks: u16) {
            self.writes.push(self.now_us.get());
        }
    }

    let now_us = Cell::new(0u32);
    let mut out = Stamp {
        now_us: &now_us,
        writes: Vec::new(),
    };
    let mut sweep = Sweep::new(ServoSetup::nucleo_f767zi().tick_hz());

    for _ in 0..6 {
        sweep.step(&mut out, |hold: Hold| {
            // one log line at 115200 bps
            let spent_us = 2_170;
            now_us.set(now_us.get() + spent_us);
            now_us.set(now_us.get() + hold.remaining_us(spent_us));
        });
    }

    for pair in out.writes.windows(2) {
        assert_eq!(pair[1] - pair[0], HOLD_MS * 1_000);
    }
    assert_eq!(now_us.get(), 6 * HOLD_MS * 1_000);
}

#[test]
fn one_mhz_scenario_gives_1500_us_at_7_5_percent() {
    // 84 MHz timer clock, prescaler 84, period 20000
    let clock = ClockConfig::hsi_84mhz();
    let timer = TimerConfig::servo_50hz_1mhz();
    let timclk = clock.apb1_timer_hz();
    assert_eq!(timer.tick_hz(timclk), 1_000_000);
    assert_eq!(timer.frame_hz(timclk), 50);

    let setup = ServoSetup::new(clock, timer);
    assert_eq!(setup.validate(), Ok(()));

    let sweep = Sweep::new(setup.tick_hz());
    let center = sweep.ticks(Position::Center);
    assert_eq!(center, 1_500);

    let sim = SimTimer::new(timer, center);
    assert_eq!(sim.high_us(1_000_000), 1_500);
    assert_eq!(timer.duty_bp(u32::from(center)), 750);
}

#[test]
fn default_center_is_7_5_percent_duty() {
    let setup = ServoSetup::nucleo_f767zi();
    assert_eq!(setup.timer.duty_bp(75), 750);
    assert_eq!(
        Position::Center.pulse().duty_bp(SERVO_FRAME_US),
        setup.timer.duty_bp(75)
    );
}

#[test]
fn boundary_compares_are_flat_low_and_flat_high() {
    let setup = ServoSetup::nucleo_f767zi();
    let mut sim = SimTimer::new(setup.timer, 0);
    assert_eq!(sim.high_us(setup.tick_hz()), 0);
    assert_eq!(setup.timer.duty_bp(0), 0);

    sim.set_pulse_ticks(u16::MAX);
    assert_eq!(sim.compare, setup.timer.period);
    assert_eq!(sim.high_us(setup.tick_hz()), SERVO_FRAME_US);
    assert_eq!(setup.timer.duty_bp(sim.compare), 10_000);

    sim.set_pulse_ticks(1_000);
    assert_eq!(sim.compare, 1_000);
    assert_eq!(setup.timer.duty_bp(sim.compare), 10_000);
}

#[test]
fn misrouted_pin_fails_validation() {
    let mut setup = ServoSetup::nucleo_f767zi();
    setup.pin.alternate = 1;
    assert_eq!(
        setup.validate(),
        Err(ConfigError::AlternateFunctionMismatch {
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn error_messages_are_readable() {
    use servo_cycle::error::{ClockDomain, Error};

    let err = Error::ClockMismatch {
        domain: ClockDomain::Sysclk,
        expected_hz: 84_000_000,
        actual_hz: 16_000_000,
    };
    assert_eq!(
        err.to_string(),
        "SYSCLK is 16000000 Hz, expected 84000000 Hz"
    );

    let err: Error = ConfigError::FrameNotStandard(10_000).into();
    assert_eq!(
        err.to_string(),
        "invalid configuration: frame is 10000 us, expected 20000 us"
    );
}

#[test]
fn pll_readback_differs_from_record() {
    use servo_cycle::error::Error;

    // 84 MHz as well, but from N=168 / P=2
    let expected = ClockConfig::hsi_84mhz().pll_factors();
    let actual = PllFactors::from_pllcfgr(16 | (168 << 6) | (7 << 24));
    assert_ne!(actual, expected);

    let err = Error::PllMismatch { expected, actual };
    assert_eq!(
        err.to_string(),
        "PLL is M=16 N=168 P=2 Q=7, expected M=16 N=336 P=4 Q=7"
    );
}

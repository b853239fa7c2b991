//! The Timer0 smoke test.
//!
//! The sequence first runs the timer with the prescaler bypassed, arming it
//! once per [`TimerDriver::delay_ms`] call and letting it auto-reload every
//! millisecond. It then switches to a divide-by-50 prescaler with a
//! one-second period and arms/disarms the timer around every single period.
//! Progress goes to a line-oriented console.
use core::fmt::Write;

use crate::{cfg::TimerCfg, driver::TimerDriver, regs::RegisterBank, spin::SpinWait};

/// Parameters of [`run`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SmokeOptions {
    /// The number of delays performed in each mode.
    pub iterations: u32,
    /// The argument passed to [`TimerDriver::delay_ms`] in the first mode.
    pub delay_ms: u32,
    /// The configuration of the second mode.
    pub div_cfg: TimerCfg,
}

impl SmokeOptions {
    /// Ten one-second delays in each mode.
    pub const DEFAULT: Self = Self {
        iterations: 10,
        delay_ms: 1000,
        div_cfg: TimerCfg::SECOND_DIV50,
    };
}

impl Default for SmokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The outcome of [`run`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
}

impl ExitStatus {
    /// Get the process exit code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
        }
    }
}

/// Run the smoke test. Only returns once every delay has elapsed; a timer
/// that never expires hangs it.
///
/// Console errors are ignored.
pub fn run<B, S>(
    timer: &mut TimerDriver<B, S>,
    console: &mut impl Write,
    opts: &SmokeOptions,
) -> ExitStatus
where
    B: RegisterBank,
    S: SpinWait,
{
    let _ = writeln!(console, "timer test");
    timer.init();
    let _ = writeln!(console, "{}", timer.dump());

    let _ = writeln!(console, "no div test start");
    for _ in 0..opts.iterations {
        timer.delay_ms(opts.delay_ms);
        let _ = writeln!(console, "delay 1s");
    }
    let _ = writeln!(console, "no div test done");

    let _ = writeln!(console, "div test start");
    timer.configure(&opts.div_cfg);
    let _ = writeln!(console, "{}", timer.dump());

    for _ in 0..opts.iterations {
        timer.wait_period();
        let _ = writeln!(console, "delay 1s");
    }
    let _ = writeln!(console, "{}", timer.dump());
    let _ = writeln!(console, "test done");

    log::info!("smoke test finished");

    ExitStatus::Success
}

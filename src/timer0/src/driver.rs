use core::fmt;

use crate::{
    cfg::TimerCfg,
    regs::{Ctrl, Reg, RegisterBank},
    spin::{BusyWait, SpinWait},
};

/// A polling driver for one Timer0 instance.
///
/// The driver owns the register bank. Every operation leaves `CTRL` at
/// [`Ctrl::DISABLED`] on return, and `PSCR`/`CMP` are only written while the
/// timer is stopped.
pub struct TimerDriver<B, S = BusyWait> {
    bank: B,
    spin: S,
}

/// A snapshot of the registers that can be read without side effects.
///
/// `STAT` is excluded because reading it may acknowledge a pending expiry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterDump {
    pub ctrl: u32,
    pub pscr: u32,
    pub cnt: u32,
    pub cmp: u32,
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CTRL: {} PSCR: {} CMP: {}", self.ctrl, self.pscr, self.cmp)
    }
}

impl<B: RegisterBank> TimerDriver<B> {
    /// Construct a `TimerDriver` that spins on the CPU while waiting.
    pub fn new(bank: B) -> Self {
        Self::with_spin(bank, BusyWait)
    }
}

impl<B: RegisterBank, S: SpinWait> TimerDriver<B, S> {
    /// Construct a `TimerDriver` with a custom spin-wait strategy.
    pub fn with_spin(bank: B, spin: S) -> Self {
        Self { bank, spin }
    }

    /// Stop the timer, wait out any pending expiry, and load the 1-ms
    /// reload value. `PSCR` keeps whatever value it has (the reset value
    /// bypasses the prescaler).
    ///
    /// The resulting registers are only logged here. Callers that want them
    /// on a console print [`Self::dump`] themselves, as [`crate::smoke::run`]
    /// does.
    pub fn init(&mut self) {
        self.disable();
        self.bank.write(Reg::Cmp, TimerCfg::MILLISECOND.cmp());
        log::debug!("init: {}", self.dump());
    }

    /// Stop the timer and wait until `STAT` reads zero.
    pub fn disable(&mut self) {
        self.bank.write(Reg::Ctrl, Ctrl::DISABLED);
        let bank = &self.bank;
        self.spin.spin_until(|| bank.read(Reg::Stat) == 0);
    }

    /// Stop the timer and program `PSCR` and `CMP` from `cfg`.
    pub fn configure(&mut self, cfg: &TimerCfg) {
        self.disable();
        self.bank.write(Reg::Pscr, cfg.pscr());
        self.bank.write(Reg::Cmp, cfg.cmp());
        log::debug!("configure: {}", self.dump());
    }

    /// Busy-wait for `ms` timer periods (milliseconds after [`Self::init`]).
    ///
    /// The timer is armed once and left to auto-reload between periods.
    /// `delay_ms(0)` arms and immediately disarms the timer without waiting.
    pub fn delay_ms(&mut self, ms: u32) {
        self.arm();
        for _ in 0..ms {
            self.wait_expiry();
        }
        self.disarm();
    }

    /// Arm the timer, wait for exactly one expiry, and disarm it again.
    pub fn wait_period(&mut self) {
        self.arm();
        self.wait_expiry();
        self.disarm();
    }

    /// Read `CTRL`, `PSCR`, `CNT`, and `CMP`.
    pub fn dump(&self) -> RegisterDump {
        RegisterDump {
            ctrl: self.bank.read(Reg::Ctrl),
            pscr: self.bank.read(Reg::Pscr),
            cnt: self.bank.read(Reg::Cnt),
            cmp: self.bank.read(Reg::Cmp),
        }
    }

    /// Get a flag indicating whether `CTRL` holds the armed code.
    pub fn is_armed(&self) -> bool {
        self.bank.read(Reg::Ctrl) == Ctrl::ARMED
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn into_inner(self) -> (B, S) {
        (self.bank, self.spin)
    }

    fn arm(&mut self) {
        log::trace!("arm");
        self.bank.write(Reg::Ctrl, Ctrl::ARMED);
    }

    fn disarm(&mut self) {
        log::trace!("disarm");
        self.bank.write(Reg::Ctrl, Ctrl::DISABLED);
    }

    fn wait_expiry(&mut self) {
        let bank = &self.bank;
        self.spin.spin_until(|| bank.read(Reg::Stat) != 0);
    }
}

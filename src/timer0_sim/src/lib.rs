//! Simulation environment for running the Timer0 driver on a hosted target.
//!
//! [`Simulator`] models the peripheral at the granularity of single clock
//! cycles:
//!
//!  - Writing [`Ctrl::ARMED`] to a stopped timer loads `CNT` from `CMP`.
//!  - While armed, `CNT` decrements once every `PSCR + 1` clock cycles. A
//!    decrement from zero reloads `CNT` from `CMP` and raises `STAT`, so one
//!    period lasts `(PSCR + 1) * (CMP + 1)` cycles.
//!  - Reading `STAT` returns the flag and acknowledges it.
//!  - Writing [`Ctrl::DISABLED`] freezes `CNT`. A pending `STAT` stays pending
//!    until it is read.
//!
//! Time only moves when the spin-wait returned by [`Simulator::spin`] polls
//! a condition that does not hold yet, or when [`Simulator::advance`] is
//! called. The spin-wait skips straight to the next expiry while the timer is
//! running, and gives up with a panic after a configurable number of polls
//! instead of hanging.
use std::cell::RefCell;
use timer0::{Ctrl, Reg, RegisterBank, SpinWait, TimerDriver};

/// A register write observed by [`Simulator`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// The simulated clock cycle at which the write happened.
    pub clock: u128,
    pub reg: Reg,
    pub value: u32,
    /// `CTRL` held [`Ctrl::ARMED`] when the write happened.
    pub while_armed: bool,
}

#[derive(Debug, Clone, Default)]
struct State {
    ctrl: u32,
    pscr: u32,
    cnt: u32,
    cmp: u32,
    stat: u32,
    clock: u128,
    /// Clock cycles since the last counter decrement
    phase: u128,
    writes: Vec<WriteRecord>,
    stat_reads: u64,
    expiries: u64,
    acknowledged: u64,
    arm_count: u64,
}

impl State {
    fn is_running(&self) -> bool {
        self.ctrl == Ctrl::ARMED
    }

    fn cycles_per_count(&self) -> u128 {
        self.pscr as u128 + 1
    }

    fn cycles_to_expiry(&self) -> Option<u128> {
        if !self.is_running() {
            return None;
        }
        let div = self.cycles_per_count();
        // Up to `2^64` with `PSCR = CMP = u32::MAX`
        Some((div - self.phase) + self.cnt as u128 * div)
    }

    fn expire(&mut self) {
        self.cnt = self.cmp;
        self.phase = 0;
        self.stat = 1;
        self.expiries += 1;
        log::trace!("expiry #{} at clock {}", self.expiries, self.clock);
    }

    fn advance(&mut self, mut cycles: u128) {
        while let Some(to_expiry) = self.cycles_to_expiry() {
            if cycles < to_expiry {
                let div = self.cycles_per_count();
                let total = self.phase + cycles;
                // `cycles < to_expiry` keeps this within `0..=CNT`
                self.cnt -= (total / div) as u32;
                self.phase = total % div;
                break;
            }
            cycles -= to_expiry;
            self.clock += to_expiry;
            self.expire();
        }
        self.clock += cycles;
    }

    fn read(&mut self, reg: Reg) -> u32 {
        match reg {
            Reg::Ctrl => self.ctrl,
            Reg::Pscr => self.pscr,
            Reg::Cnt => self.cnt,
            Reg::Cmp => self.cmp,
            Reg::Stat => {
                self.stat_reads += 1;
                let value = self.stat;
                if value != 0 {
                    self.stat = 0;
                    self.acknowledged += 1;
                }
                value
            }
        }
    }

    fn write(&mut self, reg: Reg, value: u32) {
        self.writes.push(WriteRecord {
            clock: self.clock,
            reg,
            value,
            while_armed: self.is_running(),
        });

        match reg {
            Reg::Ctrl => {
                if value == Ctrl::ARMED && !self.is_running() {
                    self.cnt = self.cmp;
                    self.phase = 0;
                    self.arm_count += 1;
                    log::trace!("armed at clock {}, CNT = {}", self.clock, self.cnt);
                } else if value != Ctrl::ARMED && value != Ctrl::DISABLED {
                    log::warn!("unknown CTRL code {:#x}; the timer will stop", value);
                }
                self.ctrl = value;
            }
            Reg::Pscr | Reg::Cmp => {
                if self.is_running() {
                    log::warn!("{} = {} written while the timer is armed", reg, value);
                }
                if reg == Reg::Pscr {
                    self.pscr = value;
                } else {
                    self.cmp = value;
                }
            }
            Reg::Cnt | Reg::Stat => {
                log::warn!("ignoring a write to the read-only register {}", reg);
            }
        }
    }
}

/// A simulated Timer0 peripheral.
///
/// `&Simulator` implements [`RegisterBank`], so a [`TimerDriver`] can borrow
/// the simulator while the test keeps inspecting it.
#[derive(Debug)]
pub struct Simulator {
    st: RefCell<State>,
    spin_limit: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// The default number of polls after which [`SimSpin`] gives up.
    pub const DEFAULT_SPIN_LIMIT: u64 = 1 << 20;

    /// Construct a `Simulator` in the power-on state (every register zero).
    pub fn new() -> Self {
        Self {
            st: RefCell::new(State::default()),
            spin_limit: Self::DEFAULT_SPIN_LIMIT,
        }
    }

    /// Construct a `Simulator` whose `STAT` holds an unacknowledged expiry
    /// left over from a previous run.
    pub fn with_pending_expiry() -> Self {
        let this = Self::new();
        this.st.borrow_mut().stat = 1;
        this
    }

    /// Set the number of polls after which [`SimSpin`] gives up.
    pub fn with_spin_limit(mut self, spin_limit: u64) -> Self {
        self.spin_limit = spin_limit;
        self
    }

    /// Construct a [`TimerDriver`] attached to this simulator.
    pub fn driver(&self) -> TimerDriver<&Self, SimSpin<'_>> {
        TimerDriver::with_spin(self, self.spin())
    }

    /// Get a spin-wait strategy that advances this simulator's clock.
    pub fn spin(&self) -> SimSpin<'_> {
        SimSpin { sim: self }
    }

    /// Read a register without side effects.
    pub fn peek(&self, reg: Reg) -> u32 {
        let st = self.st.borrow();
        match reg {
            Reg::Ctrl => st.ctrl,
            Reg::Pscr => st.pscr,
            Reg::Cnt => st.cnt,
            Reg::Cmp => st.cmp,
            Reg::Stat => st.stat,
        }
    }

    /// Let `cycles` clock cycles elapse.
    pub fn advance(&self, cycles: u128) {
        self.st.borrow_mut().advance(cycles);
    }

    /// Let time elapse until the next expiry. Returns the number of elapsed
    /// clock cycles, or `None` if the timer is stopped.
    pub fn advance_to_next_expiry(&self) -> Option<u128> {
        let mut st = self.st.borrow_mut();
        let cycles = st.cycles_to_expiry()?;
        st.advance(cycles);
        Some(cycles)
    }

    /// Get the number of clock cycles elapsed since power-on.
    pub fn clock(&self) -> u128 {
        self.st.borrow().clock
    }

    /// Get the number of times `STAT` was read.
    pub fn stat_reads(&self) -> u64 {
        self.st.borrow().stat_reads
    }

    /// Get the number of times the counter expired.
    pub fn expiries(&self) -> u64 {
        self.st.borrow().expiries
    }

    /// Get the number of `STAT` reads that returned a nonzero value.
    pub fn acknowledged_expiries(&self) -> u64 {
        self.st.borrow().acknowledged
    }

    /// Get the number of transitions from stopped to armed.
    pub fn arm_count(&self) -> u64 {
        self.st.borrow().arm_count
    }

    /// Get every register write since power-on.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.st.borrow().writes.clone()
    }

    /// Get the `PSCR`/`CMP` writes that happened while the timer was armed.
    pub fn config_writes_while_armed(&self) -> Vec<WriteRecord> {
        self.st
            .borrow()
            .writes
            .iter()
            .filter(|w| matches!(w.reg, Reg::Pscr | Reg::Cmp) && w.while_armed)
            .copied()
            .collect()
    }
}

impl RegisterBank for &'_ Simulator {
    fn read(&self, reg: Reg) -> u32 {
        self.st.borrow_mut().read(reg)
    }

    fn write(&mut self, reg: Reg, value: u32) {
        self.st.borrow_mut().write(reg, value);
    }
}

/// The [`SpinWait`] implementation for [`Simulator`].
///
/// Between two failed polls, jumps to the next expiry if the timer is
/// running, or lets one clock cycle pass otherwise. Panics once the
/// simulator's spin limit is reached, which is where real hardware would hang.
#[derive(Debug, Clone, Copy)]
pub struct SimSpin<'a> {
    sim: &'a Simulator,
}

impl SpinWait for SimSpin<'_> {
    fn spin_until(&mut self, mut cond: impl FnMut() -> bool) {
        let limit = self.sim.spin_limit;
        for _ in 0..limit {
            if cond() {
                return;
            }
            if self.sim.advance_to_next_expiry().is_none() {
                self.sim.advance(1);
            }
        }
        panic!(
            "spin-wait gave up after {} polls (clock = {}, CTRL = {:#x}, STAT = {})",
            limit,
            self.sim.clock(),
            self.sim.peek(Reg::Ctrl),
            self.sim.peek(Reg::Stat),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn arm(sim: &Simulator, pscr: u32, cmp: u32) {
        let mut bank = sim;
        bank.write(Reg::Pscr, pscr);
        bank.write(Reg::Cmp, cmp);
        bank.write(Reg::Ctrl, Ctrl::ARMED);
    }

    #[test]
    fn counter_decrements_every_prescaled_cycle() {
        init_logger();
        let sim = Simulator::new();
        arm(&sim, 3, 9);
        assert_eq!(sim.peek(Reg::Cnt), 9);

        sim.advance(3);
        assert_eq!(sim.peek(Reg::Cnt), 9);
        sim.advance(1);
        assert_eq!(sim.peek(Reg::Cnt), 8);
        sim.advance(4 * 8);
        assert_eq!(sim.peek(Reg::Cnt), 0);
        assert_eq!(sim.peek(Reg::Stat), 0);

        // The decrement from zero reloads and expires
        sim.advance(4);
        assert_eq!(sim.peek(Reg::Cnt), 9);
        assert_eq!(sim.peek(Reg::Stat), 1);
        assert_eq!(sim.expiries(), 1);
        assert_eq!(sim.clock(), 40);
    }

    #[test]
    fn advance_spans_many_periods() {
        let sim = Simulator::new();
        arm(&sim, 0, 99);
        sim.advance(1_050);
        assert_eq!(sim.expiries(), 10);
        assert_eq!(sim.peek(Reg::Cnt), 99 - 50);
        assert_eq!(sim.clock(), 1_050);
    }

    #[test]
    fn longest_period() {
        let sim = Simulator::new();
        arm(&sim, u32::MAX, u32::MAX);
        sim.advance(1);
        assert_eq!(sim.peek(Reg::Cnt), u32::MAX);

        sim.advance(1 << 32);
        assert_eq!(sim.peek(Reg::Cnt), u32::MAX - 1);
        assert_eq!(sim.advance_to_next_expiry(), Some((1 << 64) - 1 - (1 << 32)));
        assert_eq!(sim.clock(), 1 << 64);
        assert_eq!(sim.peek(Reg::Stat), 1);
        assert_eq!(sim.peek(Reg::Cnt), u32::MAX);
        assert_eq!(sim.expiries(), 1);
    }

    #[test]
    fn next_expiry_from_midway() {
        let sim = Simulator::new();
        arm(&sim, 1, 4);
        sim.advance(3);
        assert_eq!(sim.advance_to_next_expiry(), Some(7));
        assert_eq!(sim.clock(), 10);
        assert_eq!(sim.advance_to_next_expiry(), Some(10));
    }

    #[test]
    fn stat_read_acknowledges() {
        let sim = Simulator::with_pending_expiry();
        let bank = &sim;
        assert_eq!(bank.read(Reg::Stat), 1);
        assert_eq!(bank.read(Reg::Stat), 0);
        assert_eq!(sim.stat_reads(), 2);
        assert_eq!(sim.acknowledged_expiries(), 1);
    }

    #[test]
    fn stopped_timer_does_not_count() {
        let sim = Simulator::new();
        arm(&sim, 0, 9);
        sim.advance(5);
        let mut bank = &sim;
        bank.write(Reg::Ctrl, Ctrl::DISABLED);
        sim.advance(100);
        assert_eq!(sim.peek(Reg::Cnt), 4);
        assert_eq!(sim.expiries(), 0);
        assert_eq!(sim.advance_to_next_expiry(), None);
    }

    #[test]
    fn rearming_reloads_counter() {
        let sim = Simulator::new();
        arm(&sim, 0, 9);
        sim.advance(5);
        let mut bank = &sim;
        bank.write(Reg::Ctrl, Ctrl::DISABLED);
        bank.write(Reg::Ctrl, Ctrl::ARMED);
        assert_eq!(sim.peek(Reg::Cnt), 9);
        assert_eq!(sim.arm_count(), 2);
    }

    #[test]
    fn read_only_registers_ignore_writes() {
        let sim = Simulator::new();
        let mut bank = &sim;
        bank.write(Reg::Stat, 1);
        bank.write(Reg::Cnt, 5);
        assert_eq!(sim.peek(Reg::Stat), 0);
        assert_eq!(sim.peek(Reg::Cnt), 0);
    }

    #[test]
    fn flags_config_writes_while_armed() {
        let sim = Simulator::new();
        arm(&sim, 0, 9);
        let mut bank = &sim;
        bank.write(Reg::Cmp, 4);
        let bad = sim.config_writes_while_armed();
        assert_eq!(bad.len(), 1);
        assert_eq!((bad[0].reg, bad[0].value), (Reg::Cmp, 4));
    }

    #[test]
    #[should_panic(expected = "spin-wait gave up")]
    fn spin_gives_up_on_stopped_timer() {
        let sim = Simulator::new().with_spin_limit(100);
        let bank = &sim;
        sim.spin().spin_until(|| bank.read(Reg::Stat) != 0);
    }
}

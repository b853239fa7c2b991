use core::fmt;

/// The clock frequency feeding Timer0 on the reference SoC.
pub const CLOCK_HZ: u64 = 50_000_000;

/// The user-facing timing parameters, validated by [`TimerCfg::new`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerOptions {
    /// The frequency of the peripheral clock.
    pub clock_hz: u64,
    /// The prescaler divisor. `1` bypasses the prescaler.
    pub prescaler: u32,
    /// The rate at which the timer should expire.
    pub tick_hz: u64,
}

impl TimerOptions {
    /// One expiry per millisecond with the prescaler bypassed.
    pub const MILLISECOND: Self = Self {
        clock_hz: CLOCK_HZ,
        prescaler: 1,
        tick_hz: 1_000,
    };

    /// One expiry per second with the clock divided by 50.
    pub const SECOND_DIV50: Self = Self {
        clock_hz: CLOCK_HZ,
        prescaler: 50,
        tick_hz: 1,
    };
}

/// The register values that realize a [`TimerOptions`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerCfg {
    pscr: u32,
    cmp: u32,
}

/// Error type for [`TimerCfg::new`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CreateTimerCfgError {
    /// `clock_hz` is zero.
    ZeroClock,
    /// `prescaler` is zero.
    ZeroPrescaler,
    /// `tick_hz` is zero.
    ZeroTickRate,
    /// The period is shorter than one prescaled counter tick.
    PeriodTooShort,
    /// The reload value does not fit in `CMP`.
    PeriodTooLong,
    /// The period is not a whole number of prescaled counter ticks.
    InexactPeriod,
}

impl CreateTimerCfgError {
    /// Get a human-readable description of the error.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZeroClock => "the clock frequency must not be zero",
            Self::ZeroPrescaler => "the prescaler divisor must not be zero",
            Self::ZeroTickRate => "the tick rate must not be zero",
            Self::PeriodTooShort => {
                "the period is shorter than one counter tick; \
                lower the prescaler or the tick rate"
            }
            Self::PeriodTooLong => {
                "the reload value does not fit in 32 bits; \
                raise the prescaler or the tick rate"
            }
            Self::InexactPeriod => {
                "the clock frequency is not a multiple of \
                `prescaler * tick_hz`"
            }
        }
    }

    /// Panic with a message describing the error. Usable in a constant
    /// context, where it turns a bad configuration into a compile error.
    pub const fn panic(self) -> ! {
        match self {
            Self::ZeroClock => panic!("the clock frequency must not be zero"),
            Self::ZeroPrescaler => panic!("the prescaler divisor must not be zero"),
            Self::ZeroTickRate => panic!("the tick rate must not be zero"),
            Self::PeriodTooShort => panic!(
                "the period is shorter than one counter tick; \
                lower the prescaler or the tick rate"
            ),
            Self::PeriodTooLong => panic!(
                "the reload value does not fit in 32 bits; \
                raise the prescaler or the tick rate"
            ),
            Self::InexactPeriod => panic!(
                "the clock frequency is not a multiple of \
                `prescaler * tick_hz`"
            ),
        }
    }
}

impl fmt::Display for CreateTimerCfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TimerCfg {
    /// `PSCR = 0`, `CMP = 49999`: 1 ms at 50 MHz.
    pub const MILLISECOND: Self = match Self::new(TimerOptions::MILLISECOND) {
        Ok(x) => x,
        Err(e) => e.panic(),
    };

    /// `PSCR = 49`, `CMP = 999999`: 1 s at 50 MHz.
    pub const SECOND_DIV50: Self = match Self::new(TimerOptions::SECOND_DIV50) {
        Ok(x) => x,
        Err(e) => e.panic(),
    };

    /// Construct a `TimerCfg`.
    pub const fn new(opts: TimerOptions) -> Result<Self, CreateTimerCfgError> {
        if opts.clock_hz == 0 {
            return Err(CreateTimerCfgError::ZeroClock);
        } else if opts.prescaler == 0 {
            return Err(CreateTimerCfgError::ZeroPrescaler);
        } else if opts.tick_hz == 0 {
            return Err(CreateTimerCfgError::ZeroTickRate);
        }

        // Clock cycles per expiry = `prescaler * (CMP + 1)`
        let divisor = match (opts.prescaler as u64).checked_mul(opts.tick_hz) {
            Some(x) => x,
            None => return Err(CreateTimerCfgError::PeriodTooShort),
        };
        let counts = opts.clock_hz / divisor;
        if counts == 0 {
            return Err(CreateTimerCfgError::PeriodTooShort);
        } else if opts.clock_hz % divisor != 0 {
            return Err(CreateTimerCfgError::InexactPeriod);
        } else if counts - 1 > u32::MAX as u64 {
            return Err(CreateTimerCfgError::PeriodTooLong);
        }

        Ok(Self {
            pscr: opts.prescaler - 1,
            cmp: (counts - 1) as u32,
        })
    }

    /// Construct a `TimerCfg` from raw register values.
    pub const fn from_raw(pscr: u32, cmp: u32) -> Self {
        Self { pscr, cmp }
    }

    /// Get the value for `PSCR`.
    pub const fn pscr(&self) -> u32 {
        self.pscr
    }

    /// Get the value for `CMP`.
    pub const fn cmp(&self) -> u32 {
        self.cmp
    }

    /// Get the number of peripheral clock cycles between two expiries.
    ///
    /// This reaches `2^64` when both registers hold `u32::MAX`.
    pub const fn period_clock_ticks(&self) -> u128 {
        (self.pscr as u128 + 1) * (self.cmp as u128 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn presets() {
        assert_eq!(TimerCfg::MILLISECOND.pscr(), 0);
        assert_eq!(TimerCfg::MILLISECOND.cmp(), 49_999);
        assert_eq!(TimerCfg::MILLISECOND.period_clock_ticks(), 50_000);

        assert_eq!(TimerCfg::SECOND_DIV50.pscr(), 49);
        assert_eq!(TimerCfg::SECOND_DIV50.cmp(), 999_999);
        assert_eq!(TimerCfg::SECOND_DIV50.period_clock_ticks(), 50_000_000);
    }

    #[test]
    fn rejects_bad_options() {
        let base = TimerOptions::MILLISECOND;
        for (opts, expected) in [
            (
                TimerOptions {
                    clock_hz: 0,
                    ..base
                },
                CreateTimerCfgError::ZeroClock,
            ),
            (
                TimerOptions {
                    prescaler: 0,
                    ..base
                },
                CreateTimerCfgError::ZeroPrescaler,
            ),
            (
                TimerOptions { tick_hz: 0, ..base },
                CreateTimerCfgError::ZeroTickRate,
            ),
            (
                TimerOptions {
                    tick_hz: 100_000_000,
                    ..base
                },
                CreateTimerCfgError::PeriodTooShort,
            ),
            (
                TimerOptions {
                    prescaler: u32::MAX,
                    tick_hz: u64::MAX,
                    ..base
                },
                CreateTimerCfgError::PeriodTooShort,
            ),
            (
                TimerOptions {
                    tick_hz: 3,
                    ..base
                },
                CreateTimerCfgError::InexactPeriod,
            ),
            (
                TimerOptions {
                    clock_hz: 1 << 40,
                    prescaler: 1,
                    tick_hz: 1,
                },
                CreateTimerCfgError::PeriodTooLong,
            ),
        ] {
            assert_eq!(TimerCfg::new(opts), Err(expected), "{:?}", opts);
        }
    }

    #[test]
    fn full_range_reload() {
        let cfg = TimerCfg::new(TimerOptions {
            clock_hz: 1 << 32,
            prescaler: 1,
            tick_hz: 1,
        })
        .unwrap();
        assert_eq!(cfg.cmp(), u32::MAX);
        assert_eq!(cfg.period_clock_ticks(), 1 << 32);
    }

    #[test]
    fn longest_raw_period() {
        let cfg = TimerCfg::from_raw(u32::MAX, u32::MAX);
        assert_eq!(cfg.period_clock_ticks(), 1 << 64);
        assert_eq!(TimerCfg::from_raw(0, 0).period_clock_ticks(), 1);
    }

    #[test]
    fn error_messages() {
        use std::string::ToString;
        assert_eq!(
            CreateTimerCfgError::ZeroPrescaler.to_string(),
            "the prescaler divisor must not be zero"
        );
    }

    #[quickcheck]
    fn period_matches_tick_rate(prescaler: u8, counts: u32, tick_hz: u16) {
        let (prescaler, counts, tick_hz) =
            (prescaler as u32 + 1, counts as u64 + 1, tick_hz as u64 + 1);
        let opts = TimerOptions {
            clock_hz: prescaler as u64 * counts * tick_hz,
            prescaler,
            tick_hz,
        };
        let cfg = TimerCfg::new(opts).unwrap();
        assert_eq!(cfg.pscr(), prescaler - 1);
        assert_eq!(cfg.cmp() as u64, counts - 1);
        assert_eq!(
            cfg.period_clock_ticks() * tick_hz as u128,
            opts.clock_hz as u128
        );
    }
}

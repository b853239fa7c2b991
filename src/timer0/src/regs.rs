#![allow(non_snake_case)]
use core::fmt;
use tock_registers::{
    interfaces::{Readable, Writeable},
    registers::{ReadOnly, ReadWrite},
};

/// The memory layout of the Timer0 register block.
#[repr(C)]
pub struct Timer0Regs {
    pub CTRL: ReadWrite<u32>,
    pub PSCR: ReadWrite<u32>,
    pub CNT: ReadOnly<u32>,
    pub CMP: ReadWrite<u32>,
    pub STAT: ReadOnly<u32>,
}

const _: () = assert!(core::mem::size_of::<Timer0Regs>() == 0x14);

/// Identifies one of the Timer0 registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reg {
    /// Control
    Ctrl,
    /// Prescaler divisor minus one
    Pscr,
    /// Counter
    Cnt,
    /// Compare/reload value minus one
    Cmp,
    /// Status
    Stat,
}

impl Reg {
    pub const ALL: [Self; 5] = [Self::Ctrl, Self::Pscr, Self::Cnt, Self::Cmp, Self::Stat];

    /// Get the byte offset of the register from the base address.
    pub const fn offset(self) -> usize {
        match self {
            Self::Ctrl => 0x0,
            Self::Pscr => 0x4,
            Self::Cnt => 0x8,
            Self::Cmp => 0xc,
            Self::Stat => 0x10,
        }
    }

    /// Get the register's name as printed in diagnostic output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ctrl => "CTRL",
            Self::Pscr => "PSCR",
            Self::Cnt => "CNT",
            Self::Cmp => "CMP",
            Self::Stat => "STAT",
        }
    }

    /// Get a flag indicating whether software can write to the register.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Ctrl | Self::Pscr | Self::Cmp)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values written to `CTRL`.
///
/// The bit assignment of the armed code is defined by the hardware. The driver
/// only ever writes one of these two codes.
pub struct Ctrl;

impl Ctrl {
    /// Stops the counter.
    pub const DISABLED: u32 = 0x0;
    /// Starts down-counting with auto-reload and raises `STAT` on every
    /// expiry (`0b0000_1101`).
    pub const ARMED: u32 = 0xd;
}

/// The location of a Timer0 register block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterMap {
    /// The base address of the memory-mapped registers.
    pub base: usize,
}

impl RegisterMap {
    /// The Timer0 instance of the reference SoC.
    pub const TIMER0: Self = Self { base: 0x1000_4000 };

    /// Get the absolute address of `reg`.
    pub const fn addr(&self, reg: Reg) -> usize {
        self.base + reg.offset()
    }
}

/// Provides access to the five Timer0 registers.
///
/// Implementations must not reorder, merge, or elide accesses. A read of
/// `STAT` must observe every write that precedes it in program order.
pub trait RegisterBank {
    fn read(&self, reg: Reg) -> u32;

    /// Write `value` to `reg`. Writing a read-only register has no effect.
    fn write(&mut self, reg: Reg, value: u32);
}

impl<T: RegisterBank + ?Sized> RegisterBank for &mut T {
    #[inline]
    fn read(&self, reg: Reg) -> u32 {
        (**self).read(reg)
    }

    #[inline]
    fn write(&mut self, reg: Reg, value: u32) {
        (**self).write(reg, value)
    }
}

/// [`RegisterBank`] backed by the real memory-mapped registers.
pub struct MmioBank {
    regs: &'static Timer0Regs,
}

impl MmioBank {
    /// Construct a `MmioBank` for the register block described by `map`.
    ///
    /// # Safety
    ///
    /// `map.base` must point to a Timer0 register block, and nothing else may
    /// access the block while the returned `MmioBank` is alive.
    pub unsafe fn new(map: RegisterMap) -> Self {
        Self {
            // Safety: Upheld by the caller
            regs: unsafe { &*(map.base as *const Timer0Regs) },
        }
    }

    /// Get a reference to the underlying register block.
    pub fn regs(&self) -> &'static Timer0Regs {
        self.regs
    }
}

impl RegisterBank for MmioBank {
    #[inline]
    fn read(&self, reg: Reg) -> u32 {
        match reg {
            Reg::Ctrl => self.regs.CTRL.get(),
            Reg::Pscr => self.regs.PSCR.get(),
            Reg::Cnt => self.regs.CNT.get(),
            Reg::Cmp => self.regs.CMP.get(),
            Reg::Stat => self.regs.STAT.get(),
        }
    }

    #[inline]
    fn write(&mut self, reg: Reg, value: u32) {
        match reg {
            Reg::Ctrl => self.regs.CTRL.set(value),
            Reg::Pscr => self.regs.PSCR.set(value),
            Reg::Cmp => self.regs.CMP.set(value),
            Reg::Cnt | Reg::Stat => {
                log::warn!("ignoring a write to the read-only register {}", reg);
            }
        }
    }
}

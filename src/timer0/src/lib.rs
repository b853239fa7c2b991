#![doc = include_str!("./lib.md")]
#![deny(unsafe_op_in_unsafe_fn)]
#![no_std]

#[cfg(test)]
extern crate std;

/// The Timer0 register block and the register bank abstraction.
pub mod regs;

/// Timing configuration.
pub mod cfg;

/// Spin-wait strategies.
pub mod spin;

/// The polling driver.
pub mod driver;

/// The diagnostic sequence.
pub mod smoke;

pub use self::cfg::*;
pub use self::driver::*;
pub use self::regs::{Ctrl, MmioBank, Reg, RegisterBank, RegisterMap};
pub use self::spin::*;

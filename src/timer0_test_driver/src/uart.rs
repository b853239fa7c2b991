//! The console of the reference SoC: a 16550-compatible UART. Log records
//! and panic messages go to the same port as the smoke-test transcript.
use core::{
    fmt::{self, Write},
    panic::PanicInfo,
};

const UART_BASE: usize = 0x1000_0000;
/// Transmit Holding Register
const THR: usize = 0x0;
/// Line Status Register
const LSR: usize = 0x5;
/// `LSR.THRE`: the transmit holding register is empty
const LSR_THRE: u8 = 1 << 5;

pub struct Console;

impl Console {
    fn write_u8(&self, x: u8) {
        let base = UART_BASE as *mut u8;
        // Safety: The UART is only accessed through `Console`, and the
        // program is single-threaded
        unsafe {
            while base.add(LSR).read_volatile() & LSR_THRE == 0 {}
            base.add(THR).write_volatile(x);
        }
    }
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.as_bytes() {
            if *byte == b'\n' {
                self.write_u8(b'\r');
            }

            self.write_u8(*byte);
        }
        Ok(())
    }
}

/// Prints log records as `[LEVEL target] message` lines.
struct ConsoleLogger {
    max_level: log::LevelFilter,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    max_level: log::LevelFilter::Debug,
};

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                Console,
                "[{:5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn init_logger() {
    // Fails only if a logger is already installed
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LOGGER.max_level);
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    // Nothing may preempt the message
    unsafe { riscv::register::mstatus::clear_mie() };

    let _ = writeln!(Console, "{}", info);

    loop {
        core::hint::spin_loop();
    }
}

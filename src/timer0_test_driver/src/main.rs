#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(feature = "run", no_std)]
#![cfg_attr(feature = "run", no_main)]
use timer0::smoke::{self, SmokeOptions};

#[cfg(feature = "run")]
mod uart;

#[cfg(not(feature = "run"))]
mod stdout;

#[cfg(feature = "run")]
#[riscv_rt::entry]
fn main() -> ! {
    uart::init_logger();

    // Safety: Nothing else in this program touches Timer0
    let bank = unsafe { timer0::MmioBank::new(timer0::RegisterMap::TIMER0) };
    let mut timer = timer0::TimerDriver::new(bank);

    let status = smoke::run(&mut timer, &mut uart::Console, &SmokeOptions::DEFAULT);
    log::info!("exit status: {}", status.code());

    loop {
        // prevent the loop from being optimized out
        // <https://github.com/rust-lang/rust/issues/28728>
        core::hint::spin_loop();
    }
}

#[cfg(not(feature = "run"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("running on the simulated Timer0");
    let sim = timer0_sim::Simulator::new();
    let status = smoke::run(&mut sim.driver(), &mut stdout::Console, &SmokeOptions::DEFAULT);

    log::info!(
        "simulated {} clock cycles ({} s at {} Hz), {} expiries",
        sim.clock(),
        sim.clock() / timer0::CLOCK_HZ as u128,
        timer0::CLOCK_HZ,
        sim.expiries(),
    );
    std::process::exit(status.code());
}

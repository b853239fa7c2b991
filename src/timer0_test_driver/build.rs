use std::{env, fs, path::Path};

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=memory.x");

    // Only the bare-metal build links with `riscv-rt`
    if env::var_os("CARGO_FEATURE_RUN").is_none() {
        return;
    }

    println!("cargo:rustc-link-arg=-Tlink.x");

    println!("cargo:rerun-if-env-changed=TIMER0_TEST_DRIVER_LINK_SEARCH");
    if let Ok(link_search) = env::var("TIMER0_TEST_DRIVER_LINK_SEARCH") {
        // The user supplies their own `memory.x`
        println!("cargo:rustc-link-search={link_search}");
        return;
    }

    fs::copy("memory.x", Path::new(&out_dir).join("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", Path::new(&out_dir).display());
}

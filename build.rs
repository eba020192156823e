//! Build script for the node firmware
//!
//! Handles:
//! - Memory layout and linker scripts for the target binary
//! - Nothing at all for host (`std`) builds

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host test builds link against std and need no linker scripts
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // memory.x is generated by embassy-stm32 (`memory-x` feature)
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

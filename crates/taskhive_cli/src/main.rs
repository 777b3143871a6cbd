//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskhive_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("taskhive_core ping={}", taskhive_core::ping());
    println!("taskhive_core version={}", taskhive_core::core_version());
}

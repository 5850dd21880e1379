//! CLI command modules.

pub mod config;
pub mod data;
pub mod inspect;
pub mod send;
pub mod status;
pub mod wasm;

/// Print a section banner.
pub fn banner(title: &str) {
    println!("═══════════════════════════════════════");
    println!("  {title}");
    println!("═══════════════════════════════════════");
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `slotgrid_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("slotgrid_core version={}", slotgrid_core::core_version());
    match slotgrid_core::db::open_db_in_memory() {
        Ok(_) => println!("slotgrid_core db=ok"),
        Err(err) => println!("slotgrid_core db=error {err}"),
    }
}

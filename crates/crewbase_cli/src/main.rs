//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `crewbase_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use crewbase_core::db::migrations::latest_version;
use crewbase_core::db::open_db_in_memory;

fn main() {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from the REST handler layer.
    println!("crewbase_core ping={}", crewbase_core::ping());
    println!("crewbase_core version={}", crewbase_core::core_version());

    match open_db_in_memory() {
        Ok(_conn) => println!("crewbase_core schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("crewbase_core db_open_failed error={err}");
            std::process::exit(1);
        }
    }
}

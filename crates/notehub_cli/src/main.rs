//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notehub_core` linkage and
//!   storage bootstrap.
//! - Print a fixed, greppable line per check.

use notehub_core::db::open_db_in_memory;

fn main() {
    println!("notehub_core ping={}", notehub_core::ping());
    println!("notehub_core version={}", notehub_core::core_version());

    match open_db_in_memory() {
        Ok(_conn) => println!("notehub_core storage=ready"),
        Err(err) => {
            eprintln!("notehub_core storage=error {err}");
            std::process::exit(1);
        }
    }
}

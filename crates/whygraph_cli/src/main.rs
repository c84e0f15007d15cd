//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `whygraph_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("whygraph_core version={}", whygraph_core::core_version());
    match whygraph_core::db::open_db_in_memory() {
        Ok(_) => println!("whygraph_core storage=ok"),
        Err(err) => {
            eprintln!("whygraph_core storage=error {err}");
            std::process::exit(1);
        }
    }
}

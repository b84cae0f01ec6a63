//! Codepaint CLI
//!
//! Simplifies source text by inlining variable bindings and paints the
//! branches taken under a given set of parameter values.

use codepaint_core::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

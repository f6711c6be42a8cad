//! `qms` - Quality management service
//!
//! Serves defects, issues and tasks over a REST API backed by an
//! in-memory store.

use qms::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

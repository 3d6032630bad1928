//! Binary entrypoint that loads a pairup session and prints its snapshot.

use std::process::ExitCode;

use pairup::start_pairup;

/// Build the configured session and write its state to stdout.
fn main() -> ExitCode {
    start_pairup::run()
}

//! taskdeck - A terminal dashboard for a remote task service

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskdeck::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

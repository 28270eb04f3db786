//! rcweave - assemble shell startup files from small modules

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = rcweave::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match msacd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "msacd: {error}");
            ExitCode::FAILURE
        }
    }
}

use moan::MoanError;
use std::process::ExitCode;

fn main() -> ExitCode {
    match moan::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported
        Err(MoanError::BuildFailed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

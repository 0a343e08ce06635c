use std::process::ExitCode;

fn main() -> ExitCode {
    wardstock_cli::run()
}

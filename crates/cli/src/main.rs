use std::process::ExitCode;

fn main() -> ExitCode {
    vendy_cli::run()
}

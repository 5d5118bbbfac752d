use std::process::ExitCode;

fn main() -> ExitCode {
    stickfit_cli::run()
}

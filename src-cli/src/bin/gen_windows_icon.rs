//! Build the Windows application icon from the project's PNG icon.

use shipkit_cli::{execute, Tool};
use std::process::ExitCode;

fn main() -> ExitCode {
    let code = execute(
        Tool::WindowsIcon,
        std::env::args().skip(1),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    ExitCode::from(code)
}

//! Copy the Dart version constants into the platform build files.

use shipkit_cli::{execute, Tool};
use std::process::ExitCode;

fn main() -> ExitCode {
    let code = execute(
        Tool::SyncVersions,
        std::env::args().skip(1),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    ExitCode::from(code)
}

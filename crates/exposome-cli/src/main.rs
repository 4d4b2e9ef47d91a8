//! `exposome` binary

use std::process::ExitCode;

use exposome_cli::{build_cli, global_one, init_tracing, run};

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_tracing(global_one::<String>(&matches, "log-level").as_deref());

    match run(&matches) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

//! CLI binary for `pocket_todo`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use std::process::ExitCode;

use clap::Parser;
use pocket_todo::cli::{self, Cli, CliContext};

fn main() -> ExitCode {
    let args = Cli::parse();

    let ctx = match CliContext::resolve(args.data_dir, args.here.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };
    pocket_todo::logging::init(&ctx.config.log_level);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            return ExitCode::from(1);
        }
    };
    let output = runtime.block_on(cli::run(args.command, &ctx));

    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}

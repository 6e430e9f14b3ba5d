#[macro_use]
extern crate log;

mod cli;

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

fn main() -> ExitCode {
    let args = cli::Gif2SprCli::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let err_exit = ExitCode::from(1);
    let ok_exit = ExitCode::from(0);

    match cli::cli(args) {
        cli::CliRes::Ok => ok_exit,
        cli::CliRes::Err => err_exit,
    }
}

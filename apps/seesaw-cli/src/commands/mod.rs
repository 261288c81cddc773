mod backtest;
mod common;
mod report;
mod validate;

use seesaw_domain::errors::Result;
use std::path::PathBuf;

pub enum Command {
    Backtest {
        config: PathBuf,
        out: Option<PathBuf>,
    },
    Validate {
        config: PathBuf,
        strict: bool,
        out: Option<PathBuf>,
    },
    Report {
        input: PathBuf,
    },
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Backtest { config, out } => backtest::run_backtest(config, out),
        Command::Validate {
            config,
            strict,
            out,
        } => validate::run_validate(config, strict, out),
        Command::Report { input } => report::run_report(input),
    }
}

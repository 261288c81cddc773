mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand, ValueEnum};
use commands::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seesaw")]
#[command(about = "Two-asset monthly rotation backtester", version, arg_required_else_help = true)]
#[command(
    after_help = "Examples:\n  seesaw backtest --config configs/sample.toml --out runs/\n  seesaw validate --config configs/sample.toml --strict\n  seesaw report --input runs/<run_id>/\n"
)]
struct Cli {
    /// Log output format. The filter comes from SEESAW_LOG (default: info).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on host:port while the command runs.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the rotation and benchmark over both price files.
    Backtest {
        #[arg(long)]
        config: PathBuf,
        /// Base directory for run artifacts (overrides paths.out_dir).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check both price files and print a data-quality report.
    Validate {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Also write the JSON report to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Recompute summary.json and the HTML files from an existing run.
    Report {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_format = match cli.log_format {
        LogFormat::Text => obs::LogFormat::Text,
        LogFormat::Json => obs::LogFormat::Json,
    };
    if let Err(err) = obs::init_tracing("info", log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    obs::log_build_info();

    let command = match cli.command {
        CliCommand::Backtest { config, out } => Command::Backtest { config, out },
        CliCommand::Validate {
            config,
            strict,
            out,
        } => Command::Validate {
            config,
            strict,
            out,
        },
        CliCommand::Report { input } => Command::Report { input },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

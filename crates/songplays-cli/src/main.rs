//! CLI tool for building the songplays star schema.

mod config;
mod error;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use datafusion::prelude::{SessionConfig, SessionContext};
use snafu::ResultExt;
use songplays_datafusion::{StageReport, process_log_data, process_song_data, run_pipeline};
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
    config::{CliSettings, FileConfig, INPUT_ENV, LOG_ENV, OUTPUT_ENV, TIMEZONE_ENV},
    error::{CliResult, PipelineSnafu},
};

#[derive(Debug, Args)]
struct Roots {
    /// Root holding song_data/ and log_data/
    #[arg(long, env = INPUT_ENV)]
    input: Option<String>,

    /// Root receiving the table directories (replaced on every run)
    #[arg(long, env = OUTPUT_ENV)]
    output: Option<String>,

    /// TOML file supplying defaults for flags that are not given
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the first N rows of every written table
    #[arg(long)]
    show: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build `songs` and `artists` from song_data/
    Songs {
        #[command(flatten)]
        roots: Roots,
    },

    /// Build `users`, `time` and `songplays` from log_data/
    Logs {
        #[command(flatten)]
        roots: Roots,

        /// IANA timezone for the time dimension (default America/New_York)
        #[arg(long, env = TIMEZONE_ENV)]
        timezone: Option<String>,
    },

    /// Run both stages
    Run {
        #[command(flatten)]
        roots: Roots,

        /// IANA timezone for the time dimension (default America/New_York)
        #[arg(long, env = TIMEZONE_ENV)]
        timezone: Option<String>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "songplays", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

fn init_logging(default_level: Option<&str>) {
    let default_level = default_level
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn print_report(report: &StageReport) {
    println!("{} stage finished in {} ms", report.stage, report.total_ms);
    for table in &report.tables {
        println!(
            "  {:<10} {:>8} row(s)  {}",
            table.table.name(),
            table.rows,
            table.path.display()
        );
        if let Some(preview) = &table.preview {
            println!("{preview}");
        }
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let (roots, timezone, uses_timezone) = match &cli.cmd {
        Command::Songs { roots } => (roots, None, false),
        Command::Logs { roots, timezone } | Command::Run { roots, timezone } => {
            (roots, timezone.clone(), true)
        }
    };

    let file = match &roots.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    init_logging(file.log_level.as_deref());

    let config = config::resolve(
        CliSettings {
            input: roots.input.clone(),
            output: roots.output.clone(),
            timezone,
            show: roots.show,
            uses_timezone,
        },
        &file,
    )?;

    let ctx = SessionContext::new_with_config(SessionConfig::new());

    let reports = match cli.cmd {
        Command::Songs { .. } => {
            vec![process_song_data(&ctx, &config.input, &config.output, &config.options)
                .await
                .context(PipelineSnafu)?]
        }
        Command::Logs { .. } => {
            vec![process_log_data(&ctx, &config.input, &config.output, &config.options)
                .await
                .context(PipelineSnafu)?]
        }
        Command::Run { .. } => run_pipeline(&ctx, &config).await.context(PipelineSnafu)?,
    };

    for report in &reports {
        print_report(report);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

//! Podium CLI binary.
//!
//! Builds the weekly top-results report of a sim racing club.

mod logging;
mod settings;
mod source;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use logging::{LogConfig, LogFormat, init_logging};
use podium::data::DataSource;
use podium::output::{ExportFormat, report_file_name, write_report};
use podium::{Pipeline, PipelineConfig};
use serde_json::json;
use settings::{PipelineArgs, load_config};
use source::Source;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "podium")]
#[command(about = "Podium: weekly top results of a sim racing club", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (defaults to <config dir>/podium/podium.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read data from a JSON fixture instead of the iRacing API
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// iRacing account email
    #[arg(long, env = "IRACING_USERNAME", global = true)]
    username: Option<String>,

    /// iRacing account password
    #[arg(long, env = "IRACING_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the top results of each category
    Report {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Directory receiving one report per category
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Report format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// List the active seasons
    Seasons {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the club's drivers
    Drivers {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Print JSON instead of one id per line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may come from a .env file; variables already set win.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let global = cli.global;

    let log_config = LogConfig::from_verbosity(global.verbose, global.log_format);
    init_logging(&log_config);
    let show_progress = log_config.is_quiet() && log_config.with_ansi;

    let file_config = load_config(global.config.as_deref())?;
    let source =
        Source::connect(global.fixture.as_deref(), global.username, global.password).await?;

    match cli.command {
        Commands::Report {
            pipeline,
            output_dir,
            format,
        } => {
            let config = pipeline.apply(file_config);
            write_reports(&source, config, &output_dir, format, show_progress).await?;
        }
        Commands::Seasons { json } => {
            list_seasons(&source, json).await?;
        }
        Commands::Drivers { pipeline, json } => {
            let config = pipeline.apply(file_config);
            list_drivers(&source, config, json).await?;
        }
    }

    Ok(())
}

fn spinner(message: String, visible: bool) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

async fn write_reports(
    source: &Source,
    config: PipelineConfig,
    output_dir: &Path,
    format: ExportFormat,
    show_progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(source, config)?;

    let pb = spinner("Discovering club drivers...".to_string(), show_progress)?;
    let discovery = match pipeline.discover().await {
        Ok(d) => {
            pb.finish_with_message(format!(
                "Found {} drivers in {} seasons",
                d.drivers.len(),
                d.seasons.len()
            ));
            d
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };
    if !discovery.is_complete() {
        eprintln!(
            "Warning: standings unavailable for {} of {} seasons",
            discovery.failed_seasons.len(),
            discovery.seasons.len()
        );
    }

    std::fs::create_dir_all(output_dir)?;

    for &category in &pipeline.config().categories {
        let pb = spinner(format!("Building {} report...", category), show_progress)?;
        let report = pipeline.run_category(&discovery.drivers, category).await;

        let path = output_dir.join(report_file_name(
            category,
            report.quarter,
            report.race_week,
            format,
        ));
        let rows = write_report(&report.results, &path, format)?;
        pb.finish_with_message(format!("Wrote {} rows to {}", rows, path.display()));

        println!("{}", report.summary());
    }

    Ok(())
}

async fn list_seasons(source: &Source, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let seasons = source.active_seasons().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&seasons)?);
        return Ok(());
    }

    println!("{:>10}  Series", "Season");
    println!("{}", "-".repeat(60));
    for season in &seasons {
        println!("{:>10}  {}", season.season_id, season.series_name);
    }
    println!("\n{} active seasons", seasons.len());
    Ok(())
}

async fn list_drivers(
    source: &Source,
    config: PipelineConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(source, config)?;
    let discovery = pipeline.discover().await?;

    if json {
        let output = json!({
            "club_id": pipeline.config().club_id,
            "drivers": discovery.drivers,
            "seasons_scanned": discovery.seasons.len(),
            "failed_seasons": discovery.failed_seasons,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for driver in &discovery.drivers {
        println!("{}", driver);
    }
    Ok(())
}

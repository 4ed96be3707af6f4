//! CLI entry point for the traffic modeler.
//!
//! Builds per-edge traffic records from hourly vehicle counts and a SUMO
//! network, then saves them, exports the model curves, or logs them.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use traffic_modeler::curves::curve::DEFAULT_SAMPLES;
use traffic_modeler::output::{print_json, print_pretty, write_records};
use traffic_modeler::parser::DateFilter;
use traffic_modeler::time_slot::TimeSlot;
use traffic_modeler::{ModelType, ModelerConfig, TrafficModeler};

#[derive(Parser)]
#[command(name = "traffic_modeler")]
#[command(about = "Fit road traffic counts against macroscopic flow models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Semicolon-delimited CSV of hourly vehicle counts per edge
    #[arg(value_name = "DATA_FILE")]
    data_file: PathBuf,

    /// SUMO network file (.net.xml)
    #[arg(value_name = "NETWORK_FILE")]
    network_file: PathBuf,

    /// Only keep rows whose date contains this value (YYYY, YYYY-MM or YYYY-MM-DD)
    #[arg(short, long)]
    date: Option<DateFilter>,

    /// Time window to evaluate, as HH:MM-HH:MM
    #[arg(short, long, default_value = "00:00-24:00")]
    time_slot: TimeSlot,

    /// Flow model: greenshield or underwood
    #[arg(short, long, default_value = "greenshield")]
    model: ModelType,
}

impl InputArgs {
    fn config(&self) -> ModelerConfig {
        let config = ModelerConfig::new(&self.data_file, &self.network_file)
            .with_time_slot(self.time_slot)
            .with_model_type(self.model);
        match &self.date {
            Some(date) => config.with_date(date.clone()),
            None => config,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Derive traffic records and save them as CSV
    Model {
        #[command(flatten)]
        input: InputArgs,

        /// CSV file to write the records to
        #[arg(short, long, default_value = "data/model_data.csv")]
        output: PathBuf,

        /// Decimal separator used for numbers in the output
        #[arg(long, default_value_t = ',')]
        decimal_separator: char,
    },
    /// Export theoretical and observed curves as JSON
    Curves {
        #[command(flatten)]
        input: InputArgs,

        /// JSON file to write; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Density samples per theoretical curve
        #[arg(short, long, default_value_t = DEFAULT_SAMPLES)]
        samples: usize,
    },
    /// Log the derived records
    Show {
        #[command(flatten)]
        input: InputArgs,

        /// Log as JSON instead of debug format
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/traffic_modeler.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("traffic_modeler.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Model {
            input,
            output,
            decimal_separator,
        } => {
            let modeler = build(&input)?;
            write_records(&output, modeler.records(), decimal_separator)
                .with_context(|| format!("failed to save model data to {}", output.display()))?;
            info!(output = %output.display(), records = modeler.len(), "New model data saved");
        }
        Commands::Curves {
            input,
            output,
            samples,
        } => {
            let modeler = build(&input)?;
            let bundle = modeler.curve_bundle(samples);
            let json = serde_json::to_string_pretty(&bundle)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write curves to {}", path.display()))?;
                    info!(output = %path.display(), groups = bundle.groups.len(), "Curves exported");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{json}")?;
                }
            }
        }
        Commands::Show { input, json } => {
            let modeler = build(&input)?;
            if json {
                print_json(modeler.records())?;
            } else {
                print_pretty(modeler.records());
            }
        }
    }

    Ok(())
}

/// Builds the modeler for the given inputs.
#[tracing::instrument(skip_all, fields(model = %input.model, time_slot = %input.time_slot))]
fn build(input: &InputArgs) -> Result<TrafficModeler> {
    let config = input.config();
    TrafficModeler::from_config(&config).with_context(|| {
        format!(
            "failed to build traffic model from {} and {}",
            config.data_file.display(),
            config.network_file.display()
        )
    })
}

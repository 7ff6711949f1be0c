use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use soa_extract::{
    Extraction, ExtractionReport, ExtractionStatus, HeaderStrategy, OutputFormat, ScheduleConfig,
    ScheduleExtractor, TableQualification, parse_tree, render_matrix,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "soa2csv",
    version,
    about = "Recover the Schedule of Activities from a converted protocol tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the procedure x visit matrix and write it out.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input document tree (JSON).
    #[arg(short, long)]
    input: PathBuf,

    /// Output path. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: wide, long or json.
    #[arg(long, default_value = "wide")]
    format: String,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Header row strategy: scored or first-match.
    #[arg(long)]
    header_strategy: Option<String>,

    /// Table qualification: visits-and-procedures or visits-only.
    #[arg(long)]
    qualification: Option<String>,

    /// Accepted rows required before a rejection run may end the schedule.
    #[arg(long)]
    procedure_floor: Option<usize>,

    /// Consecutive rejected rows that end the schedule.
    #[arg(long)]
    rejection_ceiling: Option<usize>,

    /// Accepted rows required before a section heading may end the schedule.
    #[arg(long)]
    section_break_floor: Option<usize>,

    /// Distinct visits a table needs to count as a schedule.
    #[arg(long)]
    min_table_visits: Option<usize>,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &ExtractArgs) -> Result<ScheduleConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?;
            ScheduleConfig::from_json_str(&json)
                .with_context(|| format!("invalid config '{}'", path.display()))?
        }
        None => ScheduleConfig::default(),
    };

    if let Some(value) = args.header_strategy.as_deref() {
        config.header_strategy = value
            .parse::<HeaderStrategy>()
            .map_err(|error| anyhow!(error))
            .context("failed to parse --header-strategy")?;
    }
    if let Some(value) = args.qualification.as_deref() {
        config.table_qualification = value
            .parse::<TableQualification>()
            .map_err(|error| anyhow!(error))
            .context("failed to parse --qualification")?;
    }
    if let Some(value) = args.procedure_floor {
        config.procedure_floor = value;
    }
    if let Some(value) = args.rejection_ceiling {
        config.rejection_ceiling = value;
    }
    if let Some(value) = args.section_break_floor {
        config.section_break_floor = value;
    }
    if let Some(value) = args.min_table_visits {
        config.min_table_visits = value;
    }
    Ok(config)
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.status != ExtractionStatus::Extracted {
        eprintln!("warning: {}", report.status.code());
    }
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {} table_id={:?} row={:?}: {}",
                warning.code.as_str(),
                warning.table_id,
                warning.row,
                warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<Extraction> {
    let format = args
        .format
        .parse::<OutputFormat>()
        .map_err(|error| anyhow!(error))
        .context("failed to parse --format")?;
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let extractor = ScheduleExtractor::new(load_config(args)?).context("invalid configuration")?;
    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let root = parse_tree(&json)
        .with_context(|| format!("failed to parse document tree '{}'", args.input.display()))?;

    let extraction = extractor.extract(&root);
    let rendered = render_matrix(&extraction.matrix, format, args.delimiter as u8)
        .context("failed to render schedule")?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(extraction)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soa_extract=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(extraction) => {
                log_report(&extraction.report, args.verbose);
                if extraction.matrix.procedure_order().is_empty() {
                    ExitCode::from(2)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use pipeline_cleaner::batch::{BatchOptions, BatchOutcome, BatchRunner, OutputTarget};
use pipeline_cleaner::classify::types::{ProcessOptions, RegionLabel, StatusLabel};
use pipeline_cleaner::config::ClassifierConfig;
use pipeline_cleaner::table::{ExportFormat, save_reports};
use pipeline_cleaner::PipelineProcessor;

/// Classify sales pipeline exports by status and region
#[derive(Debug, Parser)]
#[command(name = "pipeline-cleaner", version, about)]
struct Cli {
    /// Pipeline export (.csv, .xlsx) or a directory of exports
    input: PathBuf,

    /// Output file for a single input, or output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format; inferred from --output when it names a file
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Classifier configuration file (.toml, .yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON run report to this file
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Number of classification threads
    #[arg(short, long)]
    threads: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Xlsx,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(outcome) if outcome.failures.is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<BatchOutcome> {
    let config = match &cli.config {
        Some(path) => ClassifierConfig::from_file(path)?,
        None => ClassifierConfig::default(),
    };

    let options = batch_options(&cli)?;
    let processor = PipelineProcessor::new(&config, ProcessOptions {
        parallel_threads: cli.threads,
        ..ProcessOptions::default()
    });

    let outcome = BatchRunner::new(processor, options).run(&cli.input)?;

    if let Some(path) = &cli.report {
        save_reports(&outcome.reports, path)?;
    }

    print_summary(&outcome);
    Ok(outcome)
}

fn batch_options(cli: &Cli) -> Result<BatchOptions> {
    let inferred = cli.output.as_deref().and_then(ExportFormat::from_path);

    let format = match (cli.format.map(ExportFormat::from), inferred) {
        (Some(requested), Some(inferred)) if requested != inferred => {
            bail!("--format {:?} conflicts with output file extension", requested);
        }
        (Some(requested), _) => requested,
        (None, Some(inferred)) => inferred,
        (None, None) => ExportFormat::Xlsx,
    };

    let output = match &cli.output {
        Some(path) if inferred.is_some() => OutputTarget::File(path.clone()),
        Some(dir) => OutputTarget::Directory(dir.clone()),
        None => OutputTarget::BesideInput,
    };

    Ok(BatchOptions { output, format })
}

fn print_summary(outcome: &BatchOutcome) {
    let summary = &outcome.summary;

    println!("Final Status Count");
    for status in StatusLabel::ALL {
        println!("  {:<22} {}", status.display_name(), summary.status_count(status));
    }

    println!("Region Count");
    for region in RegionLabel::ALL {
        println!("  {:<22} {}", region.display_name(), summary.region_count(region));
    }

    println!("Verified: {} items identified as 'On Hold'", summary.hold_count());

    for report in &outcome.reports {
        if let Some(output) = &report.output {
            info!("{} -> {}", report.source.display(), output.display());
        }
    }
    for (file, error) in &outcome.failures {
        warn!("Skipped {}: {}", file.display(), error);
    }
}

// In: src/main.rs

//! Command-line front end for the tidegauge pipeline.
//!
//! Parses arguments, builds a `PipelineConfig`, starts the run on a worker
//! thread and renders its events on this one.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;

use tidegauge::{GapPolicy, PipelineConfig, PipelineError, PipelineEvent, PipelineRunner, Severity};

//==================================================================================
// 1. Arguments
//==================================================================================

#[derive(Parser, Debug)]
#[clap(
    name = "tidegauge",
    version,
    about = "Fill single-sample gaps in a tide-gauge series and split it into continuous segments"
)]
struct Cli {
    /// Tab-separated station export (timestamp, value)
    input: PathBuf,

    /// Directory that receives the segment files
    output_dir: PathBuf,

    #[clap(long)]
    /// JSON config file; command-line flags override its values
    config: Option<PathBuf>,

    #[clap(long)]
    /// Nominal sampling interval in seconds
    interval_secs: Option<i64>,

    #[clap(long)]
    /// Monte Carlo draws per interpolated value
    simulations: Option<usize>,

    #[clap(long)]
    /// Seed the estimator for reproducible output
    seed: Option<u64>,

    #[clap(long)]
    /// Also start a new segment at irregular gaps
    strict_gaps: bool,

    #[clap(long)]
    /// Write manifest.json next to the segments
    manifest: bool,

    #[clap(long)]
    /// Append diagnostic log lines to this file instead of stderr
    log_file: Option<PathBuf>,

    #[clap(short, long)]
    /// Enable debug logging
    verbose: bool,
}

impl Cli {
    fn build_config(&self) -> Result<PipelineConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(secs) = self.interval_secs {
            config.sampling_interval_secs = secs;
        }
        if let Some(n) = self.simulations {
            config.estimator.num_simulations = n;
        }
        if self.seed.is_some() {
            config.estimator.seed = self.seed;
        }
        if self.strict_gaps {
            config.gap_policy = GapPolicy::Strict;
        }
        if self.manifest {
            config.export.write_manifest = true;
        }
        config.validate()?;
        Ok(config)
    }
}

//==================================================================================
// 2. Logging
//==================================================================================

fn init_logging(verbose: bool, log_file: Option<&PathBuf>) -> Result<(), PipelineError> {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    // Just the level and the message.
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    let _ = builder.try_init();
    Ok(())
}

//==================================================================================
// 3. Rendering
//==================================================================================

fn render_status(severity: Severity, message: &str) {
    match severity {
        Severity::Info => println!("{}", message),
        Severity::Success => println!("{}", message.green()),
        Severity::Warning => println!("{}", message.yellow()),
        Severity::Error => eprintln!("{}", message.red().bold()),
        Severity::Complete => println!("{}", message.green().bold()),
    }
}

/// Prints a progress line whenever the whole-percent value changes.
struct ProgressLine {
    last_percent: Option<u32>,
}

impl ProgressLine {
    fn update(&mut self, fraction: f64, label: &str) {
        let percent = (fraction * 100.0).round() as u32;
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        println!("{} {}", format!("[{:>3}%]", percent).dimmed(), label);
    }
}

//==================================================================================
// 4. Entry Point
//==================================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_ref()) {
        eprintln!("{}", format!("cannot open log file: {}", e).red());
        return ExitCode::FAILURE;
    }

    let config = match cli.build_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_string().red().bold());
            return ExitCode::from(2);
        }
    };
    log::debug!("effective config: {:?}", config);

    let runner = PipelineRunner::new(Arc::new(config));
    let handle = match runner.spawn(cli.input.clone(), cli.output_dir.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{}", e.to_string().red().bold());
            return ExitCode::FAILURE;
        }
    };

    let mut progress = ProgressLine { last_percent: None };
    for event in handle.events().iter() {
        match event {
            PipelineEvent::Progress { fraction, label } => progress.update(fraction, &label),
            PipelineEvent::Log { severity, message } => render_status(severity, &message),
        }
    }

    match handle.join() {
        Ok(summary) => {
            println!(
                "{} segment(s), {} row(s) written, {} interpolated.",
                summary.segment_count(),
                summary.rows_written(),
                summary.rows_interpolated
            );
            ExitCode::SUCCESS
        }
        // The error line has already been rendered from the event stream.
        Err(e) => {
            log::debug!("run failed with {:?}", e.kind());
            ExitCode::FAILURE
        }
    }
}

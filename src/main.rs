use anyhow::{Context, Result};
use clap::Parser;
use hartlog::cli::{Cli, OutputFormat};
use hartlog::config::{ConfigFile, SanitizerOptions};
use hartlog::sanitizer::sanitize_file;
use hartlog::verdict::{DebuggerVerdict, TrialVerdict};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE, otherwise RUST_LOG
/// applies with a default of `warn`
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Layer defaults, config file and command-line flags
fn resolve_options(args: &Cli) -> Result<SanitizerOptions> {
    let mut options = match &args.config {
        Some(path) => ConfigFile::from_file(path)?.sanitizer,
        None => SanitizerOptions::default(),
    };

    if let Some(cores) = args.cores {
        options.cores = cores;
    }
    if let Some(dir) = &args.output_dir {
        options.output_dir = dir.clone();
    }
    if args.skip_blank {
        options.skip_blank_lines = true;
    }

    options.validate()?;
    Ok(options)
}

fn print_verdict(verdict: &TrialVerdict) {
    if verdict.exceptions().is_empty() {
        println!("verdict: {}", verdict.status());
    } else {
        println!(
            "verdict: {} (exceptions: {})",
            verdict.status(),
            verdict.exceptions().join(", ")
        );
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let options = resolve_options(&args)?;

    let verdict = match args.success_marker.as_deref() {
        Some(marker) => {
            let verdict = TrialVerdict::classify_file(&args.log, marker)
                .with_context(|| format!("Failed to read {}", args.log.display()))?;
            if verdict.passed() {
                tracing::info!("trial output passed");
            } else {
                tracing::warn!(
                    marker_found = verdict.success_marker_found(),
                    exceptions = verdict.exceptions().len(),
                    "trial output failed"
                );
            }
            Some(verdict)
        }
        None => None,
    };

    let debugger = match &args.debugger_transcript {
        Some(path) => {
            let debugger = DebuggerVerdict::classify_file(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if !debugger.passed() {
                tracing::warn!(transcript = %path.display(), verdict = ?debugger, "debugger run failed");
            }
            Some(debugger)
        }
        None => None,
    };

    let report = sanitize_file(&args.log, &options)
        .with_context(|| format!("Failed to sanitize {}", args.log.display()))?;

    report.output.write_to(&options.output_dir).with_context(|| {
        format!(
            "Failed to write sanitized logs to {}",
            options.output_dir.display()
        )
    })?;

    if args.summary {
        match args.format {
            OutputFormat::Text => print!("{}", report.stats.format_text(verdict.as_ref())),
            OutputFormat::Json => println!("{}", report.stats.to_json(verdict.as_ref())?),
        }
    } else if let Some(verdict) = &verdict {
        print_verdict(verdict);
    }

    // JSON summaries keep stdout machine-readable; the warning above covers failures
    if let Some(debugger) = debugger {
        if !(args.summary && args.format == OutputFormat::Json) {
            println!("debugger: {}", debugger.status());
        }
    }

    Ok(())
}

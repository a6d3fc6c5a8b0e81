//! Convert command - translate one build file.

use super::{infer_direction, read_input, report_diagnostics};
use anyhow::Context;
use buildbridge_config::Config;
use buildbridge_syntax::{Direction, convert_report};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert command arguments
#[derive(Args)]
pub struct ConvertArgs {
    /// Conversion direction: gn-to-cmake or cmake-to-gn
    /// (default: config `conversion.mode`, then inferred from the input name)
    #[arg(short, long)]
    pub mode: Option<Direction>,

    /// Input build file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail without writing anything if any fragment had to be skipped
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ConvertArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let direction = match args.mode {
        Some(direction) => direction,
        None => config
            .direction()?
            .or_else(|| infer_direction(&args.input))
            .with_context(|| {
                format!(
                    "cannot infer a direction for {}; pass --mode",
                    args.input.display()
                )
            })?,
    };
    let text = read_input(&args.input)?;
    let options = config.convert_options()?;

    let report = convert_report(&text, direction, &options);
    report_diagnostics(&args.input, &report.diagnostics);
    if args.strict && !report.diagnostics.is_empty() {
        anyhow::bail!(
            "{}: {} fragment(s) skipped (--strict)",
            args.input.display(),
            report.diagnostics.len()
        );
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", report.output))
                .with_context(|| format!("failed to write {}", path.display()))?;
            if direction == Direction::GnToCmake {
                eprintln!(
                    "wrote {} target(s) to {}; configure with `cmake -G {}`",
                    report.targets.len(),
                    path.display(),
                    config.cmake.generator
                );
            }
        }
        None => println!("{}", report.output),
    }
    Ok(ExitCode::SUCCESS)
}

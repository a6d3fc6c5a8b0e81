//! Parse command - dump the target IR read from one build file.

use super::{read_input, report_diagnostics};
use anyhow::Context;
use buildbridge_syntax::{reader_for_language, reader_for_path};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

/// Parse command arguments
#[derive(Args)]
pub struct ParseArgs {
    /// Input build file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Source language: gn or cmake (auto-detect from the file name otherwise)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

pub fn run(args: ParseArgs) -> anyhow::Result<ExitCode> {
    let reader = match &args.language {
        Some(lang) => reader_for_language(lang)
            .with_context(|| format!("unknown language {lang:?} (expected gn or cmake)"))?,
        None => reader_for_path(&args.input).with_context(|| {
            format!(
                "cannot detect the language of {}; pass --language",
                args.input.display()
            )
        })?,
    };
    let text = read_input(&args.input)?;
    let parsed = reader.read(&text);
    report_diagnostics(&args.input, &parsed.diagnostics);

    let rendered = match args.format {
        Format::Json => serde_json::to_string_pretty(&parsed)?,
        Format::Yaml => serde_yaml::to_string(&parsed)?,
    };
    println!("{}", rendered.trim_end());
    Ok(ExitCode::SUCCESS)
}

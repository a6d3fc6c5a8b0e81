//! Batch command - convert a directory tree of build files in parallel.

use super::{read_input, report_diagnostics};
use anyhow::Context;
use buildbridge_config::Config;
use buildbridge_syntax::{ConvertOptions, Direction, convert_report, reader_for_path};
use clap::Args;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Batch command arguments
#[derive(Args)]
pub struct BatchArgs {
    /// Conversion direction (default: config `conversion.mode`, then gn-to-cmake)
    #[arg(short, long)]
    pub mode: Option<Direction>,

    /// Directory to scan (default: config `project.gn_root`)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory to write into, mirroring the input layout
    /// (default: config `project.output_dir`)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Treat a file with skipped fragments as failed and do not write it
    #[arg(long)]
    pub strict: bool,
}

struct Job<'a> {
    direction: Direction,
    options: &'a ConvertOptions,
    input_dir: &'a Path,
    output_dir: &'a Path,
    strict: bool,
}

pub fn run(args: BatchArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let direction = match args.mode {
        Some(direction) => direction,
        None => config.direction()?.unwrap_or(Direction::GnToCmake),
    };
    let input_dir = args.input_dir.unwrap_or_else(|| config.project.gn_root.clone());
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.project.output_dir.clone());
    let options = config.convert_options()?;

    let files = collect_inputs(&input_dir, &output_dir, direction);
    tracing::debug!(count = files.len(), input = %input_dir.display(), "found build files");

    let job = Job {
        direction,
        options: &options,
        input_dir: &input_dir,
        output_dir: &output_dir,
        strict: args.strict,
    };
    let results: Vec<(PathBuf, anyhow::Result<usize>)> = files
        .into_par_iter()
        .map(|file| {
            let result = job.convert_one(&file);
            (file, result)
        })
        .collect();

    let mut converted = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for (file, result) in results {
        match result {
            Ok(diagnostics) => {
                converted += 1;
                skipped += diagnostics;
            }
            Err(err) => {
                failed += 1;
                eprintln!("error: {}: {err:#}", file.display());
            }
        }
    }
    println!("converted {converted} file(s), {failed} failed, {skipped} fragment(s) skipped");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Build files for `direction` under `input_dir`, in a stable order. The
/// output directory is never scanned, even when nested inside the input.
fn collect_inputs(input_dir: &Path, output_dir: &Path, direction: Direction) -> Vec<PathBuf> {
    let skip = output_dir.canonicalize().ok();
    WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !entry.file_type().is_dir()
                || skip.is_none()
                || entry.path().canonicalize().ok() != skip
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            reader_for_path(path)
                .is_some_and(|reader| reader.language() == direction.source_language())
        })
        .collect()
}

/// Where the conversion of `file` goes: conventional build files become the
/// other language's conventional name, anything else keeps its full file name
/// with the target extension appended, so `x.gn` and `x.gni` never collide.
fn output_path(input_dir: &Path, output_dir: &Path, file: &Path, direction: Direction) -> PathBuf {
    let rel = file.strip_prefix(input_dir).unwrap_or(file);
    let is_conventional = reader_for_path(file).is_some_and(|reader| {
        file.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| reader.file_names().contains(&name))
    });
    let name = if is_conventional {
        direction.output_file_name().to_string()
    } else {
        let base = file.file_name().and_then(|s| s.to_str()).unwrap_or("build");
        let ext = match direction {
            Direction::GnToCmake => "cmake",
            Direction::CmakeToGn => "gni",
        };
        format!("{base}.{ext}")
    };
    output_dir.join(rel).with_file_name(name)
}

impl Job<'_> {
    fn convert_one(&self, file: &Path) -> anyhow::Result<usize> {
        let text = read_input(file)?;
        let report = convert_report(&text, self.direction, self.options);
        report_diagnostics(file, &report.diagnostics);
        if self.strict && !report.diagnostics.is_empty() {
            anyhow::bail!("{} fragment(s) skipped (--strict)", report.diagnostics.len());
        }

        let out = output_path(self.input_dir, self.output_dir, file, self.direction);
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&out, format!("{}\n", report.output))
            .with_context(|| format!("failed to write {}", out.display()))?;
        tracing::debug!(from = %file.display(), to = %out.display(), "converted");
        Ok(report.diagnostics.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let input = Path::new("src");
        let output = Path::new("out");
        assert_eq!(
            output_path(input, output, Path::new("src/net/BUILD.gn"), Direction::GnToCmake),
            Path::new("out/net/CMakeLists.txt")
        );
        assert_eq!(
            output_path(input, output, Path::new("src/build/flags.gni"), Direction::GnToCmake),
            Path::new("out/build/flags.gni.cmake")
        );
        assert_eq!(
            output_path(input, output, Path::new("src/build/deps.cmake"), Direction::CmakeToGn),
            Path::new("out/build/deps.cmake.gni")
        );
    }

    #[test]
    fn test_output_path_keeps_sibling_extensions_apart() {
        let input = Path::new("src");
        let output = Path::new("out");
        let gn = output_path(input, output, Path::new("src/x.gn"), Direction::GnToCmake);
        let gni = output_path(input, output, Path::new("src/x.gni"), Direction::GnToCmake);
        assert_ne!(gn, gni);
        assert_eq!(gn, Path::new("out/x.gn.cmake"));
        assert_eq!(gni, Path::new("out/x.gni.cmake"));
        assert_eq!(
            output_path(input, output, Path::new("src/CMakeLists.txt"), Direction::CmakeToGn),
            Path::new("out/BUILD.gn")
        );
    }
}

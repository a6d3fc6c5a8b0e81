//! Subcommands.

pub mod batch;
pub mod convert;
pub mod parse;

use anyhow::Context;
use buildbridge_syntax::{Direction, ParseError, reader_for_path};
use std::path::Path;

pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Direction implied by an input file's name or extension.
pub(crate) fn infer_direction(path: &Path) -> Option<Direction> {
    match reader_for_path(path)?.language() {
        "gn" => Some(Direction::GnToCmake),
        "cmake" => Some(Direction::CmakeToGn),
        _ => None,
    }
}

pub(crate) fn report_diagnostics(path: &Path, diagnostics: &[ParseError]) {
    for diagnostic in diagnostics {
        tracing::warn!(
            "{}:{}:{}: skipped: {}",
            path.display(),
            diagnostic.line,
            diagnostic.column,
            diagnostic.message
        );
    }
}

//! Traits for build-file readers and writers.

use crate::error::ParseError;
use crate::ir::Target;
use serde::Serialize;

/// Targets read from one text, plus every fragment that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parsed {
    pub targets: Vec<Target>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ParseError>,
}

/// A reader parses a build file into targets.
///
/// Readers are stateless; one instance may serve any number of threads.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "gn", "cmake").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["gn", "gni"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Conventional file names this reader handles (e.g., &["BUILD.gn"]).
    fn file_names(&self) -> &'static [&'static str];

    /// Parse source text. Never fails: malformed fragments are skipped and
    /// reported in [`Parsed::diagnostics`].
    fn read(&self, source: &str) -> Parsed;
}

/// A writer renders one target as build-file text.
pub trait Writer: Send + Sync {
    /// Language identifier (e.g., "cmake", "gn").
    fn language(&self) -> &'static str;

    /// Conventional output file name (e.g., "CMakeLists.txt").
    fn file_name(&self) -> &'static str;

    /// Render one target. Deterministic; never fails for a known kind.
    fn write(&self, target: &Target) -> String;
}

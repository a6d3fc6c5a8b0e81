//! GN ↔ CMake conversion: one reader, one writer, per direction.

use crate::error::{ConversionError, ParseError};
use crate::input::{read_cmake, read_gn};
use crate::ir::Target;
use crate::output::{CmakeWriter, GnWriter, unknown_placeholder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which way to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    GnToCmake,
    CmakeToGn,
}

impl Direction {
    pub fn source_language(self) -> &'static str {
        match self {
            Direction::GnToCmake => "gn",
            Direction::CmakeToGn => "cmake",
        }
    }

    pub fn target_language(self) -> &'static str {
        match self {
            Direction::GnToCmake => "cmake",
            Direction::CmakeToGn => "gn",
        }
    }

    /// Conventional name of the file this direction writes.
    pub fn output_file_name(self) -> &'static str {
        match self {
            Direction::GnToCmake => "CMakeLists.txt",
            Direction::CmakeToGn => "BUILD.gn",
        }
    }
}

impl FromStr for Direction {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "gn-to-cmake" => Ok(Direction::GnToCmake),
            "cmake-to-gn" => Ok(Direction::CmakeToGn),
            _ => Err(ConversionError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::GnToCmake => f.write_str("gn-to-cmake"),
            Direction::CmakeToGn => f.write_str("cmake-to-gn"),
        }
    }
}

/// Include/exclude glob patterns on target names.
///
/// Exclude wins over include; an empty include list admits every name.
#[derive(Debug, Clone, Default)]
pub struct TargetFilter {
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl TargetFilter {
    pub fn new<I, E>(include: I, exclude: E) -> Result<Self, glob::PatternError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let compile = |p: &str| glob::Pattern::new(p);
        Ok(Self {
            include: include
                .into_iter()
                .map(|p| compile(p.as_ref()))
                .collect::<Result<_, _>>()?,
            exclude: exclude
                .into_iter()
                .map(|p| compile(p.as_ref()))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn from_patterns(include: Vec<glob::Pattern>, exclude: Vec<glob::Pattern>) -> Self {
        Self { include, exclude }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.exclude.iter().any(|p| p.matches(name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(name))
    }
}

/// Knobs a caller may set around the fixed conversion behavior.
///
/// The default reproduces [`convert`] exactly.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub cmake_minimum_version: String,
    pub project_name: String,
    pub c_standard: Option<String>,
    pub cxx_standard: Option<String>,
    pub filter: TargetFilter,
    /// GN label → CMake name, matched exactly. Inverted for CMake → GN.
    pub external_mapping: BTreeMap<String, String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            cmake_minimum_version: "3.20".to_string(),
            project_name: "gn_conversion".to_string(),
            c_standard: None,
            cxx_standard: None,
            filter: TargetFilter::default(),
            external_mapping: BTreeMap::new(),
        }
    }
}

impl ConvertOptions {
    /// File-level CMake statements that precede every target.
    fn cmake_preamble(&self) -> Vec<String> {
        let mut lines = vec![
            format!("cmake_minimum_required(VERSION {})", self.cmake_minimum_version),
            format!("project({})", self.project_name),
        ];
        if let Some(std) = &self.c_standard {
            lines.push(format!("set(CMAKE_C_STANDARD {std})"));
        }
        if let Some(std) = &self.cxx_standard {
            lines.push(format!("set(CMAKE_CXX_STANDARD {std})"));
        }
        lines
    }

    fn mapping_for(&self, direction: Direction) -> BTreeMap<&str, &str> {
        let pairs = self.external_mapping.iter();
        match direction {
            Direction::GnToCmake => pairs.map(|(k, v)| (k.as_str(), v.as_str())).collect(),
            Direction::CmakeToGn => pairs.map(|(k, v)| (v.as_str(), k.as_str())).collect(),
        }
    }
}

/// Result of a conversion, with everything the readers had to skip.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub output: String,
    /// Targets as written, after filtering and label remapping.
    pub targets: Vec<Target>,
    pub diagnostics: Vec<ParseError>,
}

/// Convert `text` with default options.
pub fn convert(text: &str, direction: Direction) -> String {
    convert_with(text, direction, &ConvertOptions::default())
}

pub fn convert_with(text: &str, direction: Direction, options: &ConvertOptions) -> String {
    convert_report(text, direction, options).output
}

/// Convert with the direction given by name, e.g. `"gn-to-cmake"`.
pub fn convert_str(text: &str, direction: &str) -> Result<String, ConversionError> {
    Ok(convert(text, direction.parse()?))
}

/// Read `input`, convert it, and write the result to `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    direction: Direction,
    options: &ConvertOptions,
) -> Result<Conversion, ConversionError> {
    let text = std::fs::read_to_string(input).map_err(|source| ConversionError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let conversion = convert_report(&text, direction, options);
    std::fs::write(output, &conversion.output).map_err(|source| ConversionError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(conversion)
}

pub fn convert_report(text: &str, direction: Direction, options: &ConvertOptions) -> Conversion {
    let parsed = match direction {
        Direction::GnToCmake => read_gn(text),
        Direction::CmakeToGn => read_cmake(text),
    };
    let mapping = options.mapping_for(direction);

    let mut blocks = match direction {
        Direction::GnToCmake => options.cmake_preamble(),
        Direction::CmakeToGn => Vec::new(),
    };
    let mut targets = Vec::with_capacity(parsed.targets.len());
    for mut target in parsed.targets {
        if !options.filter.matches(&target.name) {
            tracing::debug!(name = %target.name, "filtered out");
            continue;
        }
        if !mapping.is_empty() {
            target.map_deps(|dep| mapping.get(dep).copied().unwrap_or(dep).to_string());
        }
        blocks.push(write_target(&target, direction));
        targets.push(target);
    }

    Conversion {
        output: blocks.join("\n\n"),
        targets,
        diagnostics: parsed.diagnostics,
    }
}

fn write_target(target: &Target, direction: Direction) -> String {
    if let Err(err) = target.check() {
        tracing::warn!(name = %target.name, error = %err, "emitting placeholder");
        return unknown_placeholder(&target.name);
    }
    match direction {
        Direction::GnToCmake => {
            if target.kind.is_lossy_in_cmake() {
                tracing::warn!(
                    name = %target.name,
                    kind = %target.kind,
                    "no CMake equivalent; emitting a flagged custom target"
                );
            }
            CmakeWriter::emit(target)
        }
        Direction::CmakeToGn => GnWriter::emit(target),
    }
}

//! Translation between GN and CMake build descriptions.
//!
//! `buildbridge-syntax` reads either build language into a common target IR
//! and writes the IR back out in either language. It maps structure, not
//! semantics: variables are not expanded, imports are not followed, and
//! conditions are carried verbatim rather than evaluated.
//!
//! # Architecture
//!
//! ```text
//! Source Syntax           IR              Target Syntax
//! ─────────────     ──────────────     ──────────────
//! BUILD.gn       ─┐                 ┌─> CMakeLists.txt
//!                 ├─> Vec<Target> ──┤
//! CMakeLists.txt ─┘     (ir/)       └─> BUILD.gn
//! ```
//!
//! # Example
//!
//! ```
//! use buildbridge_syntax::{Direction, convert, input, output};
//!
//! let gn = r#"executable("hello") { sources = ["main.cc"] deps = [":lib"] }"#;
//!
//! let targets = input::parse_gn(gn);
//! assert_eq!(output::CmakeWriter::emit(&targets[0]),
//!     "add_executable(hello main.cc)\ntarget_link_libraries(hello lib)");
//!
//! let cmake = convert(gn, Direction::GnToCmake);
//! assert!(cmake.starts_with("cmake_minimum_required(VERSION 3.20)"));
//! ```
//!
//! # Failure model
//!
//! Readers never fail. A fragment they cannot make sense of is skipped and
//! reported as a [`ParseError`] diagnostic; the rest of the file still
//! parses. Writers never fail for a known target kind.
//!
//! # Lossy spots
//!
//! - GN labels become bare CMake names (`//net:http` → `http`), see [`labels`].
//! - CMake property commands take one visibility keyword for everything
//!   they list, see [`derive_visibility`].
//! - `generated_file` has no CMake construct and is flagged in the output.

pub mod error;
pub mod ir;
pub mod labels;
pub mod registry;
pub mod traits;

pub mod input;
pub mod output;

#[cfg(all(feature = "gn", feature = "cmake"))]
pub mod convert;

// Re-exports: IR types
pub use ir::{
    ConditionBlock, DepTier, Properties, PropertyKey, StructureEq, Target, TargetType, Visibility,
};

// Re-exports: Errors
pub use error::{ConversionError, GenerationError, ParseError};

// Re-exports: Traits
pub use traits::{Parsed, Reader, Writer};

// Re-exports: Registry
pub use registry::{
    reader_for_extension, reader_for_language, reader_for_path, readers, writer_for_language,
    writers,
};

// Re-exports: Built-in readers
#[cfg(feature = "gn")]
pub use input::{GnReader, parse_gn, read_gn};
#[cfg(feature = "cmake")]
pub use input::{CmakeReader, parse_cmake, read_cmake};

// Re-exports: Built-in writers
#[cfg(feature = "gn")]
pub use output::GnWriter;
#[cfg(feature = "cmake")]
pub use output::{CmakeWriter, derive_visibility};

// Re-exports: Conversion
#[cfg(all(feature = "gn", feature = "cmake"))]
pub use convert::{
    Conversion, ConvertOptions, Direction, TargetFilter, convert, convert_file, convert_report,
    convert_str, convert_with,
};

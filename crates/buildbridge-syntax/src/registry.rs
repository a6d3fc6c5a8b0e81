//! Registry for readers and writers.
//!
//! The set of build languages is closed and known at compile time, so the
//! registry is a pair of static tables rather than a mutable list.

use crate::traits::{Reader, Writer};
use std::path::Path;

static READERS: &[&dyn Reader] = &[
    #[cfg(feature = "gn")]
    &crate::input::gn::GN_READER,
    #[cfg(feature = "cmake")]
    &crate::input::cmake::CMAKE_READER,
];

static WRITERS: &[&dyn Writer] = &[
    #[cfg(feature = "gn")]
    &crate::output::gn::GN_WRITER,
    #[cfg(feature = "cmake")]
    &crate::output::cmake::CMAKE_WRITER,
];

/// Get a reader by language name.
pub fn reader_for_language(lang: &str) -> Option<&'static dyn Reader> {
    READERS
        .iter()
        .find(|r| r.language().eq_ignore_ascii_case(lang))
        .copied()
}

/// Get a reader by file extension.
pub fn reader_for_extension(ext: &str) -> Option<&'static dyn Reader> {
    READERS
        .iter()
        .find(|r| r.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .copied()
}

/// Get a reader for a path, by conventional file name first and extension
/// second.
pub fn reader_for_path(path: &Path) -> Option<&'static dyn Reader> {
    let file_name = path.file_name()?.to_str()?;
    READERS
        .iter()
        .find(|r| r.file_names().contains(&file_name))
        .copied()
        .or_else(|| reader_for_extension(path.extension()?.to_str()?))
}

/// Get a writer by language name.
pub fn writer_for_language(lang: &str) -> Option<&'static dyn Writer> {
    WRITERS
        .iter()
        .find(|w| w.language().eq_ignore_ascii_case(lang))
        .copied()
}

/// Get all registered readers.
pub fn readers() -> &'static [&'static dyn Reader] {
    READERS
}

/// Get all registered writers.
pub fn writers() -> &'static [&'static dyn Writer] {
    WRITERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "gn")]
    fn test_gn_lookup() {
        let reader = reader_for_language("gn").expect("gn reader");
        assert_eq!(reader.language(), "gn");
        assert!(reader.extensions().contains(&"gni"));

        let reader = reader_for_extension("GN").expect("gn extension");
        assert_eq!(reader.language(), "gn");

        let writer = writer_for_language("gn").expect("gn writer");
        assert_eq!(writer.file_name(), "BUILD.gn");
    }

    #[test]
    #[cfg(feature = "cmake")]
    fn test_cmake_lookup() {
        let reader = reader_for_path(Path::new("src/CMakeLists.txt")).expect("by file name");
        assert_eq!(reader.language(), "cmake");

        let reader = reader_for_path(Path::new("cmake/deps.cmake")).expect("by extension");
        assert_eq!(reader.language(), "cmake");

        let writer = writer_for_language("CMake").expect("cmake writer");
        assert_eq!(writer.file_name(), "CMakeLists.txt");
    }

    #[test]
    #[cfg(all(feature = "gn", feature = "cmake"))]
    fn test_roundtrip_via_registry() {
        let reader = reader_for_path(Path::new("BUILD.gn")).unwrap();
        let writer = writer_for_language("cmake").unwrap();

        let parsed = reader.read(r#"executable("hello") { sources = [ "main.cc" ] }"#);
        let cmake = writer.write(&parsed.targets[0]);

        assert_eq!(cmake, "add_executable(hello main.cc)");
        assert_eq!(readers().len(), 2);
        assert_eq!(writers().len(), 2);
    }

    #[test]
    fn test_unknown_lookups() {
        assert!(reader_for_language("bazel").is_none());
        assert!(reader_for_extension("bzl").is_none());
        assert!(reader_for_path(Path::new("Makefile")).is_none());
        assert!(writer_for_language("meson").is_none());
    }
}

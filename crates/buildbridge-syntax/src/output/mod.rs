//! Output writers - emit targets as build-file text.

#[cfg(feature = "gn")]
pub mod gn;

#[cfg(feature = "gn")]
pub use gn::{GN_WRITER, GnWriter, GnWriterImpl};

#[cfg(feature = "cmake")]
pub mod cmake;

#[cfg(feature = "cmake")]
pub use cmake::{CMAKE_WRITER, CmakeWriter, CmakeWriterImpl, derive_visibility};

/// Placeholder emitted for a target whose kind no writer can express.
pub(crate) fn unknown_placeholder(name: &str) -> String {
    format!("# Unknown target type: unknown ({name:?})")
}

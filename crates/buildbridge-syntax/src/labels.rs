//! Dependency label spelling between GN and CMake.
//!
//! GN names dependencies with labels (`":base"`, `"//net:http"`), CMake with
//! bare target names (`base`, `http`). Both functions are idempotent, so a
//! label that is already in the destination spelling passes through.
//!
//! The mapping is lossy: `//net:http` becomes `http`, and the directory part
//! cannot be recovered on the way back.

/// Spell a GN label as a CMake target name.
///
/// - `:name` → `name`
/// - `//dir:name` → `name`
/// - `//dir/name` → `name`
/// - anything else is returned unchanged
pub fn to_cmake_name(label: &str) -> String {
    if let Some(local) = label.strip_prefix(':') {
        return local.to_string();
    }
    if let Some(path) = label.strip_prefix("//") {
        if let Some((_, name)) = path.rsplit_once(':') {
            return name.to_string();
        }
        let last = path.rsplit('/').find(|part| !part.is_empty());
        return last.unwrap_or(path).to_string();
    }
    label.to_string()
}

/// Spell a CMake target name as a GN label.
///
/// Plain names become local labels (`base` → `:base`). Imported targets
/// (`ZLIB::ZLIB`), variable references, paths, linker flags and anything
/// already shaped like a label are kept verbatim.
pub fn to_gn_label(name: &str) -> String {
    if is_plain_name(name) {
        format!(":{name}")
    } else {
        name.to_string()
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'))
}

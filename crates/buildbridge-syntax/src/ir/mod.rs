//! Target IR shared by every reader and writer.
//!
//! The IR is structural data: labels, predicates and paths are opaque strings.
//! Nothing here evaluates a condition, expands a variable or resolves a
//! dependency label to another target.

mod properties;
mod structure_eq;

pub use properties::{Properties, PropertyKey, PropertyValue, TargetBuilder, ValueShape};
pub use structure_eq::StructureEq;

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a build target. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Executable,
    StaticLibrary,
    SharedLibrary,
    SourceSet,
    Group,
    Action,
    GeneratedFile,
    #[default]
    Unknown,
}

impl TargetType {
    /// Every kind, in declaration order.
    pub const ALL: [TargetType; 8] = [
        TargetType::Executable,
        TargetType::StaticLibrary,
        TargetType::SharedLibrary,
        TargetType::SourceSet,
        TargetType::Group,
        TargetType::Action,
        TargetType::GeneratedFile,
        TargetType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Executable => "executable",
            TargetType::StaticLibrary => "static_library",
            TargetType::SharedLibrary => "shared_library",
            TargetType::SourceSet => "source_set",
            TargetType::Group => "group",
            TargetType::Action => "action",
            TargetType::GeneratedFile => "generated_file",
            TargetType::Unknown => "unknown",
        }
    }

    /// GN function that declares this kind, `None` for `Unknown`.
    pub fn gn_function(self) -> Option<&'static str> {
        match self {
            TargetType::Unknown => None,
            known => Some(known.as_str()),
        }
    }

    /// Inverse of [`TargetType::gn_function`].
    pub fn from_gn_function(name: &str) -> Option<TargetType> {
        TargetType::ALL
            .into_iter()
            .find(|kind| kind.gn_function() == Some(name))
    }

    /// Kinds CMake has no construct for; writers flag them instead of
    /// silently mapping them onto something else.
    pub fn is_lossy_in_cmake(self) -> bool {
        matches!(self, TargetType::GeneratedFile)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency visibility tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepTier {
    Public,
    Private,
    /// No visibility was stated. Distinct from both public and private.
    Generic,
    /// Runtime-only dependency.
    Data,
}

/// Keyword used by CMake `target_*` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
    Interface,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Private => "PRIVATE",
            Visibility::Interface => "INTERFACE",
        }
    }
}

/// A predicate-gated set of property overrides.
///
/// The predicate is kept verbatim in the syntax it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionBlock {
    pub predicate: String,
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionBlock>,
}

impl ConditionBlock {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            ..Default::default()
        }
    }

    /// True if neither this block nor any nested block sets anything.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.conditions.iter().all(ConditionBlock::is_empty)
    }
}

/// One buildable or logical unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TargetType,
    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub deps: Vec<String>,
    pub public_deps: Vec<String>,
    pub private_deps: Vec<String>,
    pub data_deps: Vec<String>,
    pub compile_flags: Vec<String>,
    pub link_flags: Vec<String>,
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub visibility: Vec<String>,
    pub output_name: Option<String>,
    pub configs: Vec<String>,
    pub script: Option<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub response_file_name: Option<String>,
    pub testonly: bool,
    pub complete_static_lib: bool,
    pub conditions: Vec<ConditionBlock>,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetType) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Name is set and the kind is known.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.kind != TargetType::Unknown
    }

    pub fn is_library(&self) -> bool {
        matches!(
            self.kind,
            TargetType::StaticLibrary | TargetType::SharedLibrary | TargetType::SourceSet
        )
    }

    pub fn is_binary(&self) -> bool {
        self.kind == TargetType::Executable
    }

    pub fn deps_for_mut(&mut self, tier: DepTier) -> &mut Vec<String> {
        match tier {
            DepTier::Public => &mut self.public_deps,
            DepTier::Private => &mut self.private_deps,
            DepTier::Generic => &mut self.deps,
            DepTier::Data => &mut self.data_deps,
        }
    }

    /// Every dependency label across all tiers, in canonical tier order.
    pub fn all_deps(&self) -> impl Iterator<Item = &String> {
        self.public_deps
            .iter()
            .chain(&self.private_deps)
            .chain(&self.deps)
            .chain(&self.data_deps)
    }

    /// Rewrite every dependency label, including those inside conditions.
    pub fn map_deps(&mut self, mut f: impl FnMut(&str) -> String) {
        for tier in [DepTier::Public, DepTier::Private, DepTier::Generic, DepTier::Data] {
            for dep in self.deps_for_mut(tier).iter_mut() {
                *dep = f(dep.as_str());
            }
        }
        fn walk(blocks: &mut [ConditionBlock], f: &mut dyn FnMut(&str) -> String) {
            for block in blocks {
                block.properties.map_deps(&mut *f);
                walk(&mut block.conditions, f);
            }
        }
        walk(&mut self.conditions, &mut f);
    }

    /// Reject targets that no writer can emit sensibly.
    pub fn check(&self) -> Result<(), GenerationError> {
        if self.name.is_empty() {
            return Err(GenerationError::EmptyName);
        }
        if self
            .name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '(' | ')' | '{' | '}' | '#'))
        {
            return Err(GenerationError::InvalidName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let exe = Target::new("app", TargetType::Executable);
        assert!(exe.is_valid());
        assert!(exe.is_binary());
        assert!(!exe.is_library());

        for kind in [
            TargetType::StaticLibrary,
            TargetType::SharedLibrary,
            TargetType::SourceSet,
        ] {
            let lib = Target::new("lib", kind);
            assert!(lib.is_library());
            assert!(!lib.is_binary());
        }

        assert!(!Target::new("grp", TargetType::Group).is_library());
        assert!(!Target::new("", TargetType::Executable).is_valid());
        assert!(!Target::new("x", TargetType::Unknown).is_valid());
    }

    #[test]
    fn test_gn_function_roundtrip() {
        for kind in TargetType::ALL {
            match kind.gn_function() {
                Some(name) => assert_eq!(TargetType::from_gn_function(name), Some(kind)),
                None => assert_eq!(kind, TargetType::Unknown),
            }
        }
        assert_eq!(TargetType::from_gn_function("unknown"), None);
        assert_eq!(TargetType::from_gn_function("config"), None);
    }

    #[test]
    fn test_check_rejects_unprintable_names() {
        assert!(Target::new("ok_name", TargetType::Group).check().is_ok());
        assert!(matches!(
            Target::new("", TargetType::Group).check(),
            Err(GenerationError::EmptyName)
        ));
        assert!(matches!(
            Target::new("two words", TargetType::Group).check(),
            Err(GenerationError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_map_deps_reaches_conditions() {
        let mut target = Target::new("app", TargetType::Executable);
        target.deps = vec![":a".into()];
        let mut outer = ConditionBlock::new("is_linux");
        let mut inner = ConditionBlock::new("is_debug");
        inner.properties.public_deps = Some(vec![":b".into()]);
        outer.conditions.push(inner);
        target.conditions.push(outer);

        target.map_deps(|dep| dep.trim_start_matches(':').to_string());

        assert_eq!(target.deps, vec!["a"]);
        assert_eq!(
            target.conditions[0].conditions[0].properties.public_deps,
            Some(vec!["b".to_string()])
        );
    }

    #[test]
    fn test_serialized_shape() {
        let mut target = Target::new("gen", TargetType::GeneratedFile);
        let mut block = ConditionBlock::new("is_win");
        block.properties.outputs = Some(vec![]);
        target.conditions.push(block);

        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "generated_file");
        assert_eq!(json["conditions"][0]["properties"], serde_json::json!({ "outputs": [] }));

        let back: Target = serde_json::from_value(json).unwrap();
        assert_eq!(back, target);
    }

    #[test]
    fn test_nested_empty_blocks() {
        let mut outer = ConditionBlock::new("x");
        outer.conditions.push(ConditionBlock::new("y"));
        outer.conditions[0].conditions.push(ConditionBlock::new("z"));
        assert!(outer.is_empty());
        outer.conditions[0].conditions[0].properties.sources = Some(vec![]);
        assert!(!outer.is_empty());
    }
}

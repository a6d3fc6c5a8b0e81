//! Structural equality for IR types.
//!
//! `structure_eq` compares targets ignoring "surface hints" - details that
//! depend on which syntax a target was read from rather than on what it
//! describes.
//!
//! # Hint Fields (normalized during comparison)
//!
//! - Dependency labels - `":base"` (GN) and `base` (CMake) name the same
//!   target, so labels are compared after [`crate::labels::to_cmake_name`].
//!
//! # Core Fields (must match exactly)
//!
//! - Name, kind, every other list (order included), scalars and flags
//! - Condition predicates and nesting

use super::{ConditionBlock, Properties, PropertyKey, Target};
use crate::labels::to_cmake_name;

/// Trait for structural equality comparison.
///
/// Unlike `PartialEq`, this ignores surface hint fields that differ between
/// syntaxes but do not change the build description.
pub trait StructureEq {
    fn structure_eq(&self, other: &Self) -> bool;
}

impl StructureEq for Target {
    fn structure_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.testonly == other.testonly
            && self.complete_static_lib == other.complete_static_lib
            && self.properties().structure_eq(&other.properties())
            && vec_structure_eq(&self.conditions, &other.conditions)
    }
}

impl StructureEq for ConditionBlock {
    fn structure_eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate
            && self.properties.structure_eq(&other.properties)
            && vec_structure_eq(&self.conditions, &other.conditions)
    }
}

impl StructureEq for Properties {
    fn structure_eq(&self, other: &Self) -> bool {
        PropertyKey::ALL.iter().all(|&key| {
            let is_dep = matches!(
                key,
                PropertyKey::Deps
                    | PropertyKey::PublicDeps
                    | PropertyKey::PrivateDeps
                    | PropertyKey::DataDeps
            );
            match (self.list(key), other.list(key)) {
                (Some(a), Some(b)) if is_dep => labels_eq(a, b),
                (a, b) => {
                    a == b
                        && self.string(key) == other.string(key)
                        && self.flag(key) == other.flag(key)
                }
            }
        })
    }
}

impl<T: StructureEq> StructureEq for [T] {
    fn structure_eq(&self, other: &Self) -> bool {
        vec_structure_eq(self, other)
    }
}

fn labels_eq(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| to_cmake_name(x) == to_cmake_name(y))
}

fn vec_structure_eq<T: StructureEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structure_eq(y))
}

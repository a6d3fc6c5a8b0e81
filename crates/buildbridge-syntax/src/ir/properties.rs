//! Typed property map used while a target is being read.
//!
//! Every known key has its own `Option` field, so an absent property and an
//! explicitly empty list stay distinguishable until the target is built.

use super::{ConditionBlock, Target, TargetType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shape of the value a property key accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    List,
    String,
    Bool,
}

/// Known property keys, in GN emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Sources,
    Headers,
    PublicDeps,
    PrivateDeps,
    Deps,
    DataDeps,
    CompileFlags,
    LinkFlags,
    IncludeDirs,
    Defines,
    Visibility,
    Configs,
    Inputs,
    Outputs,
    Script,
    ResponseFileName,
    OutputName,
    Testonly,
    CompleteStaticLib,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 19] = [
        PropertyKey::Sources,
        PropertyKey::Headers,
        PropertyKey::PublicDeps,
        PropertyKey::PrivateDeps,
        PropertyKey::Deps,
        PropertyKey::DataDeps,
        PropertyKey::CompileFlags,
        PropertyKey::LinkFlags,
        PropertyKey::IncludeDirs,
        PropertyKey::Defines,
        PropertyKey::Visibility,
        PropertyKey::Configs,
        PropertyKey::Inputs,
        PropertyKey::Outputs,
        PropertyKey::Script,
        PropertyKey::ResponseFileName,
        PropertyKey::OutputName,
        PropertyKey::Testonly,
        PropertyKey::CompleteStaticLib,
    ];

    /// Look up a GN variable name. `cflags_c` and `cflags_cc` fold into the
    /// compile flags.
    pub fn from_gn(name: &str) -> Option<PropertyKey> {
        let key = match name {
            "sources" => PropertyKey::Sources,
            "headers" | "public" => PropertyKey::Headers,
            "deps" => PropertyKey::Deps,
            "public_deps" => PropertyKey::PublicDeps,
            "private_deps" => PropertyKey::PrivateDeps,
            "data_deps" => PropertyKey::DataDeps,
            "cflags" | "cflags_c" | "cflags_cc" => PropertyKey::CompileFlags,
            "ldflags" => PropertyKey::LinkFlags,
            "include_dirs" => PropertyKey::IncludeDirs,
            "defines" => PropertyKey::Defines,
            "visibility" => PropertyKey::Visibility,
            "configs" => PropertyKey::Configs,
            "inputs" => PropertyKey::Inputs,
            "outputs" => PropertyKey::Outputs,
            "script" => PropertyKey::Script,
            "response_file_name" => PropertyKey::ResponseFileName,
            "output_name" => PropertyKey::OutputName,
            "testonly" => PropertyKey::Testonly,
            "complete_static_lib" => PropertyKey::CompleteStaticLib,
            _ => return None,
        };
        Some(key)
    }

    /// Canonical GN variable name.
    pub fn gn_name(self) -> &'static str {
        match self {
            PropertyKey::Sources => "sources",
            PropertyKey::Headers => "public",
            PropertyKey::PublicDeps => "public_deps",
            PropertyKey::PrivateDeps => "private_deps",
            PropertyKey::Deps => "deps",
            PropertyKey::DataDeps => "data_deps",
            PropertyKey::CompileFlags => "cflags",
            PropertyKey::LinkFlags => "ldflags",
            PropertyKey::IncludeDirs => "include_dirs",
            PropertyKey::Defines => "defines",
            PropertyKey::Visibility => "visibility",
            PropertyKey::Configs => "configs",
            PropertyKey::Inputs => "inputs",
            PropertyKey::Outputs => "outputs",
            PropertyKey::Script => "script",
            PropertyKey::ResponseFileName => "response_file_name",
            PropertyKey::OutputName => "output_name",
            PropertyKey::Testonly => "testonly",
            PropertyKey::CompleteStaticLib => "complete_static_lib",
        }
    }

    pub fn shape(self) -> ValueShape {
        match self {
            PropertyKey::Script | PropertyKey::ResponseFileName | PropertyKey::OutputName => {
                ValueShape::String
            }
            PropertyKey::Testonly | PropertyKey::CompleteStaticLib => ValueShape::Bool,
            _ => ValueShape::List,
        }
    }
}

/// A literal value read for a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    List(Vec<String>),
    String(String),
    Bool(bool),
}

impl PropertyValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            PropertyValue::List(_) => ValueShape::List,
            PropertyValue::String(_) => ValueShape::String,
            PropertyValue::Bool(_) => ValueShape::Bool,
        }
    }
}

/// One optional slot per known property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_deps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_deps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_deps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_flags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_flags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_dirs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_static_lib: Option<bool>,
}

impl Properties {
    /// List slot for `key`, or `None` if `key` is not list-shaped.
    pub fn list_slot(&mut self, key: PropertyKey) -> Option<&mut Option<Vec<String>>> {
        let slot = match key {
            PropertyKey::Sources => &mut self.sources,
            PropertyKey::Headers => &mut self.headers,
            PropertyKey::Deps => &mut self.deps,
            PropertyKey::PublicDeps => &mut self.public_deps,
            PropertyKey::PrivateDeps => &mut self.private_deps,
            PropertyKey::DataDeps => &mut self.data_deps,
            PropertyKey::CompileFlags => &mut self.compile_flags,
            PropertyKey::LinkFlags => &mut self.link_flags,
            PropertyKey::IncludeDirs => &mut self.include_dirs,
            PropertyKey::Defines => &mut self.defines,
            PropertyKey::Visibility => &mut self.visibility,
            PropertyKey::Configs => &mut self.configs,
            PropertyKey::Inputs => &mut self.inputs,
            PropertyKey::Outputs => &mut self.outputs,
            PropertyKey::Script
            | PropertyKey::ResponseFileName
            | PropertyKey::OutputName
            | PropertyKey::Testonly
            | PropertyKey::CompleteStaticLib => return None,
        };
        Some(slot)
    }

    pub fn list(&self, key: PropertyKey) -> Option<&[String]> {
        let slot = match key {
            PropertyKey::Sources => &self.sources,
            PropertyKey::Headers => &self.headers,
            PropertyKey::Deps => &self.deps,
            PropertyKey::PublicDeps => &self.public_deps,
            PropertyKey::PrivateDeps => &self.private_deps,
            PropertyKey::DataDeps => &self.data_deps,
            PropertyKey::CompileFlags => &self.compile_flags,
            PropertyKey::LinkFlags => &self.link_flags,
            PropertyKey::IncludeDirs => &self.include_dirs,
            PropertyKey::Defines => &self.defines,
            PropertyKey::Visibility => &self.visibility,
            PropertyKey::Configs => &self.configs,
            PropertyKey::Inputs => &self.inputs,
            PropertyKey::Outputs => &self.outputs,
            _ => return None,
        };
        slot.as_deref()
    }

    pub fn string(&self, key: PropertyKey) -> Option<&str> {
        match key {
            PropertyKey::Script => self.script.as_deref(),
            PropertyKey::ResponseFileName => self.response_file_name.as_deref(),
            PropertyKey::OutputName => self.output_name.as_deref(),
            _ => None,
        }
    }

    pub fn flag(&self, key: PropertyKey) -> Option<bool> {
        match key {
            PropertyKey::Testonly => self.testonly,
            PropertyKey::CompleteStaticLib => self.complete_static_lib,
            _ => None,
        }
    }

    /// Set (or with `append`, extend) a property. Returns `false` and leaves
    /// `self` untouched when the value does not have the shape `key` expects.
    pub fn apply(&mut self, key: PropertyKey, value: PropertyValue, append: bool) -> bool {
        match (key.shape(), value) {
            (ValueShape::List, PropertyValue::List(items)) => {
                let Some(slot) = self.list_slot(key) else {
                    return false;
                };
                if append {
                    if let Some(existing) = slot.as_mut() {
                        existing.extend(items);
                        return true;
                    }
                }
                *slot = Some(items);
                true
            }
            (ValueShape::String, PropertyValue::String(value)) if !append => {
                match key {
                    PropertyKey::Script => self.script = Some(value),
                    PropertyKey::ResponseFileName => self.response_file_name = Some(value),
                    PropertyKey::OutputName => self.output_name = Some(value),
                    _ => return false,
                }
                true
            }
            (ValueShape::Bool, PropertyValue::Bool(value)) if !append => {
                match key {
                    PropertyKey::Testonly => self.testonly = Some(value),
                    PropertyKey::CompleteStaticLib => self.complete_static_lib = Some(value),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    /// Append list items, creating the list if absent.
    pub fn extend(&mut self, key: PropertyKey, items: impl IntoIterator<Item = String>) {
        if let Some(slot) = self.list_slot(key) {
            slot.get_or_insert_with(Vec::new).extend(items);
        }
    }

    /// True if no property is set, not even to an empty list.
    pub fn is_empty(&self) -> bool {
        PropertyKey::ALL.iter().all(|&key| match key.shape() {
            ValueShape::List => self.list(key).is_none(),
            ValueShape::String => self.string(key).is_none(),
            ValueShape::Bool => self.flag(key).is_none(),
        })
    }

    pub fn map_deps(&mut self, f: &mut dyn FnMut(&str) -> String) {
        for key in [
            PropertyKey::PublicDeps,
            PropertyKey::PrivateDeps,
            PropertyKey::Deps,
            PropertyKey::DataDeps,
        ] {
            if let Some(Some(deps)) = self.list_slot(key) {
                for dep in deps.iter_mut() {
                    *dep = f(dep.as_str());
                }
            }
        }
    }
}

/// Collects properties and conditions for one target while it is read.
#[derive(Debug, Clone)]
pub struct TargetBuilder {
    pub name: String,
    pub kind: TargetType,
    pub properties: Properties,
    pub conditions: Vec<ConditionBlock>,
    /// Keys that were assigned but are not modelled.
    pub ignored: BTreeSet<String>,
}

impl TargetBuilder {
    pub fn new(name: impl Into<String>, kind: TargetType) -> Self {
        Self {
            name: name.into(),
            kind,
            properties: Properties::default(),
            conditions: Vec::new(),
            ignored: BTreeSet::new(),
        }
    }

    pub fn build(self) -> Target {
        let p = self.properties;
        Target {
            name: self.name,
            kind: self.kind,
            sources: p.sources.unwrap_or_default(),
            headers: p.headers.unwrap_or_default(),
            deps: p.deps.unwrap_or_default(),
            public_deps: p.public_deps.unwrap_or_default(),
            private_deps: p.private_deps.unwrap_or_default(),
            data_deps: p.data_deps.unwrap_or_default(),
            compile_flags: p.compile_flags.unwrap_or_default(),
            link_flags: p.link_flags.unwrap_or_default(),
            include_dirs: p.include_dirs.unwrap_or_default(),
            defines: p.defines.unwrap_or_default(),
            visibility: p.visibility.unwrap_or_default(),
            output_name: p.output_name,
            configs: p.configs.unwrap_or_default(),
            script: p.script,
            inputs: p.inputs.unwrap_or_default(),
            outputs: p.outputs.unwrap_or_default(),
            response_file_name: p.response_file_name,
            testonly: p.testonly.unwrap_or(false),
            complete_static_lib: p.complete_static_lib.unwrap_or(false),
            conditions: self.conditions,
        }
    }
}

impl Target {
    /// The target's own fields as a property map. Empty lists and `false`
    /// flags count as absent.
    pub fn properties(&self) -> Properties {
        fn list(items: &[String]) -> Option<Vec<String>> {
            (!items.is_empty()).then(|| items.to_vec())
        }
        Properties {
            sources: list(&self.sources),
            headers: list(&self.headers),
            deps: list(&self.deps),
            public_deps: list(&self.public_deps),
            private_deps: list(&self.private_deps),
            data_deps: list(&self.data_deps),
            compile_flags: list(&self.compile_flags),
            link_flags: list(&self.link_flags),
            include_dirs: list(&self.include_dirs),
            defines: list(&self.defines),
            visibility: list(&self.visibility),
            configs: list(&self.configs),
            inputs: list(&self.inputs),
            outputs: list(&self.outputs),
            output_name: self.output_name.clone(),
            script: self.script.clone(),
            response_file_name: self.response_file_name.clone(),
            testonly: self.testonly.then_some(true),
            complete_static_lib: self.complete_static_lib.then_some(true),
        }
    }
}

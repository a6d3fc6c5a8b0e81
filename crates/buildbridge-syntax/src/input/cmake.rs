//! CMake reader.
//!
//! Built on the tree-sitter CMake grammar. The tree is read as a flat,
//! document-ordered sequence of command invocations. A creation command
//! (`add_executable`, `add_library`, `add_custom_target`) opens a target,
//! and every property command that follows it belongs to that target until
//! the next creation command. CMake has no end-of-target delimiter, so
//! membership is purely positional.
//!
//! Generator expressions (`$<...>`) are recognized and discarded. Variable
//! references (`${VAR}`) are kept verbatim.

use super::{CMAKE_PREDICATES, line_col, unescape};
use crate::error::ParseError;
use crate::ir::{ConditionBlock, DepTier, Properties, PropertyKey, PropertyValue, Target};
use crate::ir::{TargetBuilder, TargetType};
use crate::traits::{Parsed, Reader};
use std::collections::HashSet;
use tree_sitter::{Node, Parser};

/// Static instance of the CMake reader for registry.
pub static CMAKE_READER: CmakeReader = CmakeReader;

/// CMake reader using tree-sitter.
pub struct CmakeReader;

impl Reader for CmakeReader {
    fn language(&self) -> &'static str {
        "cmake"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cmake"]
    }

    fn file_names(&self) -> &'static [&'static str] {
        &["CMakeLists.txt"]
    }

    fn read(&self, source: &str) -> Parsed {
        read_cmake(source)
    }
}

/// Parse CMake source into targets, discarding diagnostics.
pub fn parse_cmake(source: &str) -> Vec<Target> {
    read_cmake(source).targets
}

/// Parse CMake source into targets plus a diagnostic per skipped fragment.
pub fn read_cmake(source: &str) -> Parsed {
    let failed = |message: String| Parsed {
        targets: Vec::new(),
        diagnostics: vec![ParseError::new(message, 1, 1)],
    };

    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(&arborium_cmake::language().into()) {
        return failed(err.to_string());
    }
    let Some(tree) = parser.parse(source, None) else {
        return failed("failed to parse".into());
    };

    let mut ctx = ReadContext::new(source);
    ctx.read_commands(tree.root_node(), false);
    ctx.finish_target(true);
    Parsed {
        targets: ctx.targets,
        diagnostics: ctx.diagnostics,
    }
}

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "inc", "inl"];

fn is_header(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        HEADER_EXTENSIONS
            .iter()
            .any(|header| ext.eq_ignore_ascii_case(header))
    })
}

/// One command argument with quoting resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Arg {
    text: String,
    /// Quoted and bracket arguments never act as keywords.
    quoted: bool,
}

impl Arg {
    fn keyword(&self) -> Option<&str> {
        (!self.quoted).then_some(self.text.as_str())
    }

    fn is(&self, keyword: &str) -> bool {
        self.keyword() == Some(keyword)
    }
}

/// Body of a bracket argument (`[==[ ... ]==]`), or `None` when the fences
/// do not match. A newline right after the opening fence is not content.
fn bracket_body(text: &str) -> Option<&str> {
    let level = text
        .strip_prefix('[')?
        .bytes()
        .take_while(|&b| b == b'=')
        .count();
    let fence = "=".repeat(level);
    let body = text
        .strip_prefix(&format!("[{fence}["))?
        .strip_suffix(&format!("]{fence}]"))?;
    Some(body.strip_prefix('\n').unwrap_or(body))
}

/// First line of a fragment, shortened for a diagnostic.
fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    let mut short: String = line.chars().take(40).collect();
    if short.len() < line.len() {
        short.push_str("...");
    }
    short
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_uppercase().as_str() {
        "TRUE" | "ON" | "YES" | "Y" | "1" => Some(true),
        "FALSE" | "OFF" | "NO" | "N" | "0" | "" => Some(false),
        _ => None,
    }
}

/// CMake list value (`a;b;c`) as items. An empty string is an empty list.
fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(';').map(str::to_string).collect()
}

/// Visibility keywords that carry no information for the command they
/// appear in.
fn is_scope_keyword(arg: &Arg) -> bool {
    matches!(
        arg.keyword(),
        Some("PUBLIC" | "PRIVATE" | "INTERFACE" | "SYSTEM" | "BEFORE" | "AFTER")
    )
}

/// An open `if()` branch of the current target.
struct Frame {
    /// Predicates of the branches before this one.
    earlier: Vec<String>,
    /// This branch's own predicate, `None` after `else()`.
    own: Option<String>,
    block: ConditionBlock,
}

struct Current {
    builder: TargetBuilder,
    frames: Vec<Frame>,
}

impl Current {
    fn properties(&mut self) -> &mut Properties {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.block.properties,
            None => &mut self.builder.properties,
        }
    }

    fn attach(&mut self, block: ConditionBlock) {
        match self.frames.last_mut() {
            Some(parent) => parent.block.conditions.push(block),
            None => self.builder.conditions.push(block),
        }
    }
}

struct ReadContext<'a> {
    source: &'a str,
    targets: Vec<Target>,
    seen: HashSet<String>,
    diagnostics: Vec<ParseError>,
    current: Option<Current>,
    /// `if()` blocks open outside any target.
    outer_depth: usize,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            targets: Vec::new(),
            seen: HashSet::new(),
            diagnostics: Vec::new(),
            current: None,
            outer_depth: 0,
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn diagnose(&mut self, pos: usize, message: impl Into<String>) {
        let (line, column) = line_col(self.source, pos);
        let err = ParseError::new(message, line, column);
        tracing::debug!(line = err.line, column = err.column, "skipped: {}", err.message);
        self.diagnostics.push(err);
    }

    /// Command name in lowercase. Structural commands (`if`, `endif`,
    /// `foreach`, ...) have their own node kinds.
    fn command_name(&self, node: Node) -> Option<String> {
        match node.kind() {
            "normal_command" => {
                let mut cursor = node.walk();
                let ident = node
                    .children(&mut cursor)
                    .find(|child| child.kind() == "identifier")?;
                Some(self.node_text(ident).to_ascii_lowercase())
            }
            kind => kind.strip_suffix("_command").map(str::to_string),
        }
    }

    /// Visit commands under `node` in document order. Each error region is
    /// reported once; clean commands inside it are still read.
    fn read_commands(&mut self, node: Node, in_error: bool) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_error() {
                if !in_error {
                    let text = snippet(self.node_text(child));
                    self.diagnose(child.start_byte(), format!("cannot parse `{text}`"));
                }
                self.read_commands(child, true);
            } else if child.is_missing() {
                // `missing endif()` is reported once the file ends.
                continue;
            } else if let Some(name) = self.command_name(child) {
                if child.has_error() {
                    if !in_error {
                        self.diagnose(child.start_byte(), format!("unterminated `{name}(`"));
                    }
                    continue;
                }
                self.command(&name, child);
            } else if child.is_named() {
                self.read_commands(child, in_error);
            }
        }
    }

    /// Arguments of a command, generator expressions dropped.
    fn args(&self, command: Node) -> Vec<Arg> {
        let mut args = Vec::new();
        self.collect_args(command, &mut args);
        args
    }

    fn collect_args(&self, node: Node, args: &mut Vec<Arg>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "argument" {
                args.extend(self.argument(child));
            } else {
                self.collect_args(child, args);
            }
        }
    }

    fn argument(&self, node: Node) -> Option<Arg> {
        let text = self.node_text(node);
        if text.contains("$<") {
            tracing::debug!(arg = text, "discarding generator expression");
            return None;
        }
        let form = node.named_child(0).map(|inner| inner.kind());
        let arg = match form {
            Some("quoted_argument") => Arg {
                text: unescape(
                    text.strip_prefix('"')
                        .and_then(|t| t.strip_suffix('"'))
                        .unwrap_or(text),
                ),
                quoted: true,
            },
            Some("bracket_argument") => match bracket_body(text) {
                Some(body) => Arg {
                    text: body.to_string(),
                    quoted: true,
                },
                None => Arg {
                    text: text.to_string(),
                    quoted: false,
                },
            },
            _ => Arg {
                text: text.to_string(),
                quoted: false,
            },
        };
        Some(arg)
    }

    /// Verbatim text between the outer parentheses of an `if()`-family
    /// command.
    fn predicate(&self, node: Node) -> &'a str {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let open = children.iter().find(|child| child.kind() == "(");
        let close = children.iter().rev().find(|child| child.kind() == ")");
        match (open, close) {
            (Some(open), Some(close)) => self
                .source
                .get(open.end_byte()..close.start_byte())
                .unwrap_or("")
                .trim(),
            _ => "",
        }
    }

    fn command(&mut self, command: &str, node: Node) {
        let start = node.start_byte();
        match command {
            "add_executable" | "add_library" | "add_custom_target" => {
                let args = self.args(node);
                self.create(command, start, &args);
            }
            "if" => self.open_if(self.predicate(node)),
            "elseif" => self.next_branch(start, command, Some(self.predicate(node))),
            "else" => self.next_branch(start, command, None),
            "endif" => self.close_if(start),
            "target_link_libraries"
            | "target_include_directories"
            | "target_compile_definitions"
            | "target_compile_options"
            | "target_link_options"
            | "target_sources"
            | "add_dependencies"
            | "set_target_properties" => {
                let args = self.args(node);
                self.property_command(command, start, &args);
            }
            _ => tracing::trace!(command, "skipping command"),
        }
    }

    fn create(&mut self, command: &str, start: usize, args: &[Arg]) {
        self.finish_target(false);
        let Some(name) = args.first().map(|arg| arg.text.clone()) else {
            self.diagnose(start, format!("`{command}` without a target name"));
            return;
        };
        if name.is_empty() {
            self.diagnose(start, format!("`{command}` with an empty target name"));
            return;
        }
        let rest = &args[1..];
        if rest.iter().take(2).any(|arg| arg.is("IMPORTED") || arg.is("ALIAS")) {
            self.diagnose(start, format!("imported or alias target `{name}` skipped"));
            return;
        }
        if self.seen.contains(&name) {
            self.diagnose(start, format!("duplicate target `{name}`; keeping the first"));
            return;
        }

        let mut builder = match command {
            "add_executable" => executable(&name, rest),
            "add_library" => library(&name, rest),
            _ => custom_target(&name, rest),
        };
        tracing::trace!(%name, kind = %builder.kind, "read target");
        self.seen.insert(name);
        self.current = Some(Current {
            builder,
            frames: Vec::new(),
        });
    }

    fn finish_target(&mut self, at_eof: bool) {
        let Some(mut current) = self.current.take() else {
            return;
        };
        if at_eof && !current.frames.is_empty() {
            self.diagnose(self.source.len(), "missing `endif()`");
        }
        // A creation command inside an open branch ends the target, and the
        // branch's `endif()` then closes an outer block.
        self.outer_depth += current.frames.len();
        while let Some(frame) = current.frames.pop() {
            current.attach(frame.block);
        }
        self.targets.push(current.builder.build());
    }

    fn open_if(&mut self, predicate: &str) {
        match self.current.as_mut() {
            Some(current) => current.frames.push(Frame {
                earlier: Vec::new(),
                own: Some(predicate.to_string()),
                block: ConditionBlock::new(predicate),
            }),
            None => self.outer_depth += 1,
        }
    }

    fn next_branch(&mut self, start: usize, command: &str, own: Option<&str>) {
        let Some(current) = self.current.as_mut() else {
            if self.outer_depth == 0 {
                self.diagnose(start, format!("`{command}()` without `if()`"));
            }
            return;
        };
        let Some(frame) = current.frames.pop() else {
            if self.outer_depth == 0 {
                self.diagnose(start, format!("`{command}()` without `if()`"));
            }
            return;
        };
        let Frame {
            mut earlier,
            own: previous,
            block,
        } = frame;
        current.attach(block);
        let Some(previous) = previous else {
            self.diagnose(start, format!("`{command}()` after `else()`"));
            return;
        };
        earlier.push(previous);
        let predicate = CMAKE_PREDICATES.branch(&earlier, own);
        current.frames.push(Frame {
            earlier,
            own: own.map(str::to_string),
            block: ConditionBlock::new(predicate),
        });
    }

    fn close_if(&mut self, start: usize) {
        if let Some(current) = self.current.as_mut() {
            if let Some(frame) = current.frames.pop() {
                current.attach(frame.block);
                return;
            }
        }
        if self.outer_depth > 0 {
            self.outer_depth -= 1;
        } else {
            self.diagnose(start, "`endif()` without `if()`");
        }
    }

    fn property_command(&mut self, command: &str, start: usize, args: &[Arg]) {
        let names: Vec<&str> = if command == "set_target_properties" {
            args.iter()
                .take_while(|arg| !arg.is("PROPERTIES"))
                .map(|arg| arg.text.as_str())
                .collect()
        } else {
            args.first().map(|arg| arg.text.as_str()).into_iter().collect()
        };
        let current_name = self.current.as_ref().map(|c| c.builder.name.as_str());
        let Some(current_name) = current_name.filter(|name| names.contains(name)) else {
            let named = names.join(" ");
            self.diagnose(
                start,
                format!("`{command}({named} ...)` does not follow the creation of `{named}`"),
            );
            return;
        };
        let current_name = current_name.to_string();
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let kind = current.builder.kind;
        let in_condition = !current.frames.is_empty();
        let props = current.properties();
        let rest = &args[1..];

        match command {
            "target_link_libraries" => link_libraries(props, rest),
            "target_include_directories" => {
                props.extend(
                    PropertyKey::IncludeDirs,
                    plain_items(rest).map(str::to_string),
                );
            }
            "target_compile_definitions" => {
                let defines = plain_items(rest)
                    .map(|define| define.strip_prefix("-D").unwrap_or(define))
                    .filter(|define| !define.is_empty())
                    .map(str::to_string);
                props.extend(PropertyKey::Defines, defines);
            }
            "target_compile_options" => {
                props.extend(
                    PropertyKey::CompileFlags,
                    plain_items(rest).map(str::to_string),
                );
            }
            "target_link_options" => {
                props.extend(PropertyKey::LinkFlags, plain_items(rest).map(str::to_string));
            }
            "target_sources" => target_sources(props, rest),
            "add_dependencies" => {
                let key = match kind {
                    TargetType::Action | TargetType::GeneratedFile => PropertyKey::Deps,
                    _ => PropertyKey::DataDeps,
                };
                props.extend(key, rest.iter().map(|arg| arg.text.clone()));
            }
            _ => {
                let properties_at = args.iter().position(|arg| arg.is("PROPERTIES"));
                let pairs = properties_at.map_or(&[][..], |i| &args[i + 1..]);
                let errors = self.target_properties(pairs, in_condition);
                for message in errors {
                    self.diagnose(start, message);
                }
            }
        }
        tracing::trace!(name = %current_name, command, "applied");
    }

    /// Apply `set_target_properties` key/value pairs to the current target,
    /// returning a message per pair that could not be applied.
    fn target_properties(&mut self, pairs: &[Arg], in_condition: bool) -> Vec<String> {
        let mut errors = Vec::new();
        let Some(current) = self.current.as_mut() else {
            return errors;
        };
        for pair in pairs.chunks(2) {
            let [key, value] = pair else {
                errors.push(format!("property `{}` has no value", pair[0].text));
                continue;
            };
            let value = value.text.as_str();
            let applied = match key.text.as_str() {
                "OUTPUT_NAME" => current.properties().apply(
                    PropertyKey::OutputName,
                    PropertyValue::String(value.to_string()),
                    false,
                ),
                "GN_VISIBILITY" => current.properties().apply(
                    PropertyKey::Visibility,
                    PropertyValue::List(split_list(value)),
                    false,
                ),
                "GN_CONFIGS" => current.properties().apply(
                    PropertyKey::Configs,
                    PropertyValue::List(split_list(value)),
                    false,
                ),
                "GN_RESPONSE_FILE_NAME" => current.properties().apply(
                    PropertyKey::ResponseFileName,
                    PropertyValue::String(value.to_string()),
                    false,
                ),
                "GN_TESTONLY" | "GN_COMPLETE_STATIC_LIB" => {
                    let key = if key.text == "GN_TESTONLY" {
                        PropertyKey::Testonly
                    } else {
                        PropertyKey::CompleteStaticLib
                    };
                    parse_bool(value).is_some_and(|flag| {
                        current
                            .properties()
                            .apply(key, PropertyValue::Bool(flag), false)
                    })
                }
                "GN_SCRIPT" => current.properties().apply(
                    PropertyKey::Script,
                    PropertyValue::String(value.to_string()),
                    false,
                ),
                "GN_INPUTS" | "GN_OUTPUTS" => {
                    let key = if key.text == "GN_INPUTS" {
                        PropertyKey::Inputs
                    } else {
                        PropertyKey::Outputs
                    };
                    current
                        .properties()
                        .apply(key, PropertyValue::List(split_list(value)), false)
                }
                "GN_TARGET_TYPE" if !in_condition => match TargetType::from_gn_function(value) {
                    Some(kind) => {
                        current.builder.kind = kind;
                        true
                    }
                    None => false,
                },
                other => {
                    tracing::trace!(property = other, "ignoring target property");
                    true
                }
            };
            if !applied {
                errors.push(format!("cannot apply {} {value:?}", key.text));
            }
        }
        errors
    }
}

/// Unquoted keywords of the scope family removed, everything else kept.
fn plain_items(args: &[Arg]) -> impl Iterator<Item = &str> {
    args.iter()
        .filter(|arg| !is_scope_keyword(arg))
        .map(|arg| arg.text.as_str())
}

fn executable(name: &str, args: &[Arg]) -> TargetBuilder {
    let mut builder = TargetBuilder::new(name, TargetType::Executable);
    let sources = args
        .iter()
        .filter(|arg| {
            !matches!(
                arg.keyword(),
                Some("WIN32" | "MACOSX_BUNDLE" | "EXCLUDE_FROM_ALL")
            )
        })
        .map(|arg| arg.text.clone());
    builder.properties.extend(PropertyKey::Sources, sources);
    builder
}

fn library(name: &str, args: &[Arg]) -> TargetBuilder {
    let (kind, rest) = match args.first().and_then(Arg::keyword) {
        Some("STATIC") => (TargetType::StaticLibrary, &args[1..]),
        Some("SHARED" | "MODULE") => (TargetType::SharedLibrary, &args[1..]),
        Some("OBJECT") => (TargetType::SourceSet, &args[1..]),
        Some("INTERFACE") => (TargetType::Group, &args[1..]),
        _ => (TargetType::StaticLibrary, args),
    };
    let mut builder = TargetBuilder::new(name, kind);
    let sources = rest
        .iter()
        .filter(|arg| !arg.is("EXCLUDE_FROM_ALL"))
        .map(|arg| arg.text.clone());
    builder.properties.extend(PropertyKey::Sources, sources);
    builder
}

fn custom_target(name: &str, args: &[Arg]) -> TargetBuilder {
    #[derive(Clone, Copy, PartialEq)]
    enum Section {
        Command,
        Depends,
        Byproducts,
        Sources,
        /// Keyword taking one value; the value is next.
        SkipValue,
        Skip,
    }

    let mut builder = TargetBuilder::new(name, TargetType::Action);
    let mut section = Section::Command;
    let mut script: Option<String> = None;
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut sources = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        match arg.keyword() {
            Some("ALL") if index == 0 => continue,
            Some("COMMAND") => {
                section = Section::Command;
                continue;
            }
            Some("DEPENDS") => {
                section = Section::Depends;
                continue;
            }
            Some("BYPRODUCTS") => {
                section = Section::Byproducts;
                continue;
            }
            Some("SOURCES") => {
                section = Section::Sources;
                continue;
            }
            Some("WORKING_DIRECTORY" | "COMMENT" | "JOB_POOL" | "JOB_SERVER_AWARE") => {
                section = Section::SkipValue;
                continue;
            }
            Some("VERBATIM" | "USES_TERMINAL" | "COMMAND_EXPAND_LISTS") => continue,
            _ => {}
        }
        match section {
            Section::Command => {
                if script.is_none() {
                    script = Some(arg.text.clone());
                }
            }
            Section::Depends => inputs.push(arg.text.clone()),
            Section::Byproducts => outputs.push(arg.text.clone()),
            Section::Sources => sources.push(arg.text.clone()),
            Section::SkipValue => section = Section::Skip,
            Section::Skip => {}
        }
    }
    let props = &mut builder.properties;
    props.script = script;
    props.extend(PropertyKey::Inputs, inputs);
    props.extend(PropertyKey::Outputs, outputs);
    props.extend(PropertyKey::Sources, sources);
    builder
}

/// `target_sources` items. `PRIVATE` items are sources and `PUBLIC` or
/// `INTERFACE` items are headers, matching what the writer emits; only
/// items before any keyword are sorted by extension. Each keyword marks its
/// list present even when no items follow it.
fn target_sources(props: &mut Properties, args: &[Arg]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Skip {
        No,
        /// `FILE_SET` and `TYPE` take one value.
        One,
        /// `BASE_DIRS` runs until `FILES`.
        UntilFiles,
    }

    if args.is_empty() {
        props.extend(PropertyKey::Sources, std::iter::empty());
        return;
    }
    let mut scope: Option<PropertyKey> = None;
    let mut skip = Skip::No;
    for arg in args {
        let opened = match arg.keyword() {
            Some("PRIVATE") => Some(PropertyKey::Sources),
            Some("PUBLIC" | "INTERFACE") => Some(PropertyKey::Headers),
            Some("FILE_SET" | "TYPE") => {
                skip = Skip::One;
                continue;
            }
            Some("BASE_DIRS") => {
                skip = Skip::UntilFiles;
                continue;
            }
            Some("FILES") => {
                skip = Skip::No;
                continue;
            }
            _ => None,
        };
        if let Some(key) = opened {
            scope = Some(key);
            skip = Skip::No;
            props.extend(key, std::iter::empty());
            continue;
        }
        match skip {
            Skip::One => {
                skip = Skip::No;
                continue;
            }
            Skip::UntilFiles => continue,
            Skip::No => {}
        }
        let key = scope.unwrap_or(if is_header(&arg.text) {
            PropertyKey::Headers
        } else {
            PropertyKey::Sources
        });
        props.extend(key, [arg.text.clone()]);
    }
}

/// `target_link_libraries` items partitioned by tier. Items before any
/// keyword are generic.
fn link_libraries(props: &mut Properties, args: &[Arg]) {
    let mut tier = DepTier::Generic;
    for arg in args {
        let next = match arg.keyword() {
            Some("PUBLIC" | "INTERFACE" | "LINK_PUBLIC" | "LINK_INTERFACE_LIBRARIES") => {
                Some(DepTier::Public)
            }
            Some("PRIVATE" | "LINK_PRIVATE") => Some(DepTier::Private),
            Some("debug" | "optimized" | "general") => continue,
            _ => None,
        };
        match next {
            Some(next) => {
                tier = next;
                props.extend(tier_key(tier), std::iter::empty());
            }
            None => props.extend(tier_key(tier), [arg.text.clone()]),
        }
    }
}

fn tier_key(tier: DepTier) -> PropertyKey {
    match tier {
        DepTier::Public => PropertyKey::PublicDeps,
        DepTier::Private => PropertyKey::PrivateDeps,
        DepTier::Generic => PropertyKey::Deps,
        DepTier::Data => PropertyKey::DataDeps,
    }
}

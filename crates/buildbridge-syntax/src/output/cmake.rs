//! CMake writer.
//!
//! A target becomes one creation command followed by property commands in a
//! fixed section order. GN-only fields that CMake has no command for are
//! kept as `GN_*` target properties so the CMake reader can restore them.
//!
//! # Visibility
//!
//! GN states visibility per dependency tier. Most CMake property commands
//! take a single `PUBLIC`/`PRIVATE` keyword for the whole command, so those
//! sections use [`derive_visibility`]: `PUBLIC` when the target has public
//! dependencies, otherwise `PRIVATE`. The two models are not isomorphic and
//! this is an approximation; dependency tiers themselves are always written
//! exactly.
//!
//! `target_sources` is the exception: sources always go under `PRIVATE` and
//! headers under `PUBLIC` (`INTERFACE` for groups), so the reader can tell
//! the two lists apart without guessing from file extensions.

use super::unknown_placeholder;
use crate::ir::{ConditionBlock, Properties, PropertyKey, Target, TargetType, Visibility};
use crate::labels::to_cmake_name;
use crate::traits::Writer;

/// Static instance of the CMake writer for registry.
pub static CMAKE_WRITER: CmakeWriterImpl = CmakeWriterImpl;

/// CMake writer implementing the Writer trait.
pub struct CmakeWriterImpl;

impl Writer for CmakeWriterImpl {
    fn language(&self) -> &'static str {
        "cmake"
    }

    fn file_name(&self) -> &'static str {
        "CMakeLists.txt"
    }

    fn write(&self, target: &Target) -> String {
        CmakeWriter::emit(target)
    }
}

/// Keyword for sections that accept a single visibility keyword:
/// public-else-private.
pub fn derive_visibility(target: &Target) -> Visibility {
    if !target.public_deps.is_empty() {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

/// Keyword that marks `target_sources` items as headers.
fn header_visibility(kind: TargetType) -> Visibility {
    if kind == TargetType::Group {
        Visibility::Interface
    } else {
        Visibility::Public
    }
}

/// How a kind is created.
#[derive(Debug, Clone, Copy)]
struct CreationRule {
    command: &'static str,
    /// Library type, or `ALL` for custom targets.
    modifier: Option<&'static str>,
    /// Custom targets take sources after a `SOURCES` keyword and have no
    /// link step.
    custom: bool,
}

fn creation_rule(kind: TargetType) -> Option<CreationRule> {
    let (command, modifier, custom) = match kind {
        TargetType::Executable => ("add_executable", None, false),
        TargetType::StaticLibrary => ("add_library", Some("STATIC"), false),
        TargetType::SharedLibrary => ("add_library", Some("SHARED"), false),
        TargetType::SourceSet => ("add_library", Some("OBJECT"), false),
        TargetType::Group => ("add_library", Some("INTERFACE"), false),
        TargetType::Action | TargetType::GeneratedFile => {
            ("add_custom_target", Some("ALL"), true)
        }
        TargetType::Unknown => return None,
    };
    Some(CreationRule {
        command,
        modifier,
        custom,
    })
}

/// Render one CMake argument, quoting it when it would otherwise split or
/// be misread.
pub fn cmake_arg(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | '(' | ')' | '"' | '#' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn cmake_bool(flag: bool) -> &'static str {
    if flag { "TRUE" } else { "FALSE" }
}

/// Emits targets as CMake.
pub struct CmakeWriter {
    output: String,
    indent: usize,
    name: String,
    keyword: &'static str,
    headers: &'static str,
    custom: bool,
}

impl CmakeWriter {
    fn new(target: &Target, custom: bool) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            name: cmake_arg(&target.name),
            keyword: derive_visibility(target).keyword(),
            headers: header_visibility(target.kind).keyword(),
            custom,
        }
    }

    /// Emit one target. No trailing newline.
    pub fn emit(target: &Target) -> String {
        let Some(rule) = creation_rule(target.kind) else {
            return unknown_placeholder(&target.name);
        };
        let mut writer = Self::new(target, rule.custom);
        if target.kind.is_lossy_in_cmake() {
            writer.line(&format!(
                "# NOTE: GN {} \"{}\" has no CMake equivalent; emitted as a custom target",
                target.kind, target.name
            ));
        }
        writer.write_creation(target, rule);

        let mut props = target.properties();
        // Already part of the creation command.
        props.sources = None;
        if rule.custom {
            props.script = None;
            props.inputs = None;
            props.outputs = None;
        }
        let kind = target.kind.is_lossy_in_cmake().then_some(target.kind);
        writer.write_sections(&props, kind);
        writer.write_conditions(&target.conditions);

        let len = writer.output.trim_end().len();
        writer.output.truncate(len);
        writer.output
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// `head` followed by `items`: inline for zero or one item, one item per
    /// line otherwise.
    fn command(&mut self, head: &str, items: &[String]) {
        match items {
            [] => self.line(&format!("{head})")),
            [only] => self.line(&format!("{head} {})", cmake_arg(only))),
            many => {
                self.line(head);
                self.indent += 1;
                for item in many {
                    self.line(&cmake_arg(item));
                }
                self.indent -= 1;
                self.line(")");
            }
        }
    }

    fn write_creation(&mut self, target: &Target, rule: CreationRule) {
        let mut head = format!("{}({}", rule.command, self.name);
        if let Some(modifier) = rule.modifier {
            head.push(' ');
            head.push_str(modifier);
        }
        if !rule.custom {
            self.command(&head, &target.sources);
            return;
        }

        let sections = [
            ("COMMAND", target.script.as_slice()),
            ("DEPENDS", target.inputs.as_slice()),
            ("BYPRODUCTS", target.outputs.as_slice()),
            ("SOURCES", target.sources.as_slice()),
        ];
        let lines: Vec<String> = sections
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(keyword, items)| {
                let args: Vec<String> = items.iter().map(|item| cmake_arg(item)).collect();
                format!("{keyword} {}", args.join(" "))
            })
            .collect();
        if lines.is_empty() {
            self.line(&format!("{head})"));
            return;
        }
        self.line(&head);
        self.indent += 1;
        for line in &lines {
            self.line(line);
        }
        self.indent -= 1;
        self.line(")");
    }

    /// Property commands for one property map, in section order. `kind` is
    /// recorded only at target level.
    fn write_sections(&mut self, props: &Properties, kind: Option<TargetType>) {
        let name = self.name.clone();
        let keyword = self.keyword;

        let sources = [
            (PropertyKey::Sources, Visibility::Private.keyword()),
            (PropertyKey::Headers, self.headers),
        ];
        for (key, section) in sources {
            if let Some(items) = props.list(key) {
                self.command(&format!("target_sources({name} {section}"), items);
            }
        }
        let simple = [
            (PropertyKey::IncludeDirs, "target_include_directories"),
            (PropertyKey::Defines, "target_compile_definitions"),
            (PropertyKey::CompileFlags, "target_compile_options"),
            (PropertyKey::LinkFlags, "target_link_options"),
        ];
        for (key, command) in simple {
            if let Some(items) = props.list(key) {
                self.command(&format!("{command}({name} {keyword}"), items);
            }
        }

        let deps = |key: PropertyKey| {
            props
                .list(key)
                .map(|deps| deps.iter().map(|dep| to_cmake_name(dep)).collect::<Vec<_>>())
        };
        let public = deps(PropertyKey::PublicDeps);
        let private = deps(PropertyKey::PrivateDeps);
        let generic = deps(PropertyKey::Deps);
        let data = deps(PropertyKey::DataDeps);
        if self.custom {
            let all: Option<Vec<String>> = [public, private, generic, data]
                .into_iter()
                .flatten()
                .reduce(|mut all, more| {
                    all.extend(more);
                    all
                });
            if let Some(all) = all {
                self.command(&format!("add_dependencies({name}"), &all);
            }
        } else {
            self.write_link_libraries(public.as_deref(), private.as_deref());
            if let Some(generic) = generic {
                self.command(&format!("target_link_libraries({name}"), &generic);
            }
            if let Some(data) = data {
                self.command(&format!("add_dependencies({name}"), &data);
            }
        }

        self.write_properties(props, kind);
    }

    fn write_link_libraries(&mut self, public: Option<&[String]>, private: Option<&[String]>) {
        let head = format!("target_link_libraries({}", self.name);
        match (public, private) {
            (None, None) => {}
            (Some(items), None) => self.command(&format!("{head} PUBLIC"), items),
            (None, Some(items)) => self.command(&format!("{head} PRIVATE"), items),
            (Some(public), Some(private)) => {
                self.line(&head);
                self.indent += 1;
                for (keyword, items) in [("PUBLIC", public), ("PRIVATE", private)] {
                    self.line(keyword);
                    self.indent += 1;
                    for item in items {
                        self.line(&cmake_arg(item));
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.line(")");
            }
        }
    }

    fn write_properties(&mut self, props: &Properties, kind: Option<TargetType>) {
        let list = |items: &[String]| items.join(";");
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(output_name) = &props.output_name {
            pairs.push(("OUTPUT_NAME", output_name.clone()));
        }
        if let Some(kind) = kind {
            pairs.push(("GN_TARGET_TYPE", kind.to_string()));
        }
        if let Some(visibility) = &props.visibility {
            pairs.push(("GN_VISIBILITY", list(visibility)));
        }
        if let Some(configs) = &props.configs {
            pairs.push(("GN_CONFIGS", list(configs)));
        }
        if let Some(testonly) = props.testonly {
            pairs.push(("GN_TESTONLY", cmake_bool(testonly).to_string()));
        }
        if let Some(complete) = props.complete_static_lib {
            pairs.push(("GN_COMPLETE_STATIC_LIB", cmake_bool(complete).to_string()));
        }
        if let Some(rsp) = &props.response_file_name {
            pairs.push(("GN_RESPONSE_FILE_NAME", rsp.clone()));
        }
        // Action fields that only a condition block can still carry here.
        if let Some(script) = &props.script {
            pairs.push(("GN_SCRIPT", script.clone()));
        }
        if let Some(inputs) = &props.inputs {
            pairs.push(("GN_INPUTS", list(inputs)));
        }
        if let Some(outputs) = &props.outputs {
            pairs.push(("GN_OUTPUTS", list(outputs)));
        }
        if pairs.is_empty() {
            return;
        }

        let head = format!("set_target_properties({} PROPERTIES", self.name);
        if let [(key, value)] = pairs.as_slice() {
            self.line(&format!("{head} {key} {})", cmake_arg(value)));
            return;
        }
        self.line(&head);
        self.indent += 1;
        for (key, value) in &pairs {
            self.line(&format!("{key} {}", cmake_arg(value)));
        }
        self.indent -= 1;
        self.line(")");
    }

    fn write_conditions(&mut self, blocks: &[ConditionBlock]) {
        for block in blocks {
            self.line(&format!("if({})", block.predicate));
            self.indent += 1;
            self.write_sections(&block.properties, None);
            self.write_conditions(&block.conditions);
            self.indent -= 1;
            self.line("endif()");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_cmake;

    #[test]
    fn test_emit_hello() {
        let mut target = Target::new("hello", TargetType::Executable);
        target.sources = vec!["main.cc".into()];
        target.deps = vec![":lib".into()];
        assert_eq!(
            CmakeWriter::emit(&target),
            "add_executable(hello main.cc)\ntarget_link_libraries(hello lib)"
        );
    }

    #[test]
    fn test_section_order() {
        let mut target = Target::new("base", TargetType::StaticLibrary);
        target.sources = vec!["a.cc".into(), "b.cc".into()];
        target.headers = vec!["a.h".into()];
        target.include_dirs = vec!["include".into()];
        target.defines = vec!["FOO=1".into()];
        target.compile_flags = vec!["-Wall".into()];
        target.link_flags = vec!["-pthread".into()];
        target.public_deps = vec!["//base:util".into()];
        target.private_deps = vec![":impl".into()];
        target.deps = vec!["z".into()];
        target.data_deps = vec![":data".into()];
        target.output_name = Some("base_lib".into());
        insta::assert_snapshot!(CmakeWriter::emit(&target), @r"
        add_library(base STATIC
          a.cc
          b.cc
        )
        target_sources(base PUBLIC a.h)
        target_include_directories(base PUBLIC include)
        target_compile_definitions(base PUBLIC FOO=1)
        target_compile_options(base PUBLIC -Wall)
        target_link_options(base PUBLIC -pthread)
        target_link_libraries(base
          PUBLIC
            util
          PRIVATE
            impl
        )
        target_link_libraries(base z)
        add_dependencies(base data)
        set_target_properties(base PROPERTIES OUTPUT_NAME base_lib)
        ");
    }

    #[test]
    fn test_private_keyword_without_public_deps() {
        let mut target = Target::new("app", TargetType::Executable);
        target.include_dirs = vec!["inc".into()];
        target.private_deps = vec!["x".into()];
        let out = CmakeWriter::emit(&target);
        assert!(out.contains("target_include_directories(app PRIVATE inc)"));
        assert!(out.contains("target_link_libraries(app PRIVATE x)"));
    }

    #[test]
    fn test_library_modifiers() {
        for (kind, expected) in [
            (TargetType::StaticLibrary, "add_library(l STATIC)"),
            (TargetType::SharedLibrary, "add_library(l SHARED)"),
            (TargetType::SourceSet, "add_library(l OBJECT)"),
            (TargetType::Group, "add_library(l INTERFACE)"),
            (TargetType::Executable, "add_executable(l)"),
            (TargetType::Action, "add_custom_target(l ALL)"),
        ] {
            assert_eq!(CmakeWriter::emit(&Target::new("l", kind)), expected);
        }
    }

    #[test]
    fn test_action() {
        let mut target = Target::new("gen", TargetType::Action);
        target.script = Some("gen.py".into());
        target.inputs = vec!["in.txt".into()];
        target.outputs = vec!["out.h".into()];
        target.public_deps = vec![":tool".into()];
        target.deps = vec![":other".into()];
        insta::assert_snapshot!(CmakeWriter::emit(&target), @r"
        add_custom_target(gen ALL
          COMMAND gen.py
          DEPENDS in.txt
          BYPRODUCTS out.h
        )
        add_dependencies(gen
          tool
          other
        )
        ");
    }

    #[test]
    fn test_generated_file_is_flagged() {
        let mut target = Target::new("meta", TargetType::GeneratedFile);
        target.outputs = vec!["meta.json".into()];
        let out = CmakeWriter::emit(&target);
        assert!(out.starts_with("# NOTE: GN generated_file \"meta\""));
        assert!(out.contains("GN_TARGET_TYPE generated_file"));
        let parsed = parse_cmake(&out);
        assert_eq!(parsed[0].kind, TargetType::GeneratedFile);
        assert_eq!(parsed[0].outputs, vec!["meta.json"]);
    }

    #[test]
    fn test_gn_only_fields_as_properties() {
        let mut target = Target::new("t", TargetType::StaticLibrary);
        target.visibility = vec![":*".into(), "//app:*".into()];
        target.configs = vec![":strict".into()];
        target.testonly = true;
        target.complete_static_lib = true;
        let out = CmakeWriter::emit(&target);
        assert!(out.contains("  GN_VISIBILITY \":*;//app:*\"\n"), "{out}");
        let parsed = parse_cmake(&out);
        assert_eq!(parsed, vec![target]);
    }

    #[test]
    fn test_conditions() {
        let mut target = Target::new("app", TargetType::Executable);
        let mut outer = ConditionBlock::new("WIN32");
        outer.properties.sources = Some(vec!["win.cc".into()]);
        outer.properties.deps = Some(vec![":winlib".into()]);
        let mut inner = ConditionBlock::new("MSVC");
        inner.properties.compile_flags = Some(vec!["/W4".into()]);
        outer.conditions.push(inner);
        target.conditions.push(outer);
        insta::assert_snapshot!(CmakeWriter::emit(&target), @r"
        add_executable(app)
        if(WIN32)
          target_sources(app PRIVATE win.cc)
          target_link_libraries(app winlib)
          if(MSVC)
            target_compile_options(app PRIVATE /W4)
          endif()
        endif()
        ");
    }

    #[test]
    fn test_source_keywords_ignore_derived_visibility() {
        let mut target = Target::new("base", TargetType::StaticLibrary);
        target.public_deps = vec![":dep".into()];
        let mut block = ConditionBlock::new("WIN32");
        block.properties.sources = Some(vec!["win.h".into()]);
        block.properties.headers = Some(vec!["win_api.cc".into()]);
        target.conditions.push(block);
        let out = CmakeWriter::emit(&target);
        assert!(out.contains("  target_sources(base PRIVATE win.h)\n"), "{out}");
        assert!(out.contains("  target_sources(base PUBLIC win_api.cc)\n"), "{out}");
        assert_eq!(parse_cmake(&out), vec![target]);

        let mut group = Target::new("api", TargetType::Group);
        group.headers = vec!["api.h".into()];
        assert_eq!(
            CmakeWriter::emit(&group),
            "add_library(api INTERFACE)\ntarget_sources(api INTERFACE api.h)"
        );
    }

    #[test]
    fn test_conditional_action_fields_read_back() {
        let mut target = Target::new("gen", TargetType::Action);
        target.script = Some("gen.py".into());
        let mut block = ConditionBlock::new("WIN32");
        block.properties.script = Some("gen_win.py".into());
        block.properties.outputs = Some(vec!["a.h".into(), "b.h".into()]);
        target.conditions.push(block);

        let out = CmakeWriter::emit(&target);
        assert!(out.contains("    GN_SCRIPT gen_win.py\n"), "{out}");
        assert!(out.contains("    GN_OUTPUTS \"a.h;b.h\"\n"), "{out}");
        assert_eq!(parse_cmake(&out), vec![target]);
    }

    #[test]
    fn test_cmake_arg_quoting() {
        assert_eq!(cmake_arg("main.cc"), "main.cc");
        assert_eq!(cmake_arg("${SRC}/a.cc"), "${SRC}/a.cc");
        assert_eq!(cmake_arg("two words"), "\"two words\"");
        assert_eq!(cmake_arg("a;b"), "\"a;b\"");
        assert_eq!(cmake_arg(r#"NAME="x""#), r#""NAME=\"x\"""#);
        assert_eq!(cmake_arg(r"C:\dir"), r#""C:\\dir""#);
        assert_eq!(cmake_arg(""), "\"\"");
    }

    #[test]
    fn test_unknown_kind_placeholder() {
        let target = Target::new("mystery", TargetType::Unknown);
        assert_eq!(
            CmakeWriter::emit(&target),
            "# Unknown target type: unknown (\"mystery\")"
        );
    }
}

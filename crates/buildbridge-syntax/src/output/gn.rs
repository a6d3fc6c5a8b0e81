//! GN writer.
//!
//! Emits one target declaration per target. Properties come out in a fixed
//! order (see [`PropertyKey::ALL`]), dependency labels in GN spelling, and
//! condition blocks as nested `if (...) { }` blocks after the plain
//! properties.

use super::unknown_placeholder;
use crate::ir::{ConditionBlock, Properties, PropertyKey, Target, ValueShape};
use crate::labels::to_gn_label;
use crate::traits::Writer;

/// Static instance of the GN writer for registry.
pub static GN_WRITER: GnWriterImpl = GnWriterImpl;

/// GN writer implementing the Writer trait.
pub struct GnWriterImpl;

impl Writer for GnWriterImpl {
    fn language(&self) -> &'static str {
        "gn"
    }

    fn file_name(&self) -> &'static str {
        "BUILD.gn"
    }

    fn write(&self, target: &Target) -> String {
        GnWriter::emit(target)
    }
}

/// Quote a value as a GN string literal.
///
/// Inverse of [`crate::input::unquote`]: `"` and `\` are escaped, except a
/// backslash directly before `$`, which GN reads as a literal dollar sign.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' if chars.peek() == Some(&'$') => out.push('\\'),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_dep_key(key: PropertyKey) -> bool {
    matches!(
        key,
        PropertyKey::PublicDeps | PropertyKey::PrivateDeps | PropertyKey::Deps | PropertyKey::DataDeps
    )
}

/// Emits targets as GN.
pub struct GnWriter {
    output: String,
    indent: usize,
}

impl GnWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit one target. No trailing newline.
    pub fn emit(target: &Target) -> String {
        let Some(function) = target.kind.gn_function() else {
            return unknown_placeholder(&target.name);
        };
        let mut writer = Self::new();
        writer.line(&format!("{function}({}) {{", quote(&target.name)));
        writer.indent += 1;
        writer.write_properties(&target.properties());
        writer.write_conditions(&target.conditions);
        writer.indent -= 1;
        writer.output.push('}');
        writer.output
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn write_properties(&mut self, props: &Properties) {
        for key in PropertyKey::ALL {
            let name = key.gn_name();
            match key.shape() {
                ValueShape::List => {
                    if let Some(items) = props.list(key) {
                        let items: Vec<String> = if is_dep_key(key) {
                            items.iter().map(|dep| quote(&to_gn_label(dep))).collect()
                        } else {
                            items.iter().map(|item| quote(item)).collect()
                        };
                        self.write_list(name, &items);
                    }
                }
                ValueShape::String => {
                    if let Some(value) = props.string(key) {
                        self.line(&format!("{name} = {}", quote(value)));
                    }
                }
                ValueShape::Bool => {
                    if let Some(flag) = props.flag(key) {
                        self.line(&format!("{name} = {flag}"));
                    }
                }
            }
        }
    }

    fn write_list(&mut self, name: &str, items: &[String]) {
        match items {
            [] => self.line(&format!("{name} = []")),
            [only] => self.line(&format!("{name} = [ {only} ]")),
            many => {
                self.line(&format!("{name} = ["));
                self.indent += 1;
                for item in many {
                    self.line(&format!("{item},"));
                }
                self.indent -= 1;
                self.line("]");
            }
        }
    }

    fn write_conditions(&mut self, blocks: &[ConditionBlock]) {
        for block in blocks {
            self.line(&format!("if ({}) {{", block.predicate));
            self.indent += 1;
            self.write_properties(&block.properties);
            self.write_conditions(&block.conditions);
            self.indent -= 1;
            self.line("}");
        }
    }
}

impl Default for GnWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{parse_gn, unquote};
    use crate::ir::TargetType;

    #[test]
    fn test_emit_hello() {
        let mut target = Target::new("hello", TargetType::Executable);
        target.sources = vec!["main.cc".into(), "util.cc".into()];
        target.deps = vec!["lib".into()];
        assert_eq!(
            GnWriter::emit(&target),
            "executable(\"hello\") {\n  sources = [\n    \"main.cc\",\n    \"util.cc\",\n  ]\n  deps = [ \":lib\" ]\n}"
        );
    }

    #[test]
    fn test_tier_order_is_canonical() {
        let mut target = Target::new("app", TargetType::Executable);
        target.deps = vec![":generic".into()];
        target.private_deps = vec![":private".into()];
        target.public_deps = vec![":public".into()];
        let out = GnWriter::emit(&target);
        let public = out.find("public_deps").unwrap();
        let private = out.find("private_deps").unwrap();
        let generic = out.find("  deps").unwrap();
        assert!(public < private && private < generic, "{out}");
    }

    #[test]
    fn test_absent_lists_are_omitted_but_condition_empties_are_not() {
        let mut target = Target::new("app", TargetType::Executable);
        let mut block = ConditionBlock::new("is_win");
        block.properties.sources = Some(vec![]);
        target.conditions.push(block);
        let out = GnWriter::emit(&target);
        assert_eq!(
            out,
            "executable(\"app\") {\n  if (is_win) {\n    sources = []\n  }\n}"
        );
    }

    #[test]
    fn test_scalars_and_flags() {
        let mut target = Target::new("gen", TargetType::Action);
        target.script = Some("gen.py".into());
        target.response_file_name = Some("gen.rsp".into());
        target.testonly = true;
        let out = GnWriter::emit(&target);
        assert!(out.contains("  script = \"gen.py\"\n"));
        assert!(out.contains("  response_file_name = \"gen.rsp\"\n"));
        assert!(out.contains("  testonly = true\n"));
        assert!(!out.contains("complete_static_lib"));
    }

    #[test]
    fn test_unknown_kind_placeholder() {
        let target = Target::new("mystery", TargetType::Unknown);
        assert_eq!(
            GnWriter::emit(&target),
            "# Unknown target type: unknown (\"mystery\")"
        );
    }

    #[test]
    fn test_quote_is_inverse_of_unquote() {
        for value in ["plain", r#"say "hi""#, r"back\slash", r"\$literal", r"\\$x", "end\\"] {
            let quoted = quote(value);
            assert_eq!(unquote(&quoted[1..quoted.len() - 1]), value, "{quoted}");
        }
    }

    #[test]
    fn test_emitted_text_reads_back() {
        let mut target = Target::new("base", TargetType::StaticLibrary);
        target.sources = vec!["a.cc".into()];
        target.defines = vec![r#"NAME="x""#.into()];
        target.public_deps = vec!["//third_party:zlib".into()];
        let mut block = ConditionBlock::new("is_linux && !is_debug");
        block.properties.compile_flags = Some(vec!["-O2".into()]);
        target.conditions.push(block);

        let parsed = parse_gn(&GnWriter::emit(&target));
        assert_eq!(parsed, vec![target]);
    }
}

//! GN reader.
//!
//! Tokenizes a `BUILD.gn` file and looks for target declarations such as
//! `executable("hello") { ... }`, reading the literal assignments and `if`
//! blocks inside them. Nothing is evaluated: variables, templates, imports
//! and function calls are stepped over, and every fragment that cannot be
//! read is reported as a diagnostic instead of failing the whole file.

use super::gn_lexer::{Lexeme, Token, tokenize};
use super::{GN_PREDICATES, line_col, unescape};
use crate::error::ParseError;
use crate::ir::{
    ConditionBlock, Properties, PropertyKey, PropertyValue, Target, TargetBuilder, TargetType,
    ValueShape,
};
use crate::traits::{Parsed, Reader};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::sync::LazyLock;

/// Static instance of the GN reader for registry.
pub static GN_READER: GnReader = GnReader;

/// GN reader.
pub struct GnReader;

impl Reader for GnReader {
    fn language(&self) -> &'static str {
        "gn"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gn", "gni"]
    }

    fn file_names(&self) -> &'static [&'static str] {
        &["BUILD.gn"]
    }

    fn read(&self, source: &str) -> Parsed {
        read_gn(source)
    }
}

static TARGET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.+-]*$").unwrap());

/// Parse GN source into targets, discarding diagnostics.
pub fn parse_gn(source: &str) -> Vec<Target> {
    read_gn(source).targets
}

/// Parse GN source into targets plus a diagnostic per skipped fragment.
pub fn read_gn(source: &str) -> Parsed {
    let mut ctx = ReadContext::new(source);
    ctx.read_top_level(0..ctx.tokens.len());
    Parsed {
        targets: ctx.targets,
        diagnostics: ctx.diagnostics,
    }
}

/// Split a GN list literal (`[ "a", "b", ]`) into its decoded string items.
///
/// Brackets are optional. Items that are not string literals (variables,
/// nested lists) are dropped.
pub fn parse_list(text: &str) -> Vec<String> {
    let tokens = Tokens::new(text);
    let mut range = 0..tokens.len();
    while range.start < range.end && tokens.kind(range.start) == Some(Token::Newline) {
        range.start += 1;
    }
    while range.start < range.end && tokens.kind(range.end - 1) == Some(Token::Newline) {
        range.end -= 1;
    }
    if range.len() >= 2
        && tokens.kind(range.start) == Some(Token::OpenSquare)
        && tokens.kind(range.end - 1) == Some(Token::CloseSquare)
    {
        range = range.start + 1..range.end - 1;
    }
    tokens
        .split_items(range)
        .into_iter()
        .filter_map(|item| tokens.literal(item))
        .collect()
}

/// Decode the body of a GN string literal.
///
/// `\"` and `\\` are decoded. Every other backslash, notably `\$`, is kept
/// as written since `$` expansion is not evaluated.
pub fn unquote(raw: &str) -> String {
    unescape(raw)
}

/// Lexemes together with the source they were cut from.
struct Tokens<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
}

impl<'a> Tokens<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            lexemes: tokenize(source),
        }
    }

    fn len(&self) -> usize {
        self.lexemes.len()
    }

    fn kind(&self, index: usize) -> Option<Token> {
        self.lexemes.get(index).map(|lexeme| lexeme.token)
    }

    /// Byte offset where token `index` starts; the end of input past the
    /// last token.
    fn offset(&self, index: usize) -> usize {
        self.lexemes
            .get(index)
            .map_or(self.source.len(), |lexeme| lexeme.span.start)
    }

    /// Source text from the first to the last token of `range`.
    fn text(&self, range: Range<usize>) -> &'a str {
        if range.is_empty() {
            return "";
        }
        match (self.lexemes.get(range.start), self.lexemes.get(range.end - 1)) {
            (Some(first), Some(last)) => self
                .source
                .get(first.span.start..last.span.end)
                .unwrap_or(""),
            _ => "",
        }
    }

    /// The decoded value when `range` is exactly one string literal.
    fn literal(&self, range: Range<usize>) -> Option<String> {
        if range.len() != 1 || self.kind(range.start) != Some(Token::Str) {
            return None;
        }
        let token = self.text(range);
        let body = token.strip_prefix('"')?.strip_suffix('"')?;
        Some(unquote(body))
    }

    /// Items of a list body, split on commas outside nested brackets.
    /// Newlines are not part of an item.
    fn split_items(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let mut items = Vec::new();
        let mut item: Option<Range<usize>> = None;
        let mut depth = 0usize;
        for index in range {
            let Some(token) = self.kind(index) else {
                break;
            };
            match token {
                Token::Comma if depth == 0 => {
                    items.extend(item.take());
                    continue;
                }
                Token::Newline if depth == 0 => continue,
                Token::OpenRound | Token::OpenSquare | Token::OpenCurly => depth += 1,
                Token::CloseRound | Token::CloseSquare | Token::CloseCurly => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            item = Some(item.map_or(index..index + 1, |item| item.start..index + 1));
        }
        items.extend(item);
        items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssignOp {
    Assign,
    Append,
    Remove,
}

fn shape_name(shape: ValueShape) -> &'static str {
    match shape {
        ValueShape::List => "list",
        ValueShape::String => "string",
        ValueShape::Bool => "boolean",
    }
}

struct ReadContext<'a> {
    tokens: Tokens<'a>,
    /// Index of the next token.
    pos: usize,
    targets: Vec<Target>,
    seen: HashSet<String>,
    diagnostics: Vec<ParseError>,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            tokens: Tokens::new(source),
            pos: 0,
            targets: Vec::new(),
            seen: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    fn diagnose(&mut self, at: usize, message: impl Into<String>) {
        let (line, column) = line_col(self.tokens.source, self.tokens.offset(at));
        let err = ParseError::new(message, line, column);
        tracing::debug!(line = err.line, column = err.column, "skipped: {}", err.message);
        self.diagnostics.push(err);
    }

    fn peek(&self, end: usize) -> Option<Token> {
        if self.pos < end {
            self.tokens.kind(self.pos)
        } else {
            None
        }
    }

    fn at_word(&self, end: usize, word: &str) -> bool {
        self.peek(end) == Some(Token::Ident) && self.tokens.text(self.pos..self.pos + 1) == word
    }

    fn skip_newlines(&mut self, end: usize) {
        while self.peek(end) == Some(Token::Newline) {
            self.pos += 1;
        }
    }

    /// Move past the next newline, stopping at `end`.
    fn skip_line(&mut self, end: usize) {
        while let Some(token) = self.peek(end) {
            self.pos += 1;
            if token == Token::Newline {
                break;
            }
        }
    }

    /// Give up on the statement starting at `start` and continue on the next
    /// line.
    fn recover(&mut self, start: usize, end: usize) {
        self.pos = start;
        self.skip_line(end);
    }

    /// Read a balanced pair whose opener is the next token and which must
    /// close before `end`, returning the tokens between them. On failure the
    /// position is left on the opener.
    fn take_block(&mut self, end: usize) -> Option<Range<usize>> {
        let open = self.peek(end)?;
        let close = open.closer()?;
        let mut depth = 0usize;
        for index in self.pos..end {
            match self.tokens.kind(index) {
                Some(token) if token == open => depth += 1,
                Some(token) if token == close => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = self.pos + 1..index;
                        self.pos = index + 1;
                        return Some(inner);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn skip_stray(&mut self, end: usize) {
        let found = self.tokens.text(self.pos..self.pos + 1);
        self.diagnose(self.pos, format!("unexpected `{found}`"));
        self.skip_line(end);
    }

    /// Step over the rest of an expression or call on the current line,
    /// including bracketed parts that span lines.
    fn skip_expression(&mut self, end: usize) {
        while let Some(token) = self.peek(end) {
            match token {
                Token::Newline => break,
                Token::OpenRound | Token::OpenSquare | Token::OpenCurly => {
                    if self.take_block(end).is_none() {
                        self.pos += 1;
                    }
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Statements outside any target: declarations are collected, `if`
    /// bodies are searched for more declarations, everything else is skipped.
    fn read_top_level(&mut self, range: Range<usize>) {
        let resume = self.pos;
        let end = range.end;
        self.pos = range.start;
        loop {
            self.skip_newlines(end);
            let start = self.pos;
            match self.peek(end) {
                None => break,
                Some(Token::Ident) => {}
                Some(_) => {
                    self.skip_stray(end);
                    continue;
                }
            }
            let word = self.tokens.text(start..start + 1);
            self.pos += 1;
            if word == "if" {
                tracing::trace!("searching conditional block for targets");
                self.walk_chain(start, end, |ctx, body, _| ctx.read_top_level(body));
                continue;
            }
            if self.peek(end) != Some(Token::OpenRound) {
                if self.read_assign_op(end).is_some() {
                    self.read_value(end, false);
                } else {
                    self.skip_expression(end);
                }
                continue;
            }
            let Some(args) = self.take_block(end) else {
                self.diagnose(start, format!("unterminated `{word}(`"));
                self.recover(start, end);
                continue;
            };
            // The body may open on a later line.
            let after_args = self.pos;
            self.skip_newlines(end);
            let body = if self.peek(end) == Some(Token::OpenCurly) {
                match self.take_block(end) {
                    Some(body) => Some(body),
                    None => {
                        self.diagnose(start, format!("unterminated block after `{word}(...)`"));
                        self.recover(start, end);
                        continue;
                    }
                }
            } else {
                self.pos = after_args;
                None
            };
            match TargetType::from_gn_function(word) {
                Some(kind) => self.declare_target(kind, start, args, body),
                None => tracing::debug!(function = word, "skipping top-level call"),
            }
        }
        self.pos = resume;
    }

    fn declare_target(
        &mut self,
        kind: TargetType,
        start: usize,
        args: Range<usize>,
        body: Option<Range<usize>>,
    ) {
        let raw = self.tokens.text(args.clone()).trim();
        let name = if raw.starts_with('"') {
            self.tokens.literal(args)
        } else {
            Some(raw.to_string())
        };
        let Some(name) = name.filter(|name| TARGET_NAME.is_match(name)) else {
            self.diagnose(start, format!("malformed {kind} header `{kind}({raw})`"));
            return;
        };
        let Some(body) = body else {
            self.diagnose(start, format!("{kind} \"{name}\" has no body"));
            return;
        };
        if self.seen.contains(&name) {
            self.diagnose(start, format!("duplicate target \"{name}\"; keeping the first"));
            return;
        }

        let mut builder = TargetBuilder::new(name.clone(), kind);
        let (properties, conditions) = self.read_properties(body, &mut builder.ignored);
        builder.properties = properties;
        builder.conditions = conditions;
        if !builder.ignored.is_empty() {
            tracing::debug!(name = %name, ignored = ?builder.ignored, "dropped unmodelled keys");
        }
        tracing::trace!(name = %name, %kind, "read target");
        self.seen.insert(name);
        self.targets.push(builder.build());
    }

    /// Assignments and conditions inside a target or condition body.
    fn read_properties(
        &mut self,
        range: Range<usize>,
        ignored: &mut BTreeSet<String>,
    ) -> (Properties, Vec<ConditionBlock>) {
        let resume = self.pos;
        let end = range.end;
        self.pos = range.start;
        let mut properties = Properties::default();
        let mut conditions = Vec::new();
        loop {
            self.skip_newlines(end);
            let start = self.pos;
            match self.peek(end) {
                None => break,
                Some(Token::Ident) => {}
                Some(_) => {
                    self.skip_stray(end);
                    continue;
                }
            }
            let word = self.tokens.text(start..start + 1);
            self.pos += 1;
            if word == "if" {
                self.walk_chain(start, end, |ctx, body, predicate| {
                    let (properties, nested) = ctx.read_properties(body, &mut *ignored);
                    conditions.push(ConditionBlock {
                        predicate,
                        properties,
                        conditions: nested,
                    });
                });
                continue;
            }
            match self.read_assign_op(end) {
                Some(op) => {
                    let value = self.read_value(end, true);
                    self.assign(&mut properties, ignored, start, word, op, value);
                }
                None if self.peek(end) == Some(Token::OpenRound) => {
                    tracing::trace!(function = word, "skipping call in target body");
                    self.skip_expression(end);
                }
                None => {
                    self.diagnose(start, format!("expected an assignment after `{word}`"));
                    self.skip_expression(end);
                }
            }
        }
        self.pos = resume;
        (properties, conditions)
    }

    fn read_assign_op(&mut self, end: usize) -> Option<AssignOp> {
        let op = match self.peek(end)? {
            Token::Equal => AssignOp::Assign,
            Token::PlusEqual => AssignOp::Append,
            Token::MinusEqual => AssignOp::Remove,
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn assign(
        &mut self,
        properties: &mut Properties,
        ignored: &mut BTreeSet<String>,
        at: usize,
        key: &str,
        op: AssignOp,
        value: Option<PropertyValue>,
    ) {
        let Some(known) = PropertyKey::from_gn(key) else {
            tracing::trace!(key, "ignoring unmodelled key");
            ignored.insert(key.to_string());
            return;
        };
        if op == AssignOp::Remove {
            tracing::debug!(key, "`-=` is not evaluated; ignoring");
            return;
        }
        let Some(value) = value else {
            self.diagnose(at, format!("`{key}` is not assigned a literal value"));
            return;
        };
        let found = value.shape();
        // Aliases such as `cflags_cc` add to the slot they share.
        let append = op == AssignOp::Append || key != known.gn_name();
        if !properties.apply(known, value, append) {
            let message = if found == known.shape() {
                format!("`{key} +=` needs a list value")
            } else {
                format!(
                    "`{key}` expects a {} value, found a {}",
                    shape_name(known.shape()),
                    shape_name(found)
                )
            };
            self.diagnose(at, message);
        }
    }

    /// A literal value, possibly a `+` concatenation of list literals.
    /// Anything else is stepped over and yields `None`.
    fn read_value(&mut self, end: usize, report: bool) -> Option<PropertyValue> {
        self.skip_newlines(end);
        let mut value = self.read_operand(end, report);
        loop {
            let save = self.pos;
            self.skip_newlines(end);
            let op = match self.peek(end) {
                Some(op @ (Token::Plus | Token::Minus)) => op,
                _ => {
                    self.pos = save;
                    return value;
                }
            };
            self.pos += 1;
            self.skip_newlines(end);
            let rhs = self.read_operand(end, report);
            value = match (op, value, rhs) {
                (Token::Plus, Some(PropertyValue::List(mut lhs)), Some(PropertyValue::List(rhs))) => {
                    lhs.extend(rhs);
                    Some(PropertyValue::List(lhs))
                }
                _ => None,
            };
        }
    }

    fn read_operand(&mut self, end: usize, report: bool) -> Option<PropertyValue> {
        let start = self.pos;
        match self.peek(end)? {
            Token::OpenSquare => match self.take_block(end) {
                Some(inner) => Some(PropertyValue::List(self.read_list(inner, report))),
                None => {
                    if report {
                        self.diagnose(start, "unterminated list");
                    }
                    self.recover(start, end);
                    None
                }
            },
            Token::Str => {
                self.pos += 1;
                self.tokens.literal(start..start + 1).map(PropertyValue::String)
            }
            Token::UnterminatedStr => {
                if report {
                    self.diagnose(start, "unterminated string");
                }
                self.recover(start, end);
                None
            }
            Token::Ident => {
                self.pos += 1;
                match self.tokens.text(start..start + 1) {
                    "true" => Some(PropertyValue::Bool(true)),
                    "false" => Some(PropertyValue::Bool(false)),
                    _ => {
                        // Variable, call, scope access or subscript.
                        loop {
                            match self.peek(end) {
                                Some(Token::OpenRound | Token::OpenSquare)
                                    if self.take_block(end).is_some() => {}
                                Some(Token::Dot) => {
                                    self.pos += 1;
                                    if self.peek(end) == Some(Token::Ident) {
                                        self.pos += 1;
                                    }
                                }
                                _ => break,
                            }
                        }
                        None
                    }
                }
            }
            Token::Minus | Token::Number => {
                self.pos += 1;
                if self.peek(end) == Some(Token::Number) {
                    self.pos += 1;
                }
                None
            }
            _ => None,
        }
    }

    fn read_list(&mut self, inner: Range<usize>, report: bool) -> Vec<String> {
        let mut items = Vec::new();
        for item in self.tokens.split_items(inner) {
            match self.tokens.literal(item.clone()) {
                Some(value) => items.push(value),
                None if report => {
                    let raw = self.tokens.text(item.clone());
                    self.diagnose(item.start, format!("list item `{raw}` is not a string literal"));
                }
                None => {}
            }
        }
        items
    }

    /// Walk an `if (..) { } else if (..) { } else { }` chain whose `if` has
    /// just been read, calling `branch` with each body and the predicate
    /// under which that body applies.
    fn walk_chain(
        &mut self,
        start: usize,
        end: usize,
        mut branch: impl FnMut(&mut Self, Range<usize>, String),
    ) {
        let mut earlier: Vec<String> = Vec::new();
        let Some(first) = self.read_predicate(start, end) else {
            return;
        };
        let mut own = Some(first);
        loop {
            self.skip_newlines(end);
            if self.peek(end) != Some(Token::OpenCurly) {
                self.diagnose(start, "expected `{` after condition");
                self.skip_expression(end);
                return;
            }
            let Some(body) = self.take_block(end) else {
                self.diagnose(start, "unterminated condition block");
                self.recover(start, end);
                return;
            };
            let predicate = GN_PREDICATES.branch(&earlier, own.as_deref());
            branch(self, body, predicate);
            let Some(taken) = own else {
                return;
            };
            earlier.push(taken);

            let save = self.pos;
            self.skip_newlines(end);
            if !self.at_word(end, "else") {
                self.pos = save;
                return;
            }
            self.pos += 1;
            self.skip_newlines(end);
            let after_else = self.pos;
            if self.at_word(end, "if") {
                self.pos += 1;
                match self.read_predicate(after_else, end) {
                    Some(predicate) => own = Some(predicate),
                    None => return,
                }
            } else {
                own = None;
            }
        }
    }

    fn read_predicate(&mut self, start: usize, end: usize) -> Option<String> {
        self.skip_newlines(end);
        if self.peek(end) != Some(Token::OpenRound) {
            self.diagnose(start, "expected `(` after `if`");
            self.skip_expression(end);
            return None;
        }
        let Some(range) = self.take_block(end) else {
            self.diagnose(start, "unterminated condition");
            self.recover(start, end);
            return None;
        };
        Some(self.tokens.text(range).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(source: &str) -> Target {
        let parsed = read_gn(source);
        assert_eq!(parsed.targets.len(), 1, "{parsed:?}");
        parsed.targets.into_iter().next().unwrap()
    }

    #[test]
    fn test_hello_on_one_line() {
        let target = only(r#"executable("hello") { sources = ["main.cc"] deps = [":lib"] }"#);
        assert_eq!(target.name, "hello");
        assert_eq!(target.kind, TargetType::Executable);
        assert_eq!(target.sources, vec!["main.cc"]);
        assert_eq!(target.deps, vec![":lib"]);
    }

    #[test]
    fn test_all_kinds() {
        for kind in TargetType::ALL {
            let Some(function) = kind.gn_function() else {
                continue;
            };
            let target = only(&format!("{function}(\"t\") {{\n}}\n"));
            assert_eq!(target.kind, kind);
        }
    }

    #[test]
    fn test_properties_and_flags() {
        let target = only(
            r#"
# Library with everything.
static_library("base") {
  sources = [
    "a.cc",   # first
    "b.cc",
  ]
  public = [ "a.h" ]
  public_deps = [ "//third_party:zlib" ]
  private_deps = [ ":impl" ]
  data_deps = [ ":runtime" ]
  cflags = [ "-Wall" ]
  cflags_cc = [ "-std=c++17" ]
  ldflags = [ "-pthread" ]
  include_dirs = [ "include" ]
  defines = [ "NAME=\"base\"" ]
  visibility = [ ":*" ]
  configs += [ ":strict" ]
  output_name = "base_lib"
  testonly = true
  complete_static_lib = false
}
"#,
        );
        assert_eq!(target.sources, vec!["a.cc", "b.cc"]);
        assert_eq!(target.headers, vec!["a.h"]);
        assert_eq!(target.public_deps, vec!["//third_party:zlib"]);
        assert_eq!(target.private_deps, vec![":impl"]);
        assert_eq!(target.data_deps, vec![":runtime"]);
        assert_eq!(target.compile_flags, vec!["-Wall", "-std=c++17"]);
        assert_eq!(target.link_flags, vec!["-pthread"]);
        assert_eq!(target.include_dirs, vec!["include"]);
        assert_eq!(target.defines, vec!["NAME=\"base\""]);
        assert_eq!(target.visibility, vec![":*"]);
        assert_eq!(target.configs, vec![":strict"]);
        assert_eq!(target.output_name.as_deref(), Some("base_lib"));
        assert!(target.testonly);
        assert!(!target.complete_static_lib);
    }

    #[test]
    fn test_action_fields() {
        let target = only(
            r#"
action("gen") {
  script = "gen.py"
  inputs = [ "in.txt" ]
  outputs = [ "$target_gen_dir/out.h" ]
  response_file_name = "gen.rsp"
  args = [ "--verbose" ]
}
"#,
        );
        assert_eq!(target.kind, TargetType::Action);
        assert_eq!(target.script.as_deref(), Some("gen.py"));
        assert_eq!(target.inputs, vec!["in.txt"]);
        assert_eq!(target.outputs, vec!["$target_gen_dir/out.h"]);
        assert_eq!(target.response_file_name.as_deref(), Some("gen.rsp"));
    }

    #[test]
    fn test_nested_conditions() {
        let target = only(
            r#"executable("app") {
  if (X) {
    if (Y) {
      cflags = ["-Os"]
    }
  }
}"#,
        );
        assert_eq!(target.conditions.len(), 1);
        let outer = &target.conditions[0];
        assert_eq!(outer.predicate, "X");
        assert!(outer.properties.is_empty());
        assert_eq!(outer.conditions.len(), 1);
        let inner = &outer.conditions[0];
        assert_eq!(inner.predicate, "Y");
        assert_eq!(inner.properties.compile_flags, Some(vec!["-Os".to_string()]));
        assert!(inner.conditions.is_empty());
    }

    #[test]
    fn test_else_chain_becomes_sibling_blocks() {
        let target = only(
            r#"executable("app") {
  if (is_linux) {
    sources = [ "linux.cc" ]
  } else if (is_mac) {
    sources = [ "mac.cc" ]
  } else {
    sources = []
  }
}"#,
        );
        let predicates: Vec<_> = target.conditions.iter().map(|c| c.predicate.as_str()).collect();
        assert_eq!(
            predicates,
            vec!["is_linux", "!(is_linux) && (is_mac)", "!(is_linux) && !(is_mac)"]
        );
        assert_eq!(target.conditions[2].properties.sources, Some(vec![]));
    }

    #[test]
    fn test_empty_list_versus_absent() {
        let empty = only(r#"group("g") { sources = [] }"#);
        assert!(empty.sources.is_empty());
        let absent = only(r#"group("g") { }"#);
        assert!(absent.sources.is_empty());
    }

    #[test]
    fn test_malformed_header_is_skipped() {
        let parsed = read_gn(
            r#"
executable(bad name) {
  sources = [ "x.cc" ]
}
executable("good") {
  sources = [ "main.cc" ]
}
"#,
        );
        assert_eq!(parsed.targets.len(), 1);
        assert_eq!(parsed.targets[0].name, "good");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].line, 2);
    }

    #[test]
    fn test_unterminated_body_recovers() {
        let parsed = read_gn(
            r#"executable("a") {
  sources = [ "a.cc" ]
executable("b") {
}
"#,
        );
        let names: Vec<_> = parsed.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
        assert!(!parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let parsed = read_gn(
            r#"
group("g") { deps = [ ":a" ] }
group("g") { deps = [ ":b" ] }
"#,
        );
        assert_eq!(parsed.targets.len(), 1);
        assert_eq!(parsed.targets[0].deps, vec![":a"]);
        assert!(parsed.diagnostics[0].message.contains("duplicate"));
    }

    #[test]
    fn test_skips_unevaluated_constructs() {
        let parsed = read_gn(
            r#"
import("//build/config.gni")
declare_args() {
  use_foo = true
}
common = [ "common.cc" ]
config("strict") {
  cflags = [ "-Werror" ]
}
template("wrapper") {
  executable(target_name) {
    forward_variables_from(invoker, "*")
  }
}
if (is_linux) {
  executable("linux_only") {
    forward_variables_from(invoker, [ "testonly" ])
    assert(defined(invoker.x))
    sources = common + [ "x.cc" ]
    deps = [ ":a", some_var ]
    frameworks = [ "Foo.framework" ]
  }
} else {
  group("other") {}
}
"#,
        );
        let names: Vec<_> = parsed.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["linux_only", "other"]);
        let target = &parsed.targets[0];
        assert!(target.sources.is_empty());
        assert_eq!(target.deps, vec![":a"]);
        let messages: Vec<_> = parsed.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "`sources` is not assigned a literal value",
                "list item `some_var` is not a string literal",
            ]
        );
    }

    #[test]
    fn test_list_concatenation_and_remove() {
        let target = only(
            r#"source_set("s") {
  sources = [ "a.cc" ] + [ "b.cc" ]
  sources += [ "c.cc" ]
  sources -= [ "a.cc" ]
}"#,
        );
        assert_eq!(target.sources, vec!["a.cc", "b.cc", "c.cc"]);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let parsed = read_gn(r#"executable("a") { sources = "main.cc" testonly = [ "x" ] }"#);
        assert_eq!(parsed.targets.len(), 1);
        assert!(parsed.targets[0].sources.is_empty());
        assert_eq!(parsed.diagnostics.len(), 2);
        assert!(parsed.diagnostics[0].message.contains("expects a list"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(r#"[ "a", "b", ]"#), vec!["a", "b"]);
        assert_eq!(parse_list(r#"["a,b", "c"]"#), vec!["a,b", "c"]);
        assert_eq!(parse_list(r#"["say \"hi\", ok", "x"]"#), vec![r#"say "hi", ok"#, "x"]);
        assert_eq!(parse_list(r#"[ "a\\", "b" ]"#), vec!["a\\", "b"]);
        assert_eq!(parse_list("[]"), Vec::<String>::new());
        assert_eq!(parse_list("[ # only a comment\n ]"), Vec::<String>::new());
    }

    #[test]
    fn test_unquote_keeps_dollar_escape() {
        assert_eq!(unquote(r#"a\"b"#), "a\"b");
        assert_eq!(unquote(r"a\\b"), r"a\b");
        assert_eq!(unquote(r"\$root"), r"\$root");
        assert_eq!(unquote(r"trailing\"), r"trailing\");
    }

    #[test]
    fn test_slash_comments_and_labels() {
        let target = only(
            r#"
// A line comment.
group("g") {
  // Another one.
  deps = [ "//base:base" ]
}
"#,
        );
        assert_eq!(target.deps, vec!["//base:base"]);
    }

    #[test]
    fn test_body_on_next_line() {
        let parsed = read_gn(
            "executable(\"hello\")\n{\n  sources = [ \"main.cc\" ]\n}\n\
             group(\"g\")\n\n  {\n}\n",
        );
        assert!(parsed.diagnostics.is_empty(), "{parsed:?}");
        let names: Vec<_> = parsed.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["hello", "g"]);
        assert_eq!(parsed.targets[0].sources, vec!["main.cc"]);
    }

    #[test]
    fn test_call_without_body_leaves_next_statement() {
        let parsed = read_gn("import(\"//build/x.gni\")\ngroup(\"g\") {\n}\n");
        assert_eq!(parsed.targets.len(), 1);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_multibyte_text_keeps_columns() {
        let parsed = read_gn("executable(\"app\") { sources = [ \"ü.cc\", other ] }\n");
        assert_eq!(parsed.targets[0].sources, vec!["ü.cc"]);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].message, "list item `other` is not a string literal");
        assert_eq!(parsed.diagnostics[0].column, 41);
    }

    #[test]
    fn test_bare_header_name() {
        let target = only("shared_library(foo.bar) {\n}\n");
        assert_eq!(target.name, "foo.bar");
    }
}

//! GN tokens.
//!
//! Whitespace other than newlines and comments (`#` and `//`) never reach
//! the reader. Newlines are kept since they end a skipped statement.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+|#[^\n]*|//[^\n]*")]
pub(crate) enum Token {
    #[token("\n")]
    Newline,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Number,
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Str,
    /// A string that reaches the end of its line without closing.
    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    UnterminatedStr,

    #[token("(")]
    OpenRound,
    #[token(")")]
    CloseRound,
    #[token("[")]
    OpenSquare,
    #[token("]")]
    CloseSquare,
    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    #[token("=")]
    Equal,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    /// Comparison and boolean operators; only ever stepped over.
    #[regex(r"==|!=|<=|>=|&&|\|\||[<>!]")]
    Operator,

    /// Anything the lexer does not recognize.
    Unknown,
}

impl Token {
    /// The closing token for an opening bracket.
    pub(crate) fn closer(self) -> Option<Token> {
        match self {
            Token::OpenRound => Some(Token::CloseRound),
            Token::OpenSquare => Some(Token::CloseSquare),
            Token::OpenCurly => Some(Token::CloseCurly),
            _ => None,
        }
    }
}

/// A token and the bytes it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Tokenize GN source. Unrecognized input becomes [`Token::Unknown`].
pub(crate) fn tokenize(source: &str) -> Vec<Lexeme> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    while let Some(result) = lexer.next() {
        lexemes.push(Lexeme {
            token: result.unwrap_or(Token::Unknown),
            span: lexer.span(),
        });
    }
    lexemes
}

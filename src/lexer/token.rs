use phf::phf_map;

use crate::error::Position;

pub static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '+' => TokenKind::Operation,
    '-' => TokenKind::Operation,
    '*' => TokenKind::Operation,
    '/' => TokenKind::Operation,
    '%' => TokenKind::Operation,
    '^' => TokenKind::Operation,
    '>' => TokenKind::Operation,
    '<' => TokenKind::Operation,
    '&' => TokenKind::Operation,
    '=' => TokenKind::Operation,
    ':' => TokenKind::Colon,
    ';' => TokenKind::Semicolon,
    '{' => TokenKind::CurlyBracket,
    '}' => TokenKind::CurlyBracket,
    '(' => TokenKind::Bracket,
    ')' => TokenKind::Bracket,
    '[' => TokenKind::SquareBracket,
    ']' => TokenKind::SquareBracket,
    ',' => TokenKind::Comma,
};

pub static TWO_SYMBOLS_TOKENS: phf::Map<&'static str, TokenKind> = phf_map! {
    "==" => TokenKind::Operation,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    Operation,
    Colon,
    Semicolon,
    CurlyBracket,
    Bracket,
    SquareBracket,
    Comma,
    EndOfStream,
}

/// A lexeme borrowed from the source buffer. Tokens are never owned by the
/// later stages, they are copied around as `(span, kind, position)` triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'src> {
    pub lexeme: &'src str,
    pub kind: TokenKind,
    pub pos: Position,
}

impl<'src> Token<'src> {
    pub fn new(lexeme: &'src str, kind: TokenKind, pos: Position) -> Self {
        Self { lexeme, kind, pos }
    }

    pub fn end_of_stream(pos: Position) -> Self {
        Self {
            lexeme: "",
            kind: TokenKind::EndOfStream,
            pos,
        }
    }

    pub fn is(&self, lexeme: &str) -> bool {
        self.lexeme == lexeme
    }

    pub fn is_eos(&self) -> bool {
        self.kind == TokenKind::EndOfStream
    }

    /// `(`, `[` or `{`.
    pub fn is_opening(&self) -> bool {
        matches!(self.lexeme, "(" | "[" | "{")
            && matches!(
                self.kind,
                TokenKind::Bracket | TokenKind::SquareBracket | TokenKind::CurlyBracket
            )
    }
}

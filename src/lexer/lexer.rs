use log::debug;

use super::{
    token::{ONE_SYMBOL_TOKENS, TWO_SYMBOLS_TOKENS},
    Token, TokenKind,
};
use crate::error::{CompileError, CompileResult, Position};

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    tokens: Vec<Token<'src>>,
    index: usize,
    line: usize,
    line_start: usize,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: vec![],
            index: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.index - self.line_start + 1)
    }

    fn new_token(&mut self, kind: TokenKind, len: usize) {
        let lexeme = &self.source[self.index..self.index + len];
        let pos = self.position();
        self.tokens.push(Token::new(lexeme, kind, pos));
        self.index += len;
    }

    fn parse_number(&mut self) {
        let len = self.source[self.index..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        self.new_token(TokenKind::Number, len);
    }

    fn parse_identifier(&mut self) {
        let len = self.source[self.index..]
            .bytes()
            .take_while(|&b| b.is_ascii_alphanumeric() || b == b'_')
            .count();
        self.new_token(TokenKind::Identifier, len);
    }

    fn _tokenize(&mut self) -> CompileResult<()> {
        let bytes = self.source.as_bytes();

        while self.index < bytes.len() {
            let c = bytes[self.index];
            let c2 = self.source.get(self.index..self.index + 2);

            if c == b'\n' {
                self.index += 1;
                self.line += 1;
                self.line_start = self.index;
            } else if matches!(c, b' ' | b'\t' | b'\r') {
                self.index += 1;
            } else if c.is_ascii_digit() {
                self.parse_number();
            } else if c.is_ascii_alphabetic() || c == b'_' {
                self.parse_identifier();
            } else if let Some(kind) = c2.and_then(|s| TWO_SYMBOLS_TOKENS.get(s)) {
                self.new_token(*kind, 2);
            } else if let Some(kind) = ONE_SYMBOL_TOKENS.get(&(c as char)) {
                self.new_token(*kind, 1);
            } else {
                // the cursor only ever advances over ascii, so it sits on a char boundary
                let ch = self.source[self.index..].chars().next().unwrap_or('\0');
                return Err(CompileError::Lex {
                    ch,
                    pos: self.position(),
                });
            }
        }

        let eos = Token::end_of_stream(self.position());
        self.tokens.push(eos);
        Ok(())
    }

    /// Splits `source` into tokens, ending with an `EndOfStream` sentinel.
    pub fn tokenize(source: &'src str) -> CompileResult<Vec<Token<'src>>> {
        let mut lexer = Lexer::new(source);
        lexer._tokenize()?;
        debug!("tokenized {} tokens", lexer.tokens.len());

        Ok(lexer.tokens)
    }
}

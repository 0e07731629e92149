use log::debug;
use phf::phf_map;

use super::precedence::matching_bracket;
use super::{parse_expression, Expr, Program, Scope, Statement};
use crate::analyzer::{Ty, PRIMITIVES};
use crate::error::{CompileError, CompileResult, Position};
use crate::lexer::{Token, TokenKind};

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "exit" => Keyword::Exit,
    "print" => Keyword::Print,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "while" => Keyword::While,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Exit,
    Print,
    If,
    Else,
    While,
}

/// Statement parser. Holds a cursor over a token stream that always ends in
/// an `EndOfStream` token; nested scopes get their own parser over the
/// tokens between the braces.
#[derive(Debug)]
pub struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    index: usize,
}

impl<'src> Parser<'src> {
    pub fn new(mut tokens: Vec<Token<'src>>) -> Self {
        if !tokens.last().is_some_and(|t| t.is_eos()) {
            let pos = tokens.last().map_or(Position::new(1, 1), |t| t.pos);
            tokens.push(Token::end_of_stream(pos));
        }
        Self { tokens, index: 0 }
    }

    pub fn parse(&mut self) -> CompileResult<Program<'src>> {
        let stmts = self.parse_statements()?;
        debug!("parsed {} top-level statements", stmts.len());

        Ok(Program(stmts))
    }

    fn peek(&self) -> &Token<'src> {
        // the stream ends in EndOfStream and the cursor never moves past it
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token<'src> {
        let i = (self.index + offset).min(self.tokens.len() - 1);
        &self.tokens[i]
    }

    fn keyword(token: &Token) -> Option<Keyword> {
        if token.kind != TokenKind::Identifier {
            return None;
        }
        KEYWORDS.get(token.lexeme).copied()
    }

    /// Index of the first `;` at or after `from`.
    fn next_semicolon(&self, from: usize) -> CompileResult<usize> {
        for i in from..self.tokens.len() {
            let t = &self.tokens[i];
            match t.kind {
                TokenKind::Semicolon => return Ok(i),
                TokenKind::CurlyBracket => {
                    return Err(CompileError::syntax(
                        t,
                        format!("expected ';' before '{}'", t.lexeme),
                    ))
                }
                TokenKind::EndOfStream => {
                    return Err(CompileError::syntax(t, "expected ';' before end of input"))
                }
                _ => (),
            }
        }
        Err(CompileError::internal("token stream without EndOfStream"))
    }

    /// Index of the `=` separating a declared type from its initializer.
    fn next_top_level_equals(&self, from: usize) -> CompileResult<usize> {
        for i in from..self.tokens.len() {
            let t = &self.tokens[i];
            match t.kind {
                TokenKind::Operation if t.is("=") => return Ok(i),
                TokenKind::Semicolon | TokenKind::CurlyBracket | TokenKind::EndOfStream => {
                    return Err(CompileError::syntax(t, "expected '=' in declaration"))
                }
                _ => (),
            }
        }
        Err(CompileError::internal("token stream without EndOfStream"))
    }

    /// Index of the `{` opening the body of an `if` or `while`.
    fn next_open_curly(&self, from: usize) -> CompileResult<usize> {
        for i in from..self.tokens.len() {
            let t = &self.tokens[i];
            match t.kind {
                TokenKind::CurlyBracket if t.is("{") => return Ok(i),
                TokenKind::Semicolon | TokenKind::CurlyBracket | TokenKind::EndOfStream => {
                    return Err(CompileError::syntax(t, "expected '{' after condition"))
                }
                _ => (),
            }
        }
        Err(CompileError::internal("token stream without EndOfStream"))
    }

    fn parse_statements(&mut self) -> CompileResult<Vec<Statement<'src>>> {
        let mut stmts = vec![];
        while !self.peek().is_eos() {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// stmt = "exit" expr ";"
    ///      | "print" expr ";"
    ///      | ident ":" type "=" expr ";"
    ///      | ident "=" expr ";"
    ///      | "{" stmt* "}"
    ///      | "if" expr "{" stmt* "}" ("else" "{" stmt* "}")?
    ///      | "while" expr "{" stmt* "}"
    fn parse_statement(&mut self) -> CompileResult<Statement<'src>> {
        let t = *self.peek();

        if let Some(keyword) = Self::keyword(&t) {
            return match keyword {
                Keyword::Exit => Ok(Statement::Exit(self.parse_terminated_expr(self.index + 1)?)),
                Keyword::Print => Ok(Statement::Print(self.parse_terminated_expr(self.index + 1)?)),
                Keyword::If => self.parse_if(),
                Keyword::While => self.parse_while(),
                Keyword::Else => Err(CompileError::syntax(&t, "'else' without a matching 'if'")),
            };
        }

        let next = *self.peek_at(1);
        match t.kind {
            TokenKind::Identifier if next.kind == TokenKind::Colon => self.parse_var_decl(),
            TokenKind::Identifier if next.kind == TokenKind::Operation && next.is("=") => {
                let value = self.parse_terminated_expr(self.index + 2)?;
                Ok(Statement::VarAssign { name: t, value })
            }
            TokenKind::CurlyBracket if t.is("{") => Ok(Statement::Scope(self.parse_braced(self.index)?)),
            _ => Err(CompileError::syntax(
                &t,
                format!("unknown statement starting with '{}'", t.lexeme),
            )),
        }
    }

    /// Parses the expression from `start` to the next `;` and moves past it.
    fn parse_terminated_expr(&mut self, start: usize) -> CompileResult<Expr<'src>> {
        let semi = self.next_semicolon(start)?;
        let expr = parse_expression(&self.tokens[start..semi], self.tokens[semi].pos)?;
        self.index = semi + 1;
        Ok(expr)
    }

    fn parse_var_decl(&mut self) -> CompileResult<Statement<'src>> {
        let name = self.tokens[self.index];
        let type_start = self.index + 2;
        let equals = self.next_top_level_equals(type_start)?;
        let ty = parse_type(&self.tokens[type_start..equals], self.tokens[equals].pos)?;
        let value = self.parse_terminated_expr(equals + 1)?;

        Ok(Statement::VarDecl { name, ty, value })
    }

    /// Parses `{ ... }` opening at `open` and moves past the closing brace.
    fn parse_braced(&mut self, open: usize) -> CompileResult<Scope<'src>> {
        let close = matching_bracket(&self.tokens, open)?;
        let scope = parse_scope(&self.tokens[open + 1..close], self.tokens[close].pos)?;
        self.index = close + 1;
        Ok(scope)
    }

    fn parse_condition(&mut self) -> CompileResult<(Expr<'src>, Scope<'src>)> {
        let start = self.index + 1;
        let open = self.next_open_curly(start)?;
        let condition = parse_expression(&self.tokens[start..open], self.tokens[open].pos)?;
        let body = self.parse_braced(open)?;
        Ok((condition, body))
    }

    fn parse_if(&mut self) -> CompileResult<Statement<'src>> {
        let (condition, then_body) = self.parse_condition()?;

        let else_body = if Self::keyword(self.peek()) == Some(Keyword::Else) {
            let open = self.index + 1;
            let brace = self.peek_at(1);
            if brace.kind != TokenKind::CurlyBracket || !brace.is("{") {
                return Err(CompileError::syntax(brace, "expected '{' after 'else'"));
            }
            Some(self.parse_braced(open)?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> CompileResult<Statement<'src>> {
        let (condition, body) = self.parse_condition()?;
        Ok(Statement::While { condition, body })
    }
}

/// Parses a whole token stream, as produced by the lexer.
pub fn parse_program<'src>(tokens: Vec<Token<'src>>) -> CompileResult<Program<'src>> {
    Parser::new(tokens).parse()
}

/// Parses the statements between a pair of braces. `end` is the position of
/// the closing brace and becomes the position of the synthetic end of stream.
pub fn parse_scope<'src>(tokens: &[Token<'src>], end: Position) -> CompileResult<Scope<'src>> {
    let mut inner = tokens.to_vec();
    inner.push(Token::end_of_stream(end));

    let mut parser = Parser::new(inner);
    Ok(Scope(parser.parse_statements()?))
}

/// type = "u64" | "ptr" type | "[" number "]" type
pub fn parse_type(tokens: &[Token], end: Position) -> CompileResult<Ty> {
    let Some(first) = tokens.first() else {
        return Err(CompileError::Syntax {
            message: "expected a type".to_string(),
            pos: end,
        });
    };

    match first.kind {
        TokenKind::Identifier if first.is("ptr") => Ok(Ty::ptr(parse_type(&tokens[1..], end)?)),
        TokenKind::Identifier => {
            let Some(primitive) = PRIMITIVES.get(first.lexeme) else {
                return Err(CompileError::syntax(
                    first,
                    format!("unknown type '{}'", first.lexeme),
                ));
            };
            if let Some(extra) = tokens.get(1) {
                return Err(CompileError::syntax(
                    extra,
                    format!("unexpected '{}' after type", extra.lexeme),
                ));
            }
            Ok(Ty::Primitive(*primitive))
        }
        TokenKind::SquareBracket if first.is("[") => {
            let len = match tokens.get(1) {
                Some(t) if t.kind == TokenKind::Number => t.lexeme.parse::<usize>().map_err(|_| {
                    CompileError::syntax(t, "array length is too large")
                })?,
                Some(t) => return Err(CompileError::syntax(t, "expected an array length")),
                None => {
                    return Err(CompileError::Syntax {
                        message: "expected an array length".to_string(),
                        pos: end,
                    })
                }
            };
            if len == 0 {
                return Err(CompileError::syntax(&tokens[1], "array length must be at least 1"));
            }
            match tokens.get(2) {
                Some(t) if t.kind == TokenKind::SquareBracket && t.is("]") => (),
                Some(t) => return Err(CompileError::syntax(t, "expected ']' after array length")),
                None => {
                    return Err(CompileError::Syntax {
                        message: "expected ']' after array length".to_string(),
                        pos: end,
                    })
                }
            }
            Ok(Ty::array(parse_type(&tokens[3..], end)?, len))
        }
        _ => Err(CompileError::syntax(
            first,
            format!("expected a type, found '{}'", first.lexeme),
        )),
    }
}

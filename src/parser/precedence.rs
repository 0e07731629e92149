use super::{BinOpKind, Expr, BINARY_OPERATIONS, UNARY_OPERATIONS, UNARY_PRECEDENCE};
use crate::error::{CompileError, CompileResult, Position};
use crate::lexer::{Token, TokenKind};

enum Split {
    Binary(usize),
    Unary(usize),
    None,
}

fn closing_of(opening: &str) -> &'static str {
    match opening {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

fn opening_of(closing: &str) -> &'static str {
    match closing {
        ")" => "(",
        "]" => "[",
        _ => "{",
    }
}

/// Index of the bracket closing `tokens[open]`.
pub(crate) fn matching_bracket(tokens: &[Token], open: usize) -> CompileResult<usize> {
    let opening = tokens[open];
    let closing = closing_of(opening.lexeme);

    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(open) {
        if t.kind != opening.kind {
            continue;
        }
        if t.lexeme == opening.lexeme {
            depth += 1;
        } else if t.lexeme == closing {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
    }

    Err(CompileError::syntax(
        &opening,
        format!("expected a closing '{}'", closing),
    ))
}

/// Index of the bracket opening `tokens[close]`, scanning backwards.
fn matching_opening_bracket(tokens: &[Token], close: usize) -> CompileResult<usize> {
    let closing = tokens[close];
    let opening = opening_of(closing.lexeme);

    let mut depth = 0usize;
    for i in (0..=close).rev() {
        let t = &tokens[i];
        if t.kind != closing.kind {
            continue;
        }
        if t.lexeme == closing.lexeme {
            depth += 1;
        } else if t.lexeme == opening {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
    }

    Err(CompileError::syntax(
        &closing,
        format!("unmatched closing '{}'", closing.lexeme),
    ))
}

fn binary_operation(token: &Token) -> CompileResult<(BinOpKind, u8)> {
    BINARY_OPERATIONS.get(token.lexeme).copied().ok_or_else(|| {
        CompileError::syntax(
            token,
            format!("unknown binary operation '{}'", token.lexeme),
        )
    })
}

/// Finds the root operator of `tokens`: the rightmost binary operator of
/// lowest precedence outside brackets, or a leading unary operator.
fn find_split(tokens: &[Token]) -> CompileResult<Split> {
    let mut was_operator = true;
    let mut binary: Option<(usize, u8)> = None;
    let mut unary: Option<usize> = None;

    let mut i = 0;
    while i < tokens.len() {
        let t = &tokens[i];
        match t.kind {
            TokenKind::Bracket | TokenKind::SquareBracket if t.is_opening() => {
                i = matching_bracket(tokens, i)?;
                was_operator = false;
            }
            TokenKind::Bracket | TokenKind::SquareBracket => {
                return Err(CompileError::syntax(
                    t,
                    format!("unmatched closing '{}'", t.lexeme),
                ));
            }
            TokenKind::Operation => {
                if was_operator {
                    if binary.is_none() && unary.is_none() {
                        unary = Some(i);
                    }
                } else {
                    let (_, precedence) = binary_operation(t)?;
                    let bound = binary
                        .map(|(_, p)| p)
                        .or(unary.map(|_| UNARY_PRECEDENCE));
                    if bound.map_or(true, |b| precedence <= b) {
                        binary = Some((i, precedence));
                        unary = None;
                    }
                }
                was_operator = true;
            }
            _ => was_operator = false,
        }
        i += 1;
    }

    Ok(match (binary, unary) {
        (Some((i, _)), _) => Split::Binary(i),
        (None, Some(i)) => Split::Unary(i),
        (None, None) => Split::None,
    })
}

fn parse_leaf<'src>(token: &Token<'src>) -> CompileResult<Expr<'src>> {
    match token.kind {
        TokenKind::Number => {
            if token.lexeme.parse::<u64>().is_err() {
                return Err(CompileError::syntax(
                    token,
                    "number literal does not fit in u64",
                ));
            }
            Ok(Expr::Number(*token))
        }
        TokenKind::Identifier => Ok(Expr::Ident(*token)),
        _ => Err(CompileError::syntax(
            token,
            format!("unexpected token '{}' in expression", token.lexeme),
        )),
    }
}

/// `e1, e2, ...` between the brackets of an array literal.
fn parse_elements<'src>(tokens: &[Token<'src>], end: Position) -> CompileResult<Vec<Expr<'src>>> {
    let mut elements = vec![];
    if tokens.is_empty() {
        return Ok(elements);
    }

    let mut start = 0;
    let mut i = 0;
    while i < tokens.len() {
        let t = &tokens[i];
        if t.is_opening() {
            i = matching_bracket(tokens, i)?;
        } else if t.kind == TokenKind::Comma {
            elements.push(parse_expression(&tokens[start..i], t.pos)?);
            start = i + 1;
        }
        i += 1;
    }
    elements.push(parse_expression(&tokens[start..], end)?);

    Ok(elements)
}

/// `base[index]` or `[e1, e2, ...]`, the only forms left once no operator
/// splits the slice.
fn parse_postfix<'src>(tokens: &[Token<'src>]) -> CompileResult<Expr<'src>> {
    let last = tokens.len() - 1;
    let closing = &tokens[last];

    if closing.kind != TokenKind::SquareBracket || !closing.is("]") {
        return Err(CompileError::syntax(
            &tokens[0],
            "expected an operation in expression",
        ));
    }

    let open = matching_opening_bracket(tokens, last)?;
    let inner = &tokens[open + 1..last];
    if open == 0 {
        return Ok(Expr::Array {
            bracket: tokens[0],
            elements: parse_elements(inner, closing.pos)?,
        });
    }

    let base = parse_expression(&tokens[..open], tokens[open].pos)?;
    let index = parse_expression(inner, closing.pos)?;
    Ok(Expr::binary(BinOpKind::Index, tokens[open], base, index))
}

/// Parses a bounded slice of tokens into an expression tree.
///
/// `end` is the position reported when the slice is empty, normally the
/// position of the token that terminates the slice in the enclosing stream.
pub fn parse_expression<'src>(tokens: &[Token<'src>], end: Position) -> CompileResult<Expr<'src>> {
    let Some(first) = tokens.first() else {
        return Err(CompileError::Syntax {
            message: "expression must not be empty".to_string(),
            pos: end,
        });
    };
    let last = tokens.len() - 1;
    if last == 0 {
        return parse_leaf(first);
    }

    if first.kind == TokenKind::Bracket
        && first.is("(")
        && matching_bracket(tokens, 0)? == last
    {
        return parse_expression(&tokens[1..last], tokens[last].pos);
    }

    match find_split(tokens)? {
        Split::Binary(i) => {
            let op = tokens[i];
            let (kind, _) = binary_operation(&op)?;
            let left = parse_expression(&tokens[..i], op.pos)?;
            let right = parse_expression(&tokens[i + 1..], end)?;
            Ok(Expr::binary(kind, op, left, right))
        }
        Split::Unary(i) => {
            let op = tokens[i];
            let Some(kind) = UNARY_OPERATIONS.get(op.lexeme) else {
                return Err(CompileError::syntax(
                    &op,
                    format!("unknown unary operation '{}'", op.lexeme),
                ));
            };
            let operand = parse_expression(&tokens[i + 1..], end)?;
            Ok(Expr::unary(*kind, op, operand))
        }
        Split::None => parse_postfix(tokens),
    }
}

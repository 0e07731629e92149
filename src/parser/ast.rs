use super::Expr;
use crate::analyzer::Ty;
use crate::lexer::Token;

#[derive(Clone, Debug, PartialEq)]
pub struct Program<'src>(pub Vec<Statement<'src>>);

/// Body of a `{ ... }` block, `if`/`else` branch or `while` loop.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scope<'src>(pub Vec<Statement<'src>>);

#[derive(Clone, Debug, PartialEq)]
pub enum Statement<'src> {
    VarDecl {
        name: Token<'src>,
        ty: Ty,
        value: Expr<'src>,
    },
    VarAssign {
        name: Token<'src>,
        value: Expr<'src>,
    },
    Exit(Expr<'src>),
    Print(Expr<'src>),
    Scope(Scope<'src>),
    If {
        condition: Expr<'src>,
        then_body: Scope<'src>,
        else_body: Option<Scope<'src>>,
    },
    While {
        condition: Expr<'src>,
        body: Scope<'src>,
    },
}

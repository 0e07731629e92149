use std::fmt;

use phf::phf_map;

use crate::lexer::Token;

/// Binary operators with their precedence, lowest binds loosest.
/// `Index` has no entry: it comes from the postfix `base[index]` form.
pub static BINARY_OPERATIONS: phf::Map<&'static str, (BinOpKind, u8)> = phf_map! {
    ">" => (BinOpKind::Greater, 0),
    "==" => (BinOpKind::Equal, 0),
    "<" => (BinOpKind::Less, 0),
    "+" => (BinOpKind::Add, 1),
    "-" => (BinOpKind::Sub, 1),
    "%" => (BinOpKind::Mod, 2),
    "*" => (BinOpKind::Mul, 2),
    "/" => (BinOpKind::Div, 2),
    "^" => (BinOpKind::Pow, 3),
};

pub static UNARY_OPERATIONS: phf::Map<&'static str, UnaryOpKind> = phf_map! {
    "&" => UnaryOpKind::AddressOf,
    "*" => UnaryOpKind::Deref,
};

/// Unary operators bind tighter than every binary operator.
pub const UNARY_PRECEDENCE: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Greater,
    Less,
    Equal,
    Index,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Pow => "^",
            BinOpKind::Greater => ">",
            BinOpKind::Less => "<",
            BinOpKind::Equal => "==",
            BinOpKind::Index => "[]",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOpKind {
    AddressOf,
    Deref,
}

impl UnaryOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOpKind::AddressOf => "&",
            UnaryOpKind::Deref => "*",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr<'src> {
    Number(Token<'src>),
    Ident(Token<'src>),
    Binary {
        kind: BinOpKind,
        op: Token<'src>,
        left: Box<Expr<'src>>,
        right: Box<Expr<'src>>,
    },
    Unary {
        kind: UnaryOpKind,
        op: Token<'src>,
        operand: Box<Expr<'src>>,
    },
    Array {
        bracket: Token<'src>,
        elements: Vec<Expr<'src>>,
    },
}

impl<'src> Expr<'src> {
    pub fn binary(kind: BinOpKind, op: Token<'src>, left: Expr<'src>, right: Expr<'src>) -> Self {
        Expr::Binary {
            kind,
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(kind: UnaryOpKind, op: Token<'src>, operand: Expr<'src>) -> Self {
        Expr::Unary {
            kind,
            op,
            operand: Box::new(operand),
        }
    }

    /// The token errors about this expression are reported at.
    pub fn token(&self) -> &Token<'src> {
        match self {
            Expr::Number(t) | Expr::Ident(t) => t,
            Expr::Binary { op, .. } | Expr::Unary { op, .. } => op,
            Expr::Array { bracket, .. } => bracket,
        }
    }
}

/// Fully parenthesized rendering, independent of token positions.
impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(t) | Expr::Ident(t) => write!(f, "{}", t.lexeme),
            Expr::Binary {
                kind: BinOpKind::Index,
                left,
                right,
                ..
            } => write!(f, "{}[{}]", left, right),
            Expr::Binary {
                kind, left, right, ..
            } => write!(f, "({} {} {})", left, kind.symbol(), right),
            Expr::Unary { kind, operand, .. } => write!(f, "({}{})", kind.symbol(), operand),
            Expr::Array { elements, .. } => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            }
        }
    }
}

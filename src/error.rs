use std::fmt;

use thiserror::Error;

use crate::analyzer::Ty;
use crate::lexer::Token;

/// 1-based source position of a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    #[error("use of undeclared variable '{0}'")]
    UnresolvedName(String),
    #[error("variable '{0}' is already declared in this scope")]
    DuplicateDeclaration(String),
    #[error("type mismatch, expected {expected} but found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("{0}")]
    InvalidOperandKind(String),
}

impl SemanticErrorKind {
    pub fn mismatch(expected: &Ty, found: &Ty) -> Self {
        SemanticErrorKind::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{pos}: lex error: unknown symbol '{ch}'")]
    Lex { ch: char, pos: Position },

    #[error("{pos}: syntax error: {message}")]
    Syntax { message: String, pos: Position },

    #[error("{pos}: semantic error: {kind}")]
    Semantic {
        kind: SemanticErrorKind,
        pos: Position,
    },

    #[error("unsupported output format '{0}', the output file must end in .c or .asm")]
    UnsupportedOutputFormat(String),

    #[error("{pos}: {feature} is not supported by this backend")]
    Unsupported { feature: &'static str, pos: Position },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal compiler error: {0}")]
    Internal(String),
}

impl CompileError {
    pub fn syntax(token: &Token, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            message: message.into(),
            pos: token.pos,
        }
    }

    pub fn semantic(token: &Token, kind: SemanticErrorKind) -> Self {
        CompileError::Semantic {
            kind,
            pos: token.pos,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal(message.into())
    }

    pub fn semantic_kind(&self) -> Option<&SemanticErrorKind> {
        match self {
            CompileError::Semantic { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Process exit status for the driver: user errors, internal defects and
    /// file errors are kept apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Lex { .. }
            | CompileError::Syntax { .. }
            | CompileError::Semantic { .. }
            | CompileError::UnsupportedOutputFormat(_)
            | CompileError::Unsupported { .. } => 1,
            CompileError::Internal(_) => 2,
            CompileError::Io(_) => 3,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

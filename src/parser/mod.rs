mod ast;
mod expr;
mod parser;
mod precedence;

pub use ast::*;
pub use expr::*;
pub use parser::*;
pub use precedence::parse_expression;

use super::{Ty, TypeEnv};
use crate::error::{CompileError, CompileResult, SemanticErrorKind};
use crate::lexer::Token;
use crate::parser::{BinOpKind, Expr, UnaryOpKind};

fn invalid_operand(token: &Token, reason: String) -> CompileError {
    CompileError::semantic(token, SemanticErrorKind::InvalidOperandKind(reason))
}

/// Arrays cannot be used where a single machine word is expected.
pub fn expect_scalar(ty: &Ty, at: &Token) -> CompileResult<()> {
    if ty.is_array() {
        return Err(CompileError::semantic(
            at,
            SemanticErrorKind::TypeMismatch {
                expected: "a scalar value".to_string(),
                found: ty.to_string(),
            },
        ));
    }
    Ok(())
}

/// Operand of `+ - * / % ^ > < ==`: neither a pointer nor an array.
fn expect_arithmetic(ty: &Ty, at: &Token) -> CompileResult<()> {
    expect_scalar(ty, at)?;
    if ty.is_pointer() {
        return Err(CompileError::semantic(
            at,
            SemanticErrorKind::mismatch(&Ty::U64, ty),
        ));
    }
    Ok(())
}

/// Infers the type of `expr` against the names visible in `env`.
pub fn infer_type<E: TypeEnv + ?Sized>(env: &E, expr: &Expr) -> CompileResult<Ty> {
    match expr {
        Expr::Number(_) => Ok(Ty::U64),
        Expr::Ident(name) => env.type_of(name.lexeme).cloned().ok_or_else(|| {
            CompileError::semantic(
                name,
                SemanticErrorKind::UnresolvedName(name.lexeme.to_string()),
            )
        }),
        Expr::Unary {
            kind: UnaryOpKind::AddressOf,
            op,
            operand,
        } => {
            if !matches!(operand.as_ref(), Expr::Ident(_)) {
                return Err(invalid_operand(
                    op,
                    "cannot take the address of a value that is not a variable".to_string(),
                ));
            }
            Ok(Ty::ptr(infer_type(env, operand)?))
        }
        Expr::Unary {
            kind: UnaryOpKind::Deref,
            op,
            operand,
        } => match infer_type(env, operand)? {
            Ty::Ptr(inner) => Ok(*inner),
            ty => Err(invalid_operand(
                op,
                format!("cannot dereference a value of type {}", ty),
            )),
        },
        Expr::Binary {
            kind: BinOpKind::Index,
            op,
            left,
            right,
        } => {
            let element = match infer_type(env, left)? {
                Ty::Array(element, _) => *element,
                ty => {
                    return Err(invalid_operand(
                        op,
                        format!("cannot index a value of type {}", ty),
                    ))
                }
            };
            let index = infer_type(env, right)?;
            if index != Ty::U64 {
                return Err(invalid_operand(
                    right.token(),
                    format!("array index must be u64, found {}", index),
                ));
            }
            Ok(element)
        }
        Expr::Binary { left, right, .. } => {
            let l = infer_type(env, left)?;
            expect_arithmetic(&l, left.token())?;
            let r = infer_type(env, right)?;
            expect_arithmetic(&r, right.token())?;
            Ok(l)
        }
        Expr::Array { bracket, elements } => {
            let Some((first, rest)) = elements.split_first() else {
                return Err(invalid_operand(
                    bracket,
                    "array literal must have at least one element".to_string(),
                ));
            };
            let element = infer_type(env, first)?;
            for e in rest {
                let ty = infer_type(env, e)?;
                if ty != element {
                    return Err(CompileError::semantic(
                        e.token(),
                        SemanticErrorKind::mismatch(&element, &ty),
                    ));
                }
            }
            Ok(Ty::array(element, elements.len()))
        }
    }
}

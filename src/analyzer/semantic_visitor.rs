use log::debug;

use super::{expect_scalar, infer_type, SymbolTable};
use crate::error::{CompileError, CompileResult, SemanticErrorKind};
use crate::parser::{Expr, Program, Scope, Statement};

/// Walks a parsed program and validates names and types. The tree is not
/// modified; the first error stops the walk.
pub struct SemanticVisitor<'src> {
    symbol_table: SymbolTable<'src>,
}

impl<'src> Default for SemanticVisitor<'src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> SemanticVisitor<'src> {
    pub fn new() -> Self {
        Self {
            symbol_table: SymbolTable::new(),
        }
    }

    pub fn visit_program(&mut self, program: &Program<'src>) -> CompileResult<()> {
        for stmt in program.0.iter() {
            self.visit_statement(stmt)?;
        }
        Ok(())
    }

    pub fn visit_statement(&mut self, stmt: &Statement<'src>) -> CompileResult<()> {
        match stmt {
            Statement::VarDecl { name, ty, value } => {
                let found = infer_type(&self.symbol_table, value)?;
                if self.symbol_table.is_declared_in_current_scope(name.lexeme) {
                    return Err(CompileError::semantic(
                        name,
                        SemanticErrorKind::DuplicateDeclaration(name.lexeme.to_string()),
                    ));
                }
                if *ty != found {
                    return Err(CompileError::semantic(
                        value.token(),
                        SemanticErrorKind::mismatch(ty, &found),
                    ));
                }
                self.symbol_table.declare(*name, ty.clone())
            }
            Statement::VarAssign { name, value } => {
                let expected = self.symbol_table.resolve(name)?.ty.clone();
                let found = infer_type(&self.symbol_table, value)?;
                if expected != found {
                    return Err(CompileError::semantic(
                        value.token(),
                        SemanticErrorKind::mismatch(&expected, &found),
                    ));
                }
                Ok(())
            }
            Statement::Exit(value) | Statement::Print(value) => self.visit_scalar(value),
            Statement::Scope(scope) => self.visit_scope(scope),
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                self.visit_scalar(condition)?;
                self.visit_scope(then_body)?;
                if let Some(else_body) = else_body {
                    self.visit_scope(else_body)?;
                }
                Ok(())
            }
            Statement::While { condition, body } => {
                self.visit_scalar(condition)?;
                self.visit_scope(body)
            }
        }
    }

    fn visit_scalar(&mut self, expr: &Expr<'src>) -> CompileResult<()> {
        let ty = infer_type(&self.symbol_table, expr)?;
        expect_scalar(&ty, expr.token())
    }

    /// Checks `scope` against a snapshot of the current symbol table; the
    /// snapshot is dropped afterwards so nothing declared inside leaks out.
    fn visit_scope(&mut self, scope: &Scope<'src>) -> CompileResult<()> {
        let inner = self.symbol_table.enter();
        let outer = std::mem::replace(&mut self.symbol_table, inner);

        let result = scope
            .0
            .iter()
            .try_for_each(|stmt| self.visit_statement(stmt));

        self.symbol_table = outer;
        result
    }
}

/// Validates `program`: every name resolves and every type lines up.
pub fn check(program: &Program) -> CompileResult<()> {
    SemanticVisitor::new().visit_program(program)?;
    debug!("program checked");
    Ok(())
}

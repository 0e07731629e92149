use log::debug;

use crate::analyzer::{infer_type, Primitive, SymbolTable, Ty};
use crate::error::{CompileError, CompileResult};
use crate::parser::{BinOpKind, Expr, Program, Scope, Statement};

const PRELUDE: &str = "\
#include <stdint.h>
#include <stdio.h>
#include <stdlib.h>
#include <string.h>

static uint64_t mincc_pow(uint64_t base, uint64_t exp) {
    uint64_t result = 1;
    while (exp > 0) {
        if (exp & 1) {
            result *= base;
        }
        base *= base;
        exp >>= 1;
    }
    return result;
}

int main(void) {
";

/// C name of a source variable. Nothing in the prelude or the C headers
/// starts with `v_`.
fn c_ident(name: &str) -> String {
    format!("v_{}", name)
}

fn c_primitive(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::U64 => "uint64_t",
    }
}

/// C declarator for a value of type `ty` named `inner`; an empty `inner`
/// gives the abstract declarator used in casts.
fn c_declarator(ty: &Ty, inner: String) -> String {
    match ty {
        Ty::Primitive(p) if inner.is_empty() => c_primitive(*p).to_string(),
        Ty::Primitive(p) => format!("{} {}", c_primitive(*p), inner),
        Ty::Ptr(pointee) if pointee.is_array() => c_declarator(pointee, format!("(*{})", inner)),
        Ty::Ptr(pointee) => c_declarator(pointee, format!("*{}", inner)),
        Ty::Array(element, len) => c_declarator(element, format!("{}[{}]", inner, len)),
    }
}

/// Brace initializer listing every scalar of an array value, `base` being
/// C text that designates the array.
fn c_elements(base: &str, element: &Ty, len: usize) -> String {
    let items: Vec<String> = (0..len)
        .map(|i| {
            let item = format!("({}[{}])", base, i);
            match element {
                Ty::Array(inner, inner_len) => c_elements(&item, inner, *inner_len),
                _ => item,
            }
        })
        .collect();
    format!("{{{}}}", items.join(", "))
}

fn mentions(expr: &Expr, name: &str) -> bool {
    match expr {
        Expr::Number(_) => false,
        Expr::Ident(t) => t.lexeme == name,
        Expr::Unary { operand, .. } => mentions(operand, name),
        Expr::Binary { left, right, .. } => mentions(left, name) || mentions(right, name),
        Expr::Array { elements, .. } => elements.iter().any(|e| mentions(e, name)),
    }
}

/// C11 backend. Statements map one to one onto C statements inside `main`.
pub struct Transpiler<'src> {
    text: String,
    depth: usize,
    temp_index: usize,
    symbol_table: SymbolTable<'src>,
}

impl<'src> Default for Transpiler<'src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> Transpiler<'src> {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            depth: 1,
            temp_index: 0,
            symbol_table: SymbolTable::new(),
        }
    }

    pub fn generate(mut self, program: &Program<'src>) -> CompileResult<String> {
        self.text.push_str(PRELUDE);
        for stmt in program.0.iter() {
            self.gen_statement(stmt)?;
        }
        self.line("return 0;");
        self.text.push_str("}\n");

        debug!("transpiled {} top-level statements", program.0.len());
        Ok(self.text)
    }

    fn line(&mut self, line: &str) {
        for _ in 0..self.depth {
            self.text.push_str("    ");
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn gen_statement(&mut self, stmt: &Statement<'src>) -> CompileResult<()> {
        match stmt {
            Statement::VarDecl { name, ty, value } => {
                let mut init = self.render_initializer(value, ty)?;
                // a C declaration is already in scope inside its own initializer
                if self.symbol_table.lookup(name.lexeme).is_some() && mentions(value, name.lexeme) {
                    let temp = format!("mincc_shadow{}", self.temp_index);
                    self.temp_index += 1;
                    self.line(&format!("{} = {};", c_declarator(ty, temp.clone()), init));
                    init = match ty {
                        Ty::Array(element, len) => c_elements(&temp, element, *len),
                        _ => temp,
                    };
                }
                let declarator = c_declarator(ty, c_ident(name.lexeme));
                self.line(&format!("{} = {};", declarator, init));
                self.symbol_table.declare(*name, ty.clone())?;
            }
            Statement::VarAssign { name, value } => {
                let ty = self.symbol_table.resolve(name)?.ty.clone();
                let target = c_ident(name.lexeme);
                if ty.is_array() {
                    let source = match value {
                        Expr::Array { .. } => self.render_compound_literal(value, &ty)?,
                        _ => self.render_expr(value)?,
                    };
                    self.line(&format!(
                        "memcpy({}, {}, sizeof({}));",
                        target, source, target
                    ));
                } else {
                    let value = self.render_expr(value)?;
                    self.line(&format!("{} = {};", target, value));
                }
            }
            Statement::Exit(value) => {
                let value = self.render_expr(value)?;
                self.line(&format!("exit((int)(uint64_t)({}));", value));
            }
            Statement::Print(value) => {
                let value = self.render_expr(value)?;
                self.line(&format!("putchar((int)((uint64_t)({}) & 0xff));", value));
            }
            Statement::Scope(scope) => {
                self.line("{");
                self.gen_scope(scope)?;
                self.line("}");
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                let condition = self.render_expr(condition)?;
                self.line(&format!("if ({}) {{", condition));
                self.gen_scope(then_body)?;
                if let Some(else_body) = else_body {
                    self.line("} else {");
                    self.gen_scope(else_body)?;
                }
                self.line("}");
            }
            Statement::While { condition, body } => {
                let condition = self.render_expr(condition)?;
                self.line(&format!("while ({}) {{", condition));
                self.gen_scope(body)?;
                self.line("}");
            }
        }
        Ok(())
    }

    fn gen_scope(&mut self, scope: &Scope<'src>) -> CompileResult<()> {
        let inner = self.symbol_table.enter();
        let outer = std::mem::replace(&mut self.symbol_table, inner);
        self.depth += 1;

        let result = scope
            .0
            .iter()
            .try_for_each(|stmt| self.gen_statement(stmt));

        self.depth -= 1;
        self.symbol_table = outer;
        result
    }

    /// Brace initializer for an array of type `ty`.
    fn render_initializer(&self, value: &Expr, ty: &Ty) -> CompileResult<String> {
        let Ty::Array(element, len) = ty else {
            return self.render_expr(value);
        };
        match value {
            Expr::Array { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|e| self.render_initializer(e, element))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(format!("{{{}}}", items.join(", ")))
            }
            _ => Ok(c_elements(&self.render_expr(value)?, element, *len)),
        }
    }

    fn render_compound_literal(&self, value: &Expr, ty: &Ty) -> CompileResult<String> {
        Ok(format!(
            "(({}){})",
            c_declarator(ty, String::new()),
            self.render_initializer(value, ty)?
        ))
    }

    fn render_expr(&self, expr: &Expr) -> CompileResult<String> {
        match expr {
            Expr::Number(literal) => Ok(format!("UINT64_C({})", literal.lexeme)),
            Expr::Ident(name) => Ok(c_ident(name.lexeme)),
            Expr::Unary { kind, operand, .. } => {
                let operand = self.render_expr(operand)?;
                Ok(format!("({}{})", kind.symbol(), operand))
            }
            Expr::Binary {
                kind: BinOpKind::Index,
                left,
                right,
                ..
            } => {
                let base = self.render_expr(left)?;
                let index = self.render_expr(right)?;
                Ok(format!("({}[{}])", base, index))
            }
            Expr::Binary {
                kind: BinOpKind::Pow,
                left,
                right,
                ..
            } => {
                let base = self.render_expr(left)?;
                let exp = self.render_expr(right)?;
                Ok(format!("mincc_pow({}, {})", base, exp))
            }
            Expr::Binary {
                kind, left, right, ..
            } => {
                let left = self.render_expr(left)?;
                let right = self.render_expr(right)?;
                let rendered = format!("({} {} {})", left, kind.symbol(), right);
                // C comparisons yield int
                Ok(match kind {
                    BinOpKind::Greater | BinOpKind::Less | BinOpKind::Equal => {
                        format!("((uint64_t){})", rendered)
                    }
                    _ => rendered,
                })
            }
            Expr::Array { bracket, .. } => {
                let ty = infer_type(&self.symbol_table, expr).map_err(|e| {
                    CompileError::internal(format!(
                        "array literal at {} has no type: {}",
                        bracket.pos, e
                    ))
                })?;
                self.render_compound_literal(expr, &ty)
            }
        }
    }
}

use log::{debug, trace};

use super::local_variables::{Local, LocalVariables};
use crate::analyzer::{infer_type, Ty};
use crate::error::{CompileError, CompileResult};
use crate::lexer::Token;
use crate::parser::{BinOpKind, Expr, Program, Scope, Statement, UnaryOpKind};

const WORD: usize = 8;
const SYS_WRITE: u64 = 1;
const SYS_EXIT: u64 = 60;
const STDOUT: u64 = 1;

macro_rules! emit {
    ($gen:expr, $($arg:tt)*) => {{
        $gen.text.push_str(&format!($($arg)*));
        $gen.text.push('\n');
    }};
}

/// NASM backend for x86-64 Linux.
///
/// Every value lives in the frame: a value of `size` bytes at offset `off`
/// occupies `[rbp - off, rbp - off + size)`. Expressions are evaluated into
/// the slot right above the `top` offset they are given, using the space
/// above that slot as scratch, and report the offset of their result.
pub struct Assembler<'src> {
    text: String,
    label_index: usize,
    last_offset: usize,
    frame_size: usize,
    locals: LocalVariables<'src>,
}

impl<'src> Default for Assembler<'src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> Assembler<'src> {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            label_index: 0,
            last_offset: 0,
            frame_size: 0,
            locals: LocalVariables::new(),
        }
    }

    pub fn generate(mut self, program: &Program<'src>) -> CompileResult<String> {
        for stmt in program.0.iter() {
            self.gen_statement(stmt)?;
        }

        let frame = self.frame_size.next_multiple_of(16);
        debug!(
            "assembled {} labels, frame of {} bytes",
            self.label_index, frame
        );

        let mut asm = String::from("bits 64\ndefault rel\nglobal _start\n\nsection .text\n_start:\n");
        asm.push_str("  push rbp\n  mov rbp, rsp\n");
        if frame > 0 {
            asm.push_str(&format!("  sub rsp, {}\n", frame));
        }
        asm.push_str(&self.text);
        asm.push_str(&format!("  mov rax, {}\n  xor rdi, rdi\n  syscall\n", SYS_EXIT));

        Ok(asm)
    }

    fn new_label(&mut self) -> usize {
        let id = self.label_index;
        self.label_index += 1;
        trace!("label id {}", id);
        id
    }

    /// Offset of a `size`-byte value placed right above `top`.
    fn slot(&mut self, top: usize, size: usize) -> usize {
        let offset = top + size;
        self.frame_size = self.frame_size.max(offset);
        offset
    }

    fn local(&self, name: &Token) -> CompileResult<&Local> {
        self.locals.get(name.lexeme).ok_or_else(|| {
            CompileError::internal(format!("'{}' has no frame slot", name.lexeme))
        })
    }

    fn type_of(&self, expr: &Expr) -> CompileResult<Ty> {
        infer_type(&self.locals, expr)
    }

    /// Copies `size` bytes from the address in rax to the value at `dst`.
    fn gen_copy_from_rax(&mut self, dst: usize, size: usize) {
        for k in (0..size).step_by(WORD) {
            emit!(self, "  mov rbx, qword [rax + {}]", k);
            emit!(self, "  mov qword [rbp - {}], rbx", dst - k);
        }
    }

    fn gen_statement(&mut self, stmt: &Statement<'src>) -> CompileResult<()> {
        let top = self.last_offset;
        match stmt {
            Statement::VarDecl { name, ty, value } => {
                let offset = self.gen_expr(value, top)?;
                trace!("'{}' lives at rbp - {}", name.lexeme, offset);
                self.last_offset = offset;
                self.locals.declare(name.lexeme, offset, ty.clone());
            }
            Statement::VarAssign { name, value } => {
                let local = self.local(name)?;
                let (offset, size) = (local.offset, local.ty.sizeof());
                let value = self.gen_expr(value, top)?;
                emit!(self, "  lea rax, [rbp - {}]", value);
                self.gen_copy_from_rax(offset, size);
            }
            Statement::Exit(value) => {
                let value = self.gen_expr(value, top)?;
                emit!(self, "  mov rax, {}", SYS_EXIT);
                emit!(self, "  mov rdi, qword [rbp - {}]", value);
                emit!(self, "  syscall");
            }
            Statement::Print(value) => {
                let value = self.gen_expr(value, top)?;
                emit!(self, "  mov rax, {}", SYS_WRITE);
                emit!(self, "  mov rdi, {}", STDOUT);
                emit!(self, "  lea rsi, [rbp - {}]", value);
                emit!(self, "  mov rdx, 1");
                emit!(self, "  syscall");
            }
            Statement::Scope(scope) => self.gen_scope(scope)?,
            Statement::If {
                condition,
                then_body,
                else_body,
            } => self.gen_if(condition, then_body, else_body.as_ref())?,
            Statement::While { condition, body } => self.gen_while(condition, body)?,
        }
        Ok(())
    }

    /// Generates `scope` with a copy of the visible variables, dropped on exit.
    /// Frame offsets handed out inside are never reused.
    fn gen_scope(&mut self, scope: &Scope<'src>) -> CompileResult<()> {
        let inner = self.locals.enter();
        let outer = std::mem::replace(&mut self.locals, inner);

        let result = scope
            .0
            .iter()
            .try_for_each(|stmt| self.gen_statement(stmt));

        self.locals = outer;
        result
    }

    fn gen_condition(&mut self, condition: &Expr<'src>) -> CompileResult<()> {
        let value = self.gen_expr(condition, self.last_offset)?;
        emit!(self, "  mov rax, qword [rbp - {}]", value);
        emit!(self, "  test rax, rax");
        Ok(())
    }

    fn gen_if(
        &mut self,
        condition: &Expr<'src>,
        then_body: &Scope<'src>,
        else_body: Option<&Scope<'src>>,
    ) -> CompileResult<()> {
        self.gen_condition(condition)?;
        let id = self.new_label();
        emit!(self, "  jz .IF{}", id);

        self.gen_scope(then_body)?;
        if else_body.is_some() {
            emit!(self, "  jmp .EL{}", id);
        }
        emit!(self, ".IF{}:", id);

        if let Some(else_body) = else_body {
            self.gen_scope(else_body)?;
            emit!(self, ".EL{}:", id);
        }
        Ok(())
    }

    fn gen_while(&mut self, condition: &Expr<'src>, body: &Scope<'src>) -> CompileResult<()> {
        let id = self.new_label();
        emit!(self, ".WHB{}:", id);
        self.gen_condition(condition)?;
        emit!(self, "  jz .WHE{}", id);

        self.gen_scope(body)?;
        emit!(self, "  jmp .WHB{}", id);
        emit!(self, ".WHE{}:", id);
        Ok(())
    }

    fn gen_bin_op_kind(kind: BinOpKind, op: &Token) -> CompileResult<&'static str> {
        Ok(match kind {
            BinOpKind::Add => "  add rax, rbx",
            BinOpKind::Sub => "  sub rax, rbx",
            BinOpKind::Mul => "  mul rbx",
            BinOpKind::Div => "  xor rdx, rdx\n  div rbx",
            BinOpKind::Mod => "  xor rdx, rdx\n  div rbx\n  mov rax, rdx",
            BinOpKind::Greater => "  cmp rax, rbx\n  seta al\n  movzx rax, al",
            BinOpKind::Less => "  cmp rax, rbx\n  setb al\n  movzx rax, al",
            BinOpKind::Equal => "  cmp rax, rbx\n  sete al\n  movzx rax, al",
            BinOpKind::Pow => {
                return Err(CompileError::Unsupported {
                    feature: "exponentiation",
                    pos: op.pos,
                })
            }
            BinOpKind::Index => {
                return Err(CompileError::internal("indexing is not an arithmetic operation"))
            }
        })
    }

    /// Evaluates `expr` into the slot above `top` and returns its offset.
    fn gen_expr(&mut self, expr: &Expr<'src>, top: usize) -> CompileResult<usize> {
        match expr {
            Expr::Number(literal) => {
                let dst = self.slot(top, WORD);
                emit!(self, "  mov rax, {}", literal.lexeme);
                emit!(self, "  mov qword [rbp - {}], rax", dst);
                Ok(dst)
            }
            Expr::Ident(name) => {
                let local = self.local(name)?;
                let (offset, size) = (local.offset, local.ty.sizeof());
                let dst = self.slot(top, size);
                emit!(self, "  lea rax, [rbp - {}]", offset);
                self.gen_copy_from_rax(dst, size);
                Ok(dst)
            }
            Expr::Unary {
                kind: UnaryOpKind::AddressOf,
                operand,
                ..
            } => self.gen_address(operand, top),
            Expr::Unary {
                kind: UnaryOpKind::Deref,
                operand,
                ..
            } => {
                let size = self.type_of(expr)?.sizeof();
                let pointer = self.gen_expr(operand, top)?;
                let dst = self.slot(top, size);
                emit!(self, "  mov rax, qword [rbp - {}]", pointer);
                self.gen_copy_from_rax(dst, size);
                Ok(dst)
            }
            Expr::Binary {
                kind: BinOpKind::Index,
                ..
            } => {
                let size = self.type_of(expr)?.sizeof();
                let address = self.gen_address(expr, top)?;
                let dst = self.slot(top, size);
                emit!(self, "  mov rax, qword [rbp - {}]", address);
                self.gen_copy_from_rax(dst, size);
                Ok(dst)
            }
            Expr::Binary {
                kind,
                op,
                left,
                right,
            } => {
                let instructions = Self::gen_bin_op_kind(*kind, op)?;
                let l = self.gen_expr(left, top)?;
                let r = self.gen_expr(right, l)?;
                emit!(self, "  mov rax, qword [rbp - {}]", l);
                emit!(self, "  mov rbx, qword [rbp - {}]", r);
                emit!(self, "{}", instructions);
                emit!(self, "  mov qword [rbp - {}], rax", l);
                Ok(l)
            }
            Expr::Array { elements, .. } => {
                let Some(first) = elements.first() else {
                    return Err(CompileError::internal("empty array literal after checking"));
                };
                let element_size = self.type_of(first)?.sizeof();
                let n = elements.len();
                // element i ends up at the i-th lowest address; the last one
                // is computed first so later scratch never overwrites it
                for (i, element) in elements.iter().enumerate().rev() {
                    self.gen_expr(element, top + (n - 1 - i) * element_size)?;
                }
                Ok(self.slot(top, n * element_size))
            }
        }
    }

    /// Stores the address of `expr` in a fresh word slot and returns its
    /// offset. Values without a home are materialized first.
    fn gen_address(&mut self, expr: &Expr<'src>, top: usize) -> CompileResult<usize> {
        match expr {
            Expr::Ident(name) => {
                let offset = self.local(name)?.offset;
                let dst = self.slot(top, WORD);
                emit!(self, "  lea rax, [rbp - {}]", offset);
                emit!(self, "  mov qword [rbp - {}], rax", dst);
                Ok(dst)
            }
            Expr::Unary {
                kind: UnaryOpKind::Deref,
                operand,
                ..
            } => self.gen_expr(operand, top),
            Expr::Binary {
                kind: BinOpKind::Index,
                left,
                right,
                ..
            } => {
                let element_size = self.type_of(expr)?.sizeof();
                let base = self.gen_address(left, top)?;
                let index = self.gen_expr(right, base)?;
                let dst = self.slot(index, WORD);
                emit!(self, "  mov rax, qword [rbp - {}]", base);
                emit!(self, "  mov rbx, qword [rbp - {}]", index);
                emit!(self, "  imul rbx, rbx, {}", element_size);
                emit!(self, "  add rax, rbx");
                emit!(self, "  mov qword [rbp - {}], rax", dst);
                Ok(dst)
            }
            _ => {
                let value = self.gen_expr(expr, top)?;
                let dst = self.slot(value, WORD);
                emit!(self, "  lea rax, [rbp - {}]", value);
                emit!(self, "  mov qword [rbp - {}], rax", dst);
                Ok(dst)
            }
        }
    }
}

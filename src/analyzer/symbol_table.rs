use super::Ty;
use crate::error::{CompileError, CompileResult, SemanticErrorKind};
use crate::lexer::Token;

/// Anything that can answer "what is the type of this name" for type
/// inference: the checker's symbol table, the transpiler's shadow scopes and
/// the assembler's frame.
pub trait TypeEnv {
    fn type_of(&self, name: &str) -> Option<&Ty>;
}

#[derive(Clone, Debug)]
pub struct Symbol<'src> {
    pub name: Token<'src>,
    pub ty: Ty,
}

/// Symbols declared in one lexical scope, unique by name.
#[derive(Clone, Debug, Default)]
pub struct LexicalScope<'src> {
    symbols: Vec<Symbol<'src>>,
}

impl<'src> LexicalScope<'src> {
    pub fn get(&self, name: &str) -> Option<&Symbol<'src>> {
        self.symbols.iter().find(|s| s.name.lexeme == name)
    }
}

/// Stack of lexical scopes, innermost last. The global scope is always
/// present.
#[derive(Clone, Debug)]
pub struct SymbolTable<'src> {
    scopes: Vec<LexicalScope<'src>>,
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> SymbolTable<'src> {
    pub fn new() -> Self {
        Self {
            scopes: vec![LexicalScope::default()],
        }
    }

    /// A copy of the whole stack with a fresh innermost scope pushed.
    /// Declarations made in the copy never reach `self`.
    pub fn enter(&self) -> Self {
        let mut table = self.clone();
        table.scopes.push(LexicalScope::default());
        table
    }

    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.get(name).is_some())
    }

    /// Adds `name` to the innermost scope. Fails if the innermost scope
    /// already has it; outer scopes may be shadowed.
    pub fn declare(&mut self, name: Token<'src>, ty: Ty) -> CompileResult<()> {
        if self.is_declared_in_current_scope(name.lexeme) {
            return Err(CompileError::semantic(
                &name,
                SemanticErrorKind::DuplicateDeclaration(name.lexeme.to_string()),
            ));
        }
        let Some(scope) = self.scopes.last_mut() else {
            return Err(CompileError::internal("symbol table without a global scope"));
        };
        scope.symbols.push(Symbol { name, ty });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol<'src>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Like [`SymbolTable::lookup`], failing with `UnresolvedName` at `name`.
    pub fn resolve(&self, name: &Token) -> CompileResult<&Symbol<'src>> {
        self.lookup(name.lexeme).ok_or_else(|| {
            CompileError::semantic(
                name,
                SemanticErrorKind::UnresolvedName(name.lexeme.to_string()),
            )
        })
    }
}

impl TypeEnv for SymbolTable<'_> {
    fn type_of(&self, name: &str) -> Option<&Ty> {
        self.lookup(name).map(|s| &s.ty)
    }
}

use std::collections::HashMap;

use crate::analyzer::{Ty, TypeEnv};

#[derive(Clone, Debug)]
pub(super) struct Local {
    pub offset: usize,
    pub ty: Ty,
}

/// Frame slots of the variables visible at one point of the program,
/// one table per lexical scope, innermost last.
#[derive(Clone, Debug)]
pub(super) struct LocalVariables<'src> {
    scopes: Vec<HashMap<&'src str, Local>>,
}

impl<'src> LocalVariables<'src> {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// A copy of every visible table with an empty one pushed on top.
    pub fn enter(&self) -> Self {
        let mut locals = self.clone();
        locals.scopes.push(HashMap::new());
        locals
    }

    pub fn declare(&mut self, name: &'src str, offset: usize, ty: Ty) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Local { offset, ty });
        }
    }

    pub fn get(&self, name: &str) -> Option<&Local> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl TypeEnv for LocalVariables<'_> {
    fn type_of(&self, name: &str) -> Option<&Ty> {
        self.get(name).map(|local| &local.ty)
    }
}

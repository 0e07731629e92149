mod assembler;
mod local_variables;
mod transpiler;

use std::path::Path;

use log::debug;

pub use assembler::*;
pub use transpiler::*;

use crate::error::{CompileError, CompileResult};
use crate::parser::Program;

/// Output flavour, picked from the output file's extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// `.c`: a C11 program.
    Transpiler,
    /// `.asm`: NASM source for x86-64 Linux.
    Assembler,
}

impl Backend {
    pub fn from_path(path: &Path) -> CompileResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("c") => Ok(Backend::Transpiler),
            Some("asm") => Ok(Backend::Assembler),
            _ => Err(CompileError::UnsupportedOutputFormat(
                path.display().to_string(),
            )),
        }
    }

    pub fn generate(self, program: &Program) -> CompileResult<String> {
        debug!("generating with the {:?} backend", self);
        match self {
            Backend::Transpiler => Transpiler::new().generate(program),
            Backend::Assembler => Assembler::new().generate(program),
        }
    }
}

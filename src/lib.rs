pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use std::fs;
use std::path::Path;

use log::debug;

use analyzer::check;
use codegen::Backend;
use error::CompileResult;
use lexer::Lexer;
use parser::parse_program;

/// Runs every stage on `source` and returns the generated program text.
pub fn compile(source: &str, backend: Backend) -> CompileResult<String> {
    let tokens = Lexer::tokenize(source)?;
    let program = parse_program(tokens)?;
    check(&program)?;
    backend.generate(&program)
}

/// Writes `text` to `output`. A file left behind by a failed write is
/// removed.
pub fn write_output(output: &Path, text: &str) -> CompileResult<()> {
    if let Err(e) = fs::write(output, text) {
        let _ = fs::remove_file(output);
        return Err(e.into());
    }
    debug!("wrote {} bytes to {}", text.len(), output.display());
    Ok(())
}

/// Compiles `source` into `output`, the backend being chosen by the
/// output's extension. Nothing is written unless every stage succeeds.
pub fn compile_to_file(source: &str, output: &Path) -> CompileResult<()> {
    let backend = Backend::from_path(output)?;
    let text = compile(source, backend)?;
    write_output(output, &text)
}

pub mod codegen;
pub mod types;

pub use codegen::{Codegen, EmitCtx};

use crate::ast::Program;
use crate::CompileError;

/// Compile an AST to C source text.
pub fn compile_ast_to_c(program: &Program) -> Result<String, CompileError> {
    let mut ctx = EmitCtx::new();
    let mut cg = Codegen::new();
    cg.emit_program(&mut ctx, program)?;
    Ok(cg.finish(&ctx))
}

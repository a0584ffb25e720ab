//! C backend: lowers the AST to C source text.
//!
//! Module layout:
//! - `c::types`   maps RaceLang type names to C type names
//! - `c::codegen` holds the emitter and its threaded `EmitCtx` state

pub mod c;

pub use c::compile_ast_to_c;

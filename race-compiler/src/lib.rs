//! RaceLang compiler library.
//!
//! The pipeline has two core stages: the tree builder, which lowers the
//! concrete parse tree produced by the frontend into an AST, and the C
//! backend, which walks the AST and emits C source text.

pub mod ast;
pub mod backend;
pub mod frontend;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Parse error at {line}:{col}: {message}")]
    Parse {
        line: usize,
        col: usize,
        message: String,
    },

    #[error("BuildError:{kind} ({line}:{col}) - {message}")]
    Build {
        kind: BuildErrorKind,
        line: usize,
        col: usize,
        message: String,
    },

    #[error("No C type mapping for '{type_name}'")]
    TypeMapping { type_name: String },

    #[error("No C lowering for {construct}")]
    UnsupportedLowering { construct: &'static str },

    #[error("Intrinsic '{name}' requires a template argument")]
    IntrinsicArity { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildErrorKind {
    UnknownInstanceKind,
    MissingChild,
    UnexpectedRule,
    UnsupportedCallee,
}

impl std::fmt::Display for BuildErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildErrorKind::UnknownInstanceKind => write!(f, "UnknownInstanceKind"),
            BuildErrorKind::MissingChild => write!(f, "MissingChild"),
            BuildErrorKind::UnexpectedRule => write!(f, "UnexpectedRule"),
            BuildErrorKind::UnsupportedCallee => write!(f, "UnsupportedCallee"),
        }
    }
}

/// Position of a token or parse-tree node in the source text (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// Lex and parse source text into a concrete parse tree.
pub fn parse_to_tree(source: &str) -> Result<frontend::parse_tree::ParseNode, CompileError> {
    let tokens = frontend::lexer::lex(source)?;
    frontend::parser::Parser::new(tokens).parse_program()
}

/// Compile source text to an AST.
pub fn compile_to_ast(source: &str) -> Result<ast::Program, CompileError> {
    let tree = parse_to_tree(source)?;
    ast::builder::lower(&tree)
}

/// Compile source text directly to C source text.
pub fn compile_to_c(source: &str) -> Result<String, CompileError> {
    let program = compile_to_ast(source)?;
    backend::compile_ast_to_c(&program)
}

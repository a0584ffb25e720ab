//! RaceLang frontend: lexing and concrete parse-tree construction.
//!
//! The frontend is a collaborator of the core pipeline: it produces the
//! parse tree that `ast::builder` lowers. One `ParseNode` is built per
//! grammar production, including the pass-through precedence layers the
//! builder later collapses.

pub mod lexer;
pub mod parse_tree;
pub mod parser;

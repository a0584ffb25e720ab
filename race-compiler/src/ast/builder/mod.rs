//! Parse tree to AST lowering module.
//!
//! One mapping function per parse-tree production, each returning a typed
//! AST value. Grammar-only wrapper productions (the precedence chain) are
//! collapsed here: a layer with no operator at its level is never
//! materialized as an AST node.

mod expr;
mod stmt;

pub(crate) use expr::lower_expression;
use stmt::lower_block;

use super::{
    FieldDecl, FieldValue, FnDecl, Import, InstanceDecl, InstanceKind, Item, Module, Param,
    Program, StructDecl,
};
use crate::frontend::lexer::TokenKind;
use crate::frontend::parse_tree::{ParseNode, Rule};
use crate::{BuildErrorKind, CompileError};

/// Entry point: lower a `Program` parse tree into an AST.
pub fn lower(tree: &ParseNode) -> Result<Program, CompileError> {
    if !tree.is(Rule::Program) {
        return Err(unexpected_rule(tree, "a program"));
    }
    let items = tree
        .nodes()
        .map(lower_item)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Program { items })
}

fn lower_item(node: &ParseNode) -> Result<Item, CompileError> {
    match node.rule {
        Rule::Module => Ok(Item::Module(lower_module(node)?)),
        Rule::ImportStmt => Ok(Item::Import(lower_import(node)?)),
        Rule::StructDecl => Ok(Item::Struct(lower_struct_decl(node)?)),
        Rule::FunctionDecl => Ok(Item::Fn(lower_fn_decl(node)?)),
        Rule::Instance => Ok(Item::Instance(lower_instance(node)?)),
        _ => Err(unexpected_rule(node, "a top-level item")),
    }
}

fn lower_module(node: &ParseNode) -> Result<Module, CompileError> {
    let name = ident_text(node, "module name")?;
    let items = node
        .nodes()
        .map(lower_item)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Module { name, items })
}

fn lower_import(node: &ParseNode) -> Result<Import, CompileError> {
    Ok(Import {
        module: ident_text(node, "module name")?,
    })
}

fn lower_struct_decl(node: &ParseNode) -> Result<StructDecl, CompileError> {
    let name = ident_text(node, "struct name")?;
    let fields = node
        .nodes_of(Rule::FieldDecl)
        .map(lower_field_decl)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StructDecl { name, fields })
}

fn lower_field_decl(node: &ParseNode) -> Result<FieldDecl, CompileError> {
    Ok(FieldDecl {
        name: ident_text(node, "field name")?,
        type_name: type_text(node)?,
    })
}

fn lower_instance(node: &ParseNode) -> Result<InstanceDecl, CompileError> {
    let mut idents = node.tokens_of(TokenKind::Ident);
    let kind_token = idents
        .next()
        .ok_or_else(|| missing_child(node, "instance kind"))?;
    let name_token = idents
        .next()
        .ok_or_else(|| missing_child(node, "instance name"))?;

    let kind = InstanceKind::from_keyword(&kind_token.text).ok_or_else(|| {
        build_error(
            BuildErrorKind::UnknownInstanceKind,
            node,
            format!("Unknown instance kind '{}'", kind_token.text),
        )
    })?;

    let fields = node
        .nodes_of(Rule::FieldValue)
        .map(lower_field_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InstanceDecl {
        kind,
        name: name_token.text.clone(),
        fields,
    })
}

pub(crate) fn lower_field_value(node: &ParseNode) -> Result<FieldValue, CompileError> {
    let value = node
        .node(Rule::Expression)
        .ok_or_else(|| missing_child(node, "field value"))?;
    Ok(FieldValue {
        name: ident_text(node, "field name")?,
        value: lower_expression(value)?,
    })
}

fn lower_fn_decl(node: &ParseNode) -> Result<FnDecl, CompileError> {
    let name = ident_text(node, "function name")?;
    let params = match node.node(Rule::ParamList) {
        Some(list) => list
            .nodes_of(Rule::Param)
            .map(lower_param)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    // A `Type` directly under the function node is the return type; parameter
    // types are nested inside the param list.
    let return_type = node.node(Rule::Type).map(type_name_of).transpose()?;
    let body = node
        .node(Rule::Block)
        .ok_or_else(|| missing_child(node, "function body"))?;
    Ok(FnDecl {
        name,
        params,
        return_type,
        body: lower_block(body)?.statements,
    })
}

fn lower_param(node: &ParseNode) -> Result<Param, CompileError> {
    Ok(Param {
        name: ident_text(node, "parameter name")?,
        type_name: type_text(node)?,
    })
}

// ------------ Shared helpers ------------

pub(crate) fn build_error(
    kind: BuildErrorKind,
    node: &ParseNode,
    message: String,
) -> CompileError {
    CompileError::Build {
        kind,
        line: node.loc.line,
        col: node.loc.column,
        message,
    }
}

pub(crate) fn missing_child(node: &ParseNode, what: &str) -> CompileError {
    build_error(
        BuildErrorKind::MissingChild,
        node,
        format!("{:?} node is missing its {}", node.rule, what),
    )
}

pub(crate) fn unexpected_rule(node: &ParseNode, expected: &str) -> CompileError {
    build_error(
        BuildErrorKind::UnexpectedRule,
        node,
        format!("Expected {}, found a {:?} node", expected, node.rule),
    )
}

fn ident_text(node: &ParseNode, what: &str) -> Result<String, CompileError> {
    node.ident()
        .map(|t| t.text.clone())
        .ok_or_else(|| missing_child(node, what))
}

fn type_text(node: &ParseNode) -> Result<String, CompileError> {
    let ty = node
        .node(Rule::Type)
        .ok_or_else(|| missing_child(node, "type"))?;
    type_name_of(ty)
}

fn type_name_of(ty: &ParseNode) -> Result<String, CompileError> {
    ty.ident()
        .map(|t| t.text.clone())
        .ok_or_else(|| missing_child(ty, "type name"))
}

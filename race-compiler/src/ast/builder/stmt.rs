use super::{lower_expression, missing_child, unexpected_rule};
use crate::ast::{AssignOp, Block, Stmt};
use crate::frontend::lexer::TokenKind;
use crate::frontend::parse_tree::{ParseNode, Rule};
use crate::CompileError;

pub(crate) fn lower_block(node: &ParseNode) -> Result<Block, CompileError> {
    let statements = node
        .nodes_of(Rule::Statement)
        .map(lower_stmt)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Block { statements })
}

fn lower_stmt(node: &ParseNode) -> Result<Stmt, CompileError> {
    let inner = node
        .nodes()
        .next()
        .ok_or_else(|| missing_child(node, "statement"))?;
    match inner.rule {
        Rule::VarDeclStmt => lower_var_decl(inner),
        Rule::Assignment => lower_assignment(inner),
        Rule::IfStmt => lower_if(inner),
        Rule::ForStmt => lower_for(inner),
        Rule::ExpressionStmt => lower_expr_stmt(inner),
        Rule::ReturnStmt => lower_return(inner),
        _ => Err(unexpected_rule(inner, "a statement")),
    }
}

fn lower_var_decl(node: &ParseNode) -> Result<Stmt, CompileError> {
    let name = node
        .token_of(TokenKind::Ident)
        .ok_or_else(|| missing_child(node, "variable name"))?
        .text
        .clone();
    let type_name = node
        .node(Rule::Type)
        .and_then(|ty| ty.ident())
        .ok_or_else(|| missing_child(node, "type"))?
        .text
        .clone();
    let init = node
        .node(Rule::Expression)
        .map(lower_expression)
        .transpose()?;
    Ok(Stmt::VarDecl {
        name,
        type_name,
        is_mut: node.has_token(TokenKind::Mut),
        init,
    })
}

fn lower_assignment(node: &ParseNode) -> Result<Stmt, CompileError> {
    let target = node
        .nth_node(Rule::Expression, 0)
        .ok_or_else(|| missing_child(node, "assignment target"))?;
    let value = node
        .nth_node(Rule::Expression, 1)
        .ok_or_else(|| missing_child(node, "assignment value"))?;
    let op = node
        .tokens()
        .next()
        .and_then(|t| assign_op(t.kind))
        .ok_or_else(|| missing_child(node, "assignment operator"))?;
    Ok(Stmt::Assign {
        target: lower_expression(target)?,
        op,
        value: lower_expression(value)?,
    })
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assign => Some(AssignOp::Assign),
        TokenKind::PlusAssign => Some(AssignOp::AddAssign),
        TokenKind::MinusAssign => Some(AssignOp::SubAssign),
        _ => None,
    }
}

fn lower_if(node: &ParseNode) -> Result<Stmt, CompileError> {
    let condition = node
        .node(Rule::Expression)
        .ok_or_else(|| missing_child(node, "condition"))?;
    let then_block = node
        .nth_node(Rule::Block, 0)
        .ok_or_else(|| missing_child(node, "then block"))?;
    let else_block = node.nth_node(Rule::Block, 1);
    Ok(Stmt::If {
        condition: lower_expression(condition)?,
        then_block: lower_block(then_block)?,
        else_block: else_block.map(lower_block).transpose()?,
    })
}

fn lower_for(node: &ParseNode) -> Result<Stmt, CompileError> {
    let var = node
        .token_of(TokenKind::Ident)
        .ok_or_else(|| missing_child(node, "loop variable"))?
        .text
        .clone();
    let iterable = node
        .node(Rule::Expression)
        .ok_or_else(|| missing_child(node, "iterable"))?;
    let body = node
        .node(Rule::Block)
        .ok_or_else(|| missing_child(node, "loop body"))?;
    Ok(Stmt::ForIn {
        var,
        iterable: lower_expression(iterable)?,
        body: lower_block(body)?,
    })
}

fn lower_expr_stmt(node: &ParseNode) -> Result<Stmt, CompileError> {
    let expr = node
        .node(Rule::Expression)
        .ok_or_else(|| missing_child(node, "expression"))?;
    Ok(Stmt::Expr(lower_expression(expr)?))
}

fn lower_return(node: &ParseNode) -> Result<Stmt, CompileError> {
    let value = node
        .node(Rule::Expression)
        .map(lower_expression)
        .transpose()?;
    Ok(Stmt::Return(value))
}

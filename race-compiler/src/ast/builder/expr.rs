use super::{build_error, lower_field_value, missing_child, unexpected_rule};
use crate::ast::{BinOp, Expr, UnOp};
use crate::frontend::lexer::TokenKind;
use crate::frontend::parse_tree::{ParseNode, Rule};
use crate::{BuildErrorKind, CompileError};

/// Lower an `Expression` wrapper node.
pub(crate) fn lower_expression(node: &ParseNode) -> Result<Expr, CompileError> {
    let inner = node
        .nodes()
        .next()
        .ok_or_else(|| missing_child(node, "expression"))?;
    lower_expr_node(inner)
}

/// Dispatch over the expression productions. Pass-through layers (a
/// precedence node holding a single operand, a unary node without an
/// operator) lower straight into their child with no wrapper AST node.
fn lower_expr_node(node: &ParseNode) -> Result<Expr, CompileError> {
    match node.rule {
        Rule::Expression => lower_expression(node),
        Rule::CompareExpr | Rule::AddExpr | Rule::MulExpr => lower_binary_chain(node),
        Rule::UnaryExpr => lower_unary(node),
        Rule::PostfixExpr => lower_postfix(node),
        Rule::PrimaryExpr => lower_primary(node),
        _ => Err(unexpected_rule(node, "an expression")),
    }
}

/// Fold one precedence level left-associatively. With no operator tokens at
/// this level the single operand is returned unchanged; `Binary` nodes only
/// appear where an operator token is actually present.
fn lower_binary_chain(node: &ParseNode) -> Result<Expr, CompileError> {
    let mut operands = node.nodes();
    let first = operands
        .next()
        .ok_or_else(|| missing_child(node, "operand"))?;
    let mut expr = lower_expr_node(first)?;

    for op_token in node.tokens() {
        let op = bin_op(op_token.kind)
            .ok_or_else(|| unexpected_rule(node, "a binary operator"))?;
        let right = operands
            .next()
            .ok_or_else(|| missing_child(node, "right operand"))?;
        expr = Expr::Binary {
            left: Box::new(expr),
            op,
            right: Box::new(lower_expr_node(right)?),
        };
    }
    Ok(expr)
}

fn bin_op(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::Percent => Some(BinOp::Mod),
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::Neq => Some(BinOp::Neq),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Le => Some(BinOp::Le),
        TokenKind::Ge => Some(BinOp::Ge),
        _ => None,
    }
}

fn lower_unary(node: &ParseNode) -> Result<Expr, CompileError> {
    let operand = node
        .nodes()
        .next()
        .ok_or_else(|| missing_child(node, "operand"))?;
    match node.tokens().next() {
        Some(op_token) => {
            let op = match op_token.kind {
                TokenKind::Minus => UnOp::Neg,
                TokenKind::Bang => UnOp::Not,
                _ => return Err(unexpected_rule(node, "a unary operator")),
            };
            Ok(Expr::Unary {
                op,
                operand: Box::new(lower_expr_node(operand)?),
            })
        }
        None => lower_expr_node(operand),
    }
}

/// Fold a primary expression and its postfix suffixes left-to-right into
/// nested member-access / call nodes.
fn lower_postfix(node: &ParseNode) -> Result<Expr, CompileError> {
    let mut nodes = node.nodes();
    let primary = nodes
        .next()
        .ok_or_else(|| missing_child(node, "primary expression"))?;
    let mut expr = lower_expr_node(primary)?;

    for op in nodes {
        if !op.is(Rule::PostfixOp) {
            return Err(unexpected_rule(op, "a postfix operator"));
        }
        if let Some(member) = op.token_of(TokenKind::Ident) {
            expr = Expr::Member {
                target: Box::new(expr),
                member: member.text.clone(),
            };
        } else {
            let name = callee_path(&expr).ok_or_else(|| {
                build_error(
                    BuildErrorKind::UnsupportedCallee,
                    op,
                    "Only a plain name or member path can be called".to_string(),
                )
            })?;
            let args = match op.node(Rule::ArgList) {
                Some(list) => list
                    .nodes_of(Rule::Expression)
                    .map(lower_expression)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            expr = Expr::Call { name, args };
        }
    }
    Ok(expr)
}

/// Flatten a callee expression into a dotted path name, if it is one.
fn callee_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Member { target, member } => {
            callee_path(target).map(|path| format!("{}.{}", path, member))
        }
        _ => None,
    }
}

fn lower_primary(node: &ParseNode) -> Result<Expr, CompileError> {
    if node.has_token(TokenKind::LParen) {
        let inner = node
            .node(Rule::Expression)
            .ok_or_else(|| missing_child(node, "parenthesized expression"))?;
        return Ok(Expr::Paren(Box::new(lower_expression(inner)?)));
    }
    if let Some(literal) = node.node(Rule::Literal) {
        return lower_literal(literal);
    }
    if let Some(array) = node.node(Rule::ArrayExpr) {
        let elements = array
            .nodes_of(Rule::Expression)
            .map(lower_expression)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expr::Array(elements));
    }
    if let Some(init) = node.node(Rule::StructInit) {
        return lower_struct_init(init);
    }
    if let Some(ident) = node.token_of(TokenKind::Ident) {
        return Ok(Expr::Ident(ident.text.clone()));
    }
    Err(missing_child(node, "primary expression"))
}

/// Literal tokens are wrapped verbatim; no numeric parsing happens here.
fn lower_literal(node: &ParseNode) -> Result<Expr, CompileError> {
    let token = node
        .tokens()
        .next()
        .ok_or_else(|| missing_child(node, "literal token"))?;
    match token.kind {
        TokenKind::Number => Ok(Expr::Number(token.text.clone())),
        TokenKind::Str => Ok(Expr::Str(token.text.clone())),
        TokenKind::True => Ok(Expr::Bool(true)),
        TokenKind::False => Ok(Expr::Bool(false)),
        _ => Err(unexpected_rule(node, "a literal")),
    }
}

fn lower_struct_init(node: &ParseNode) -> Result<Expr, CompileError> {
    let type_name = node
        .ident()
        .ok_or_else(|| missing_child(node, "type name"))?
        .text
        .clone();
    let fields = node
        .nodes_of(Rule::FieldValue)
        .map(lower_field_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::StructInit { type_name, fields })
}

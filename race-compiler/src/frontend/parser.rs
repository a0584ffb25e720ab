//! Recursive-descent parser producing the concrete parse tree.

use super::lexer::{Token, TokenKind};
use super::parse_tree::{ParseNode, Rule};
use crate::{CompileError, SourceLocation};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    // `IDENT {` is a struct-init expression everywhere except directly in a
    // condition/iterable position, where the brace opens the block instead.
    allow_struct_init: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            allow_struct_init: true,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            let t = self.tokens[self.current].clone();
            self.current += 1;
            Some(t)
        } else {
            None
        }
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        for kind in kinds {
            if let Some(t) = self.match_token(*kind) {
                return Some(t);
            }
        }
        None
    }

    fn consume(&mut self, kind: TokenKind, what: &str) -> Result<Token, CompileError> {
        match self.peek() {
            Some(t) if t.kind == kind => {
                let t = t.clone();
                self.current += 1;
                Ok(t)
            }
            Some(t) => Err(CompileError::Parse {
                line: t.loc.line,
                col: t.loc.column,
                message: format!("Expected {}, found {}", what, t),
            }),
            None => Err(self.eof_error(what)),
        }
    }

    fn eof_error(&self, what: &str) -> CompileError {
        let loc = self.last_loc();
        CompileError::Parse {
            line: loc.line,
            col: loc.column,
            message: format!("Unexpected end of input, expected {}", what),
        }
    }

    fn error_here(&self, message: String) -> CompileError {
        match self.peek() {
            Some(t) => CompileError::Parse {
                line: t.loc.line,
                col: t.loc.column,
                message,
            },
            None => {
                let loc = self.last_loc();
                CompileError::Parse {
                    line: loc.line,
                    col: loc.column,
                    message: format!("Unexpected end of input: {}", message),
                }
            }
        }
    }

    fn loc(&self) -> SourceLocation {
        self.peek().map(|t| t.loc).unwrap_or_else(|| self.last_loc())
    }

    fn last_loc(&self) -> SourceLocation {
        self.tokens.last().map(|t| t.loc).unwrap_or(SourceLocation {
            line: 1,
            column: 1,
            offset: 0,
        })
    }

    fn with_struct_init<T>(
        &mut self,
        allow: bool,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let prev = self.allow_struct_init;
        self.allow_struct_init = allow;
        let result = f(self);
        self.allow_struct_init = prev;
        result
    }

    // ------------ Top level ------------

    pub fn parse_program(mut self) -> Result<ParseNode, CompileError> {
        let mut program = ParseNode::new(Rule::Program, self.loc());
        while !self.is_at_end() {
            let item = if self.check(TokenKind::Module) {
                self.parse_module()?
            } else {
                self.parse_top_level_item()?
            };
            program.push_node(item);
        }
        Ok(program)
    }

    fn parse_module(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::Module, "'module'")?;
        let mut node = ParseNode::new(Rule::Module, kw.loc);
        node.push_token(self.consume(TokenKind::Ident, "module name")?);
        self.consume(TokenKind::LBrace, "'{'")?;
        while !self.check(TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.eof_error("'}'"));
            }
            node.push_node(self.parse_top_level_item()?);
        }
        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(node)
    }

    fn parse_top_level_item(&mut self) -> Result<ParseNode, CompileError> {
        match self.peek_kind() {
            Some(TokenKind::Import) => self.parse_import(),
            Some(TokenKind::Struct) => self.parse_struct_decl(),
            Some(TokenKind::Fn) => self.parse_function_decl(),
            Some(TokenKind::Ident) if self.is_instance_head() => self.parse_instance(),
            _ => Err(self.error_here("Expected a top-level item".to_string())),
        }
    }

    fn is_instance_head(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Ident))
            && matches!(self.peek_ahead(1).map(|t| t.kind), Some(TokenKind::Ident))
            && matches!(self.peek_ahead(2).map(|t| t.kind), Some(TokenKind::LBrace))
    }

    fn parse_import(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::Import, "'import'")?;
        let mut node = ParseNode::new(Rule::ImportStmt, kw.loc);
        node.push_token(self.consume(TokenKind::Ident, "module name")?);
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(node)
    }

    fn parse_struct_decl(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::Struct, "'struct'")?;
        let mut node = ParseNode::new(Rule::StructDecl, kw.loc);
        node.push_token(self.consume(TokenKind::Ident, "struct name")?);
        self.consume(TokenKind::LBrace, "'{'")?;
        while !self.check(TokenKind::RBrace) {
            node.push_node(self.parse_field_decl()?);
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(node)
    }

    fn parse_field_decl(&mut self) -> Result<ParseNode, CompileError> {
        let name = self.consume(TokenKind::Ident, "field name")?;
        let mut node = ParseNode::new(Rule::FieldDecl, name.loc);
        node.push_token(name);
        self.consume(TokenKind::Colon, "':'")?;
        node.push_node(self.parse_type()?);
        Ok(node)
    }

    fn parse_type(&mut self) -> Result<ParseNode, CompileError> {
        let name = self.consume(TokenKind::Ident, "type name")?;
        let mut node = ParseNode::new(Rule::Type, name.loc);
        node.push_token(name);
        Ok(node)
    }

    fn parse_instance(&mut self) -> Result<ParseNode, CompileError> {
        let kind = self.consume(TokenKind::Ident, "instance kind")?;
        let mut node = ParseNode::new(Rule::Instance, kind.loc);
        node.push_token(kind);
        node.push_token(self.consume(TokenKind::Ident, "instance name")?);
        self.consume(TokenKind::LBrace, "'{'")?;
        while !self.check(TokenKind::RBrace) {
            node.push_node(self.parse_field_value()?);
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(node)
    }

    fn parse_field_value(&mut self) -> Result<ParseNode, CompileError> {
        let name = self.consume(TokenKind::Ident, "field name")?;
        let mut node = ParseNode::new(Rule::FieldValue, name.loc);
        node.push_token(name);
        self.consume(TokenKind::Colon, "':'")?;
        let value = self.with_struct_init(true, |p| p.parse_expression())?;
        node.push_node(value);
        Ok(node)
    }

    fn parse_function_decl(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::Fn, "'fn'")?;
        let mut node = ParseNode::new(Rule::FunctionDecl, kw.loc);
        node.push_token(self.consume(TokenKind::Ident, "function name")?);
        self.consume(TokenKind::LParen, "'('")?;
        if !self.check(TokenKind::RParen) {
            node.push_node(self.parse_param_list()?);
        }
        self.consume(TokenKind::RParen, "')'")?;
        if self.match_token(TokenKind::Arrow).is_some() {
            node.push_node(self.parse_type()?);
        }
        node.push_node(self.parse_block()?);
        Ok(node)
    }

    fn parse_param_list(&mut self) -> Result<ParseNode, CompileError> {
        let loc = self.loc();
        let mut node = ParseNode::new(Rule::ParamList, loc);
        loop {
            node.push_node(self.parse_param()?);
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(node)
    }

    fn parse_param(&mut self) -> Result<ParseNode, CompileError> {
        let name = self.consume(TokenKind::Ident, "parameter name")?;
        let mut node = ParseNode::new(Rule::Param, name.loc);
        node.push_token(name);
        self.consume(TokenKind::Colon, "':'")?;
        node.push_node(self.parse_type()?);
        Ok(node)
    }

    // ------------ Statements ------------

    fn parse_block(&mut self) -> Result<ParseNode, CompileError> {
        let open = self.consume(TokenKind::LBrace, "'{'")?;
        let mut node = ParseNode::new(Rule::Block, open.loc);
        while !self.check(TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.eof_error("'}'"));
            }
            node.push_node(self.parse_statement()?);
        }
        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(node)
    }

    fn parse_statement(&mut self) -> Result<ParseNode, CompileError> {
        let inner = match self.peek_kind() {
            Some(TokenKind::Let) => self.parse_var_decl()?,
            Some(TokenKind::If) => self.parse_if()?,
            Some(TokenKind::For) => self.parse_for()?,
            Some(TokenKind::Return) => self.parse_return()?,
            _ => self.parse_expr_or_assignment()?,
        };
        let mut node = ParseNode::new(Rule::Statement, inner.loc);
        node.push_node(inner);
        Ok(node)
    }

    fn parse_var_decl(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::Let, "'let'")?;
        let mut node = ParseNode::new(Rule::VarDeclStmt, kw.loc);
        if let Some(mut_tok) = self.match_token(TokenKind::Mut) {
            node.push_token(mut_tok);
        }
        node.push_token(self.consume(TokenKind::Ident, "variable name")?);
        self.consume(TokenKind::Colon, "':'")?;
        node.push_node(self.parse_type()?);
        if self.match_token(TokenKind::Assign).is_some() {
            let init = self.with_struct_init(true, |p| p.parse_expression())?;
            node.push_node(init);
        }
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(node)
    }

    fn parse_if(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::If, "'if'")?;
        let mut node = ParseNode::new(Rule::IfStmt, kw.loc);
        let condition = self.with_struct_init(false, |p| p.parse_expression())?;
        node.push_node(condition);
        node.push_node(self.parse_block()?);
        if self.match_token(TokenKind::Else).is_some() {
            node.push_node(self.parse_block()?);
        }
        Ok(node)
    }

    fn parse_for(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::For, "'for'")?;
        let mut node = ParseNode::new(Rule::ForStmt, kw.loc);
        node.push_token(self.consume(TokenKind::Ident, "loop variable")?);
        self.consume(TokenKind::In, "'in'")?;
        let iterable = self.with_struct_init(false, |p| p.parse_expression())?;
        node.push_node(iterable);
        node.push_node(self.parse_block()?);
        Ok(node)
    }

    fn parse_return(&mut self) -> Result<ParseNode, CompileError> {
        let kw = self.consume(TokenKind::Return, "'return'")?;
        let mut node = ParseNode::new(Rule::ReturnStmt, kw.loc);
        if !self.check(TokenKind::Semicolon) {
            node.push_node(self.parse_expression()?);
        }
        self.consume(TokenKind::Semicolon, "';'")?;
        Ok(node)
    }

    fn parse_expr_or_assignment(&mut self) -> Result<ParseNode, CompileError> {
        let expr = self.parse_expression()?;
        if let Some(op) = self.match_any(&[
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
        ]) {
            let mut node = ParseNode::new(Rule::Assignment, expr.loc);
            node.push_node(expr);
            node.push_token(op);
            node.push_node(self.parse_expression()?);
            self.consume(TokenKind::Semicolon, "';'")?;
            Ok(node)
        } else {
            let mut node = ParseNode::new(Rule::ExpressionStmt, expr.loc);
            node.push_node(expr);
            self.consume(TokenKind::Semicolon, "';'")?;
            Ok(node)
        }
    }

    // ------------ Expressions ------------
    //
    // Each precedence level builds its own production node even when it holds
    // a single operand; the builder collapses those pass-through layers.

    fn parse_expression(&mut self) -> Result<ParseNode, CompileError> {
        let inner = self.parse_compare()?;
        let mut node = ParseNode::new(Rule::Expression, inner.loc);
        node.push_node(inner);
        Ok(node)
    }

    fn parse_compare(&mut self) -> Result<ParseNode, CompileError> {
        let first = self.parse_add()?;
        let mut node = ParseNode::new(Rule::CompareExpr, first.loc);
        node.push_node(first);
        while let Some(op) = self.match_any(&[
            TokenKind::EqEq,
            TokenKind::Neq,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Lt,
            TokenKind::Gt,
        ]) {
            node.push_token(op);
            node.push_node(self.parse_add()?);
        }
        Ok(node)
    }

    fn parse_add(&mut self) -> Result<ParseNode, CompileError> {
        let first = self.parse_mul()?;
        let mut node = ParseNode::new(Rule::AddExpr, first.loc);
        node.push_node(first);
        while let Some(op) = self.match_any(&[TokenKind::Plus, TokenKind::Minus]) {
            node.push_token(op);
            node.push_node(self.parse_mul()?);
        }
        Ok(node)
    }

    fn parse_mul(&mut self) -> Result<ParseNode, CompileError> {
        let first = self.parse_unary()?;
        let mut node = ParseNode::new(Rule::MulExpr, first.loc);
        node.push_node(first);
        while let Some(op) =
            self.match_any(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent])
        {
            node.push_token(op);
            node.push_node(self.parse_unary()?);
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<ParseNode, CompileError> {
        if let Some(op) = self.match_any(&[TokenKind::Minus, TokenKind::Bang]) {
            let mut node = ParseNode::new(Rule::UnaryExpr, op.loc);
            node.push_token(op);
            node.push_node(self.parse_unary()?);
            Ok(node)
        } else {
            let inner = self.parse_postfix()?;
            let mut node = ParseNode::new(Rule::UnaryExpr, inner.loc);
            node.push_node(inner);
            Ok(node)
        }
    }

    fn parse_postfix(&mut self) -> Result<ParseNode, CompileError> {
        let primary = self.parse_primary()?;
        let mut node = ParseNode::new(Rule::PostfixExpr, primary.loc);
        node.push_node(primary);
        loop {
            if let Some(dot) = self.match_token(TokenKind::Dot) {
                let mut op = ParseNode::new(Rule::PostfixOp, dot.loc);
                op.push_token(dot);
                op.push_token(self.consume(TokenKind::Ident, "member name")?);
                node.push_node(op);
            } else if let Some(open) = self.match_token(TokenKind::LParen) {
                let mut op = ParseNode::new(Rule::PostfixOp, open.loc);
                op.push_token(open);
                if !self.check(TokenKind::RParen) {
                    op.push_node(self.parse_arg_list()?);
                }
                self.consume(TokenKind::RParen, "')'")?;
                node.push_node(op);
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_arg_list(&mut self) -> Result<ParseNode, CompileError> {
        let loc = self.loc();
        let mut node = ParseNode::new(Rule::ArgList, loc);
        loop {
            let arg = self.with_struct_init(true, |p| p.parse_expression())?;
            node.push_node(arg);
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<ParseNode, CompileError> {
        let loc = self.loc();
        let mut node = ParseNode::new(Rule::PrimaryExpr, loc);
        match self.peek_kind() {
            Some(
                TokenKind::Number | TokenKind::Str | TokenKind::True | TokenKind::False,
            ) => {
                node.push_node(self.parse_literal()?);
            }
            Some(TokenKind::LBracket) => {
                node.push_node(self.parse_array_expr()?);
            }
            Some(TokenKind::LParen) => {
                let open = self.consume(TokenKind::LParen, "'('")?;
                node.push_token(open);
                let inner = self.with_struct_init(true, |p| p.parse_expression())?;
                node.push_node(inner);
                self.consume(TokenKind::RParen, "')'")?;
            }
            Some(TokenKind::Ident) => {
                if self.allow_struct_init
                    && matches!(self.peek_ahead(1).map(|t| t.kind), Some(TokenKind::LBrace))
                {
                    node.push_node(self.parse_struct_init()?);
                } else {
                    node.push_token(self.consume(TokenKind::Ident, "identifier")?);
                }
            }
            _ => return Err(self.error_here("Expected an expression".to_string())),
        }
        Ok(node)
    }

    fn parse_literal(&mut self) -> Result<ParseNode, CompileError> {
        let token = self
            .match_any(&[
                TokenKind::Number,
                TokenKind::Str,
                TokenKind::True,
                TokenKind::False,
            ])
            .ok_or_else(|| self.error_here("Expected a literal".to_string()))?;
        let mut node = ParseNode::new(Rule::Literal, token.loc);
        node.push_token(token);
        Ok(node)
    }

    fn parse_array_expr(&mut self) -> Result<ParseNode, CompileError> {
        let open = self.consume(TokenKind::LBracket, "'['")?;
        let mut node = ParseNode::new(Rule::ArrayExpr, open.loc);
        if !self.check(TokenKind::RBracket) {
            loop {
                let element = self.with_struct_init(true, |p| p.parse_expression())?;
                node.push_node(element);
                if self.match_token(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.consume(TokenKind::RBracket, "']'")?;
        Ok(node)
    }

    fn parse_struct_init(&mut self) -> Result<ParseNode, CompileError> {
        let name = self.consume(TokenKind::Ident, "type name")?;
        let mut node = ParseNode::new(Rule::StructInit, name.loc);
        node.push_token(name);
        self.consume(TokenKind::LBrace, "'{'")?;
        while !self.check(TokenKind::RBrace) {
            node.push_node(self.parse_field_value()?);
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.consume(TokenKind::RBrace, "'}'")?;
        Ok(node)
    }
}

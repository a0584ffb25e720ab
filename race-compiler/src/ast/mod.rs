//! AST node model.
//!
//! Closed sum types over every construct the language has; traversals match
//! exhaustively. Nodes are immutable after the builder produces them.

pub mod builder;
pub mod printer;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Module(Module),
    Import(Import),
    Struct(StructDecl),
    Fn(FnDecl),
    Instance(InstanceDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub module: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
}

/// Domain kinds an instance literal can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Engine,
    Car,
    Track,
    Race,
}

impl InstanceKind {
    /// The fixed keyword-to-kind dispatch table.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "engine" => Some(InstanceKind::Engine),
            "car" => Some(InstanceKind::Car),
            "track" => Some(InstanceKind::Track),
            "race" => Some(InstanceKind::Race),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceKind::Engine => "engine",
            InstanceKind::Car => "car",
            InstanceKind::Track => "track",
            InstanceKind::Race => "race",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDecl {
    pub kind: InstanceKind,
    pub name: String,
    pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        name: String,
        type_name: String,
        is_mut: bool,
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    /// Classic three-part loop; no surface production targets it yet.
    For {
        init: Box<Stmt>,
        condition: Expr,
        update: Box<Stmt>,
        body: Block,
    },
    ForIn {
        var: String,
        iterable: Expr,
        body: Block,
    },
    Expr(Expr),
    Return(Option<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal, raw source text (a unit suffix stays attached).
    Number(String),
    /// String literal, without the surrounding quotes.
    Str(String),
    Bool(bool),
    Ident(String),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Member {
        target: Box<Expr>,
        member: String,
    },
    /// Call by flattened path name: `a.b(x)` carries the name `a.b`.
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Paren(Box<Expr>),
    StructInit {
        type_name: String,
        fields: Vec<FieldValue>,
    },
}

//! Read-only diagnostic tree dump of the AST, exposed behind the CLI's
//! `--ast` flag.

use super::{Block, Expr, FieldValue, Item, Program, Stmt};

pub fn print(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("Program\n");
    for item in &program.items {
        write_item(&mut out, item, 1);
    }
    out
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_item(out: &mut String, item: &Item, indent: usize) {
    pad(out, indent);
    match item {
        Item::Module(module) => {
            out.push_str(&format!("Module: {}\n", module.name));
            for item in &module.items {
                write_item(out, item, indent + 1);
            }
        }
        Item::Import(import) => {
            out.push_str(&format!("Import: {}\n", import.module));
        }
        Item::Struct(decl) => {
            out.push_str(&format!("StructDecl: {}\n", decl.name));
            for field in &decl.fields {
                pad(out, indent + 1);
                out.push_str(&format!("FieldDecl: {} {}\n", field.type_name, field.name));
            }
        }
        Item::Fn(decl) => {
            match &decl.return_type {
                Some(ty) => out.push_str(&format!("FnDecl: {} -> {}\n", decl.name, ty)),
                None => out.push_str(&format!("FnDecl: {}\n", decl.name)),
            }
            for param in &decl.params {
                pad(out, indent + 1);
                out.push_str(&format!("Param: {} {}\n", param.type_name, param.name));
            }
            for stmt in &decl.body {
                write_stmt(out, stmt, indent + 1);
            }
        }
        Item::Instance(decl) => {
            out.push_str(&format!("Instance({}): {}\n", decl.kind.as_str(), decl.name));
            for field in &decl.fields {
                write_field_value(out, field, indent + 1);
            }
        }
    }
}

fn write_field_value(out: &mut String, field: &FieldValue, indent: usize) {
    pad(out, indent);
    out.push_str(&format!("FieldValue: {}\n", field.name));
    write_expr(out, &field.value, indent + 1);
}

fn write_block(out: &mut String, block: &Block, indent: usize) {
    for stmt in &block.statements {
        write_stmt(out, stmt, indent);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    pad(out, indent);
    match stmt {
        Stmt::VarDecl {
            name,
            type_name,
            is_mut,
            init,
        } => {
            let mutability = if *is_mut { " (mut)" } else { "" };
            out.push_str(&format!("VarDecl: {} {}{}\n", type_name, name, mutability));
            if let Some(init) = init {
                write_expr(out, init, indent + 1);
            }
        }
        Stmt::Assign { target, op, value } => {
            out.push_str(&format!("Assign: {}\n", op.as_str()));
            write_expr(out, target, indent + 1);
            write_expr(out, value, indent + 1);
        }
        Stmt::If {
            condition,
            then_block,
            else_block,
        } => {
            out.push_str("If\n");
            pad(out, indent + 1);
            out.push_str("Condition:\n");
            write_expr(out, condition, indent + 2);
            pad(out, indent + 1);
            out.push_str("Then:\n");
            write_block(out, then_block, indent + 2);
            if let Some(else_block) = else_block {
                pad(out, indent + 1);
                out.push_str("Else:\n");
                write_block(out, else_block, indent + 2);
            }
        }
        Stmt::For {
            init,
            condition,
            update,
            body,
        } => {
            out.push_str("For\n");
            write_stmt(out, init, indent + 1);
            write_expr(out, condition, indent + 1);
            write_stmt(out, update, indent + 1);
            write_block(out, body, indent + 1);
        }
        Stmt::ForIn {
            var,
            iterable,
            body,
        } => {
            out.push_str(&format!("ForIn: {}\n", var));
            write_expr(out, iterable, indent + 1);
            write_block(out, body, indent + 1);
        }
        Stmt::Expr(expr) => {
            out.push_str("ExprStmt\n");
            write_expr(out, expr, indent + 1);
        }
        Stmt::Return(value) => {
            out.push_str("Return\n");
            if let Some(value) = value {
                write_expr(out, value, indent + 1);
            }
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr, indent: usize) {
    pad(out, indent);
    match expr {
        Expr::Number(value) => out.push_str(&format!("Number: {}\n", value)),
        Expr::Str(value) => out.push_str(&format!("Str: \"{}\"\n", value)),
        Expr::Bool(value) => out.push_str(&format!("Bool: {}\n", value)),
        Expr::Ident(name) => out.push_str(&format!("Ident: {}\n", name)),
        Expr::Unary { op, operand } => {
            out.push_str(&format!("Unary: {}\n", op.as_str()));
            write_expr(out, operand, indent + 1);
        }
        Expr::Binary { left, op, right } => {
            out.push_str(&format!("Binary: {}\n", op.as_str()));
            write_expr(out, left, indent + 1);
            write_expr(out, right, indent + 1);
        }
        Expr::Member { target, member } => {
            out.push_str(&format!("Member: {}\n", member));
            write_expr(out, target, indent + 1);
        }
        Expr::Call { name, args } => {
            out.push_str(&format!("Call: {}\n", name));
            for arg in args {
                write_expr(out, arg, indent + 1);
            }
        }
        Expr::Array(elements) => {
            out.push_str("Array\n");
            for element in elements {
                write_expr(out, element, indent + 1);
            }
        }
        Expr::Paren(inner) => {
            out.push_str("Paren\n");
            write_expr(out, inner, indent + 1);
        }
        Expr::StructInit { type_name, fields } => {
            out.push_str(&format!("StructInit: {}\n", type_name));
            for field in fields {
                write_field_value(out, field, indent + 1);
            }
        }
    }
}

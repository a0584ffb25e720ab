use super::types::map_type;
use crate::ast::{Expr, FieldValue, FnDecl, InstanceDecl, Item, Program, Stmt, StructDecl};
use crate::CompileError;

/// Call name given special, hard-coded emission behavior.
const PRINTLN: &str = "println";

/// Mutable state threaded through one emission pass: declared struct names,
/// the most recently emitted struct, and which includes the output needs.
#[derive(Debug, Default)]
pub struct EmitCtx {
    /// Struct names in declaration order.
    pub structs: Vec<String>,
    /// Name of the most recently emitted struct.
    pub last_struct: Option<String>,
    pub needs_stdio: bool,
    pub needs_stdbool: bool,
}

impl EmitCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_struct(&self, name: &str) -> bool {
        self.structs.iter().any(|s| s == name)
    }

    pub fn declare_struct(&mut self, name: &str) {
        self.structs.push(name.to_string());
        self.last_struct = Some(name.to_string());
    }

    /// C type name for an instance of the given kind: a declared struct
    /// matching the kind word case-insensitively, otherwise the most
    /// recently emitted struct.
    pub fn resolve_instance_type(&self, kind: &str) -> Option<&str> {
        self.structs
            .iter()
            .find(|s| s.eq_ignore_ascii_case(kind))
            .map(|s| s.as_str())
            .or(self.last_struct.as_deref())
    }
}

/// Codegen orchestrates the emission of C source from an AST.
pub struct Codegen {
    out: String,
    indent: usize,
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn empty(&mut self) {
        self.out.push('\n');
    }

    fn push(&mut self) {
        self.indent += 1;
    }

    fn pop(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Prepend the includes the walk requested and return the final text.
    pub fn finish(self, ctx: &EmitCtx) -> String {
        let mut header = String::new();
        if ctx.needs_stdio {
            header.push_str("#include <stdio.h>\n");
        }
        if ctx.needs_stdbool {
            header.push_str("#include <stdbool.h>\n");
        }
        if header.is_empty() {
            self.out
        } else {
            format!("{}\n{}", header, self.out)
        }
    }

    pub fn emit_program(
        &mut self,
        ctx: &mut EmitCtx,
        program: &Program,
    ) -> Result<(), CompileError> {
        for item in &program.items {
            self.emit_item(ctx, item)?;
        }
        Ok(())
    }

    fn emit_item(&mut self, ctx: &mut EmitCtx, item: &Item) -> Result<(), CompileError> {
        match item {
            Item::Module(module) => {
                self.line(&format!("// module: {}", module.name));
                self.empty();
                for item in &module.items {
                    self.emit_item(ctx, item)?;
                }
                Ok(())
            }
            Item::Import(import) => {
                self.line(&format!("// import: {}", import.module));
                self.empty();
                Ok(())
            }
            Item::Struct(decl) => self.emit_struct_decl(ctx, decl),
            Item::Fn(decl) => self.emit_fn_decl(ctx, decl),
            Item::Instance(decl) => self.emit_instance(ctx, decl),
        }
    }

    /// Emit `typedef struct { ... } Name;` with the fields in AST order, and
    /// record the name so later instances can reference it.
    fn emit_struct_decl(
        &mut self,
        ctx: &mut EmitCtx,
        decl: &StructDecl,
    ) -> Result<(), CompileError> {
        self.line("typedef struct {");
        self.push();
        for field in &decl.fields {
            let ty = map_type(ctx, &field.type_name)?;
            self.line(&format!("{} {};", ty, field.name));
        }
        self.pop();
        self.line(&format!("}} {};", decl.name));
        self.empty();
        ctx.declare_struct(&decl.name);
        Ok(())
    }

    /// Emit a designated-initializer definition for an instance. Every field
    /// but the last is followed by a comma; the last is not.
    fn emit_instance(
        &mut self,
        ctx: &mut EmitCtx,
        decl: &InstanceDecl,
    ) -> Result<(), CompileError> {
        let type_name = ctx
            .resolve_instance_type(decl.kind.as_str())
            .ok_or_else(|| CompileError::TypeMapping {
                type_name: decl.kind.as_str().to_string(),
            })?
            .to_string();

        self.line(&format!("{} {} = {{", type_name, decl.name));
        self.push();
        let last = decl.fields.len().saturating_sub(1);
        for (index, field) in decl.fields.iter().enumerate() {
            let value = gen_expr(ctx, &field.value)?;
            if index < last {
                self.line(&format!(".{} = {},", field.name, value));
            } else {
                self.line(&format!(".{} = {}", field.name, value));
            }
        }
        self.pop();
        self.line("};");
        self.empty();
        Ok(())
    }

    fn emit_fn_decl(&mut self, ctx: &mut EmitCtx, decl: &FnDecl) -> Result<(), CompileError> {
        let ret = match &decl.return_type {
            Some(ty) => map_type(ctx, ty)?,
            None => "void".to_string(),
        };
        let mut params = Vec::new();
        for param in &decl.params {
            let ty = map_type(ctx, &param.type_name)?;
            params.push(format!("{} {}", ty, param.name));
        }

        self.line(&format!("{} {}({}) {{", ret, decl.name, params.join(", ")));
        self.push();
        for stmt in &decl.body {
            self.emit_stmt(ctx, stmt)?;
        }
        self.pop();
        self.line("}");
        self.empty();
        Ok(())
    }

    fn emit_stmt(&mut self, ctx: &mut EmitCtx, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::VarDecl {
                name,
                type_name,
                init,
                ..
            } => {
                let ty = map_type(ctx, type_name)?;
                match init {
                    Some(init) => {
                        let value = gen_expr(ctx, init)?;
                        self.line(&format!("{} {} = {};", ty, name, value));
                    }
                    None => self.line(&format!("{} {};", ty, name)),
                }
                Ok(())
            }
            Stmt::Expr(expr) => {
                let text = gen_expr(ctx, expr)?;
                self.line(&format!("{};", text));
                Ok(())
            }
            Stmt::Assign { .. } => Err(CompileError::UnsupportedLowering {
                construct: "assignment",
            }),
            Stmt::If { .. } => Err(CompileError::UnsupportedLowering {
                construct: "if statement",
            }),
            Stmt::For { .. } => Err(CompileError::UnsupportedLowering {
                construct: "for loop",
            }),
            Stmt::ForIn { .. } => Err(CompileError::UnsupportedLowering {
                construct: "for-in loop",
            }),
            Stmt::Return(_) => Err(CompileError::UnsupportedLowering {
                construct: "return statement",
            }),
        }
    }
}

// ------------ Expression emission ------------

pub(crate) fn gen_expr(ctx: &mut EmitCtx, expr: &Expr) -> Result<String, CompileError> {
    match expr {
        Expr::Number(raw) => Ok(strip_unit_suffix(raw).to_string()),
        Expr::Str(text) => Ok(format!("\"{}\"", text)),
        Expr::Bool(value) => {
            ctx.needs_stdbool = true;
            Ok(if *value { "true" } else { "false" }.to_string())
        }
        Expr::Ident(name) => Ok(name.clone()),
        Expr::Unary { op, operand } => Ok(format!("{}{}", op.as_str(), gen_expr(ctx, operand)?)),
        Expr::Binary { left, op, right } => Ok(format!(
            "{} {} {}",
            gen_expr(ctx, left)?,
            op.as_str(),
            gen_expr(ctx, right)?
        )),
        Expr::Member { target, member } => {
            Ok(format!("{}.{}", gen_expr(ctx, target)?, member))
        }
        Expr::Call { name, args } => gen_call(ctx, name, args),
        Expr::Array(elements) => {
            let mut parts = Vec::new();
            for element in elements {
                parts.push(gen_expr(ctx, element)?);
            }
            Ok(format!("{{{}}}", parts.join(", ")))
        }
        Expr::Paren(inner) => Ok(format!("({})", gen_expr(ctx, inner)?)),
        Expr::StructInit { fields, .. } => gen_struct_init(ctx, fields),
    }
}

fn gen_struct_init(ctx: &mut EmitCtx, fields: &[FieldValue]) -> Result<String, CompileError> {
    let mut parts = Vec::new();
    for field in fields {
        parts.push(format!(".{} = {}", field.name, gen_expr(ctx, &field.value)?));
    }
    Ok(format!("{{ {} }}", parts.join(", ")))
}

fn gen_call(ctx: &mut EmitCtx, name: &str, args: &[Expr]) -> Result<String, CompileError> {
    if name == PRINTLN {
        return gen_println(ctx, args);
    }
    let mut parts = Vec::new();
    for arg in args {
        parts.push(gen_expr(ctx, arg)?);
    }
    Ok(format!("{}({})", name, parts.join(", ")))
}

/// Lower `println(template, args...)` to a `printf` call: the template must
/// be a string literal, and each further argument appends one inferred
/// format specifier to it.
fn gen_println(ctx: &mut EmitCtx, args: &[Expr]) -> Result<String, CompileError> {
    let Some(first) = args.first() else {
        return Err(CompileError::IntrinsicArity {
            name: PRINTLN.to_string(),
        });
    };
    let Expr::Str(template) = first else {
        return Err(CompileError::UnsupportedLowering {
            construct: "println with a non-literal template",
        });
    };

    ctx.needs_stdio = true;

    let mut format = template.clone();
    for arg in &args[1..] {
        format.push_str(format_spec_for(arg));
    }
    format.push_str("\\n");

    let mut rest = String::new();
    for arg in &args[1..] {
        rest.push_str(", ");
        rest.push_str(&gen_expr(ctx, arg)?);
    }

    Ok(format!("printf(\"{}\"{})", format, rest))
}

/// Format-specifier inference. Single-case rule for now: every argument
/// formats as an integer.
fn format_spec_for(_arg: &Expr) -> &'static str {
    "%d"
}

/// Drop a trailing unit abbreviation (`450Nm` -> `450`) from a numeric
/// literal's raw text.
fn strip_unit_suffix(raw: &str) -> &str {
    raw.trim_end_matches(|c: char| c.is_ascii_alphabetic())
}

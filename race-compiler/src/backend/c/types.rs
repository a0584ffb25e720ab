use super::codegen::EmitCtx;
use crate::CompileError;

/// Map a RaceLang type name to its C rendering.
///
/// The built-in vocabulary is fixed; a name matching an already-declared
/// struct maps to itself. Anything else is a `TypeMapping` error, never
/// fallback text.
pub fn map_type(ctx: &mut EmitCtx, type_name: &str) -> Result<String, CompileError> {
    match type_name {
        "i32" => Ok("int".to_string()),
        "f32" => Ok("float".to_string()),
        "string" => Ok("char *".to_string()),
        "bool" => {
            ctx.needs_stdbool = true;
            Ok("bool".to_string())
        }
        other if ctx.has_struct(other) => Ok(other.to_string()),
        other => Err(CompileError::TypeMapping {
            type_name: other.to_string(),
        }),
    }
}

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while lowering an AST to bytecode.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// An identifier was read that names neither a variable nor a function.
    #[error("{line}:{col}: undefined name '{name}'")]
    UndefinedName {
        name: SmolStr,
        line: usize,
        col: usize,
    },
}

impl CompileError {
    pub fn undefined_name(name: &SmolStr, line: usize, col: usize) -> Self {
        CompileError::UndefinedName {
            name: name.clone(),
            line,
            col,
        }
    }
}

use thiserror::Error;

/// The closed set of run-time failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    #[error("division by zero")]
    DivisionByZero,

    #[error("stack underflow")]
    StackUnderflow,

    /// An instruction the machine cannot execute: out-of-range constant,
    /// variable or jump index, a malformed pooled number, or operands the
    /// instruction is not defined for.
    #[error("bad instruction")]
    BadInstruction,

    #[error("execution limit exceeded")]
    ExecutionLimitExceeded,
}

/// A run-time failure, positioned at the program counter that raised it.
#[derive(Debug, Clone, Error)]
#[error("runtime error at pc {pc}: {message}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub pc: usize,
}

impl RuntimeError {
    pub fn division_by_zero(pc: usize) -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::DivisionByZero,
            message: "division by zero".to_string(),
            pc,
        }
    }

    pub fn stack_underflow(pc: usize) -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::StackUnderflow,
            message: "pop from empty stack".to_string(),
            pc,
        }
    }

    pub fn bad_instruction(pc: usize, message: impl Into<String>) -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::BadInstruction,
            message: message.into(),
            pc,
        }
    }

    pub fn limit_exceeded(pc: usize, max_steps: usize) -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::ExecutionLimitExceeded,
            message: format!("execution step limit exceeded ({})", max_steps),
            pc,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Bytecode instructions. Each carries at most one operand.
///
/// Jump operands are absolute instruction indices; the compiler guarantees
/// they land inside the instruction list, and the machine checks anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Push `constants[idx]`.
    LoadConst(usize),

    /// Push `variables[idx]`.
    LoadVar(usize),

    /// Pop a value, write it to `variables[idx]`, push it back. The value
    /// stays on the stack so assignment works as an expression; statement
    /// wrappers emit an explicit `Pop`.
    StoreVar(usize),

    /// Discard the top of stack.
    Pop,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Negate,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Logic. Both operands are already on the stack; there is no
    // short-circuit at run time.
    And,
    Or,
    Not,

    /// Unconditional jump to an absolute instruction index.
    Jump(usize),

    /// Pop; jump if the value is falsy.
    JumpIfFalse(usize),

    /// Pop; jump if the value is truthy.
    JumpIfTrue(usize),

    /// Invoke the function reference on top of the stack with `n` arguments
    /// below it.
    Call(usize),

    /// Return from the current frame.
    Return,

    /// Pop `n` values, join their textual forms with single spaces, append
    /// one output line.
    Print(usize),

    /// Read one line from the input provider and push it as a string.
    Input,

    /// Stop execution. Always the final instruction of a compiled program.
    Halt,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::LoadConst(idx) => write!(f, "LOAD_CONST {}", idx),
            Op::LoadVar(idx) => write!(f, "LOAD_VAR {}", idx),
            Op::StoreVar(idx) => write!(f, "STORE_VAR {}", idx),
            Op::Pop => write!(f, "POP"),
            Op::Add => write!(f, "ADD"),
            Op::Subtract => write!(f, "SUBTRACT"),
            Op::Multiply => write!(f, "MULTIPLY"),
            Op::Divide => write!(f, "DIVIDE"),
            Op::Modulo => write!(f, "MODULO"),
            Op::Negate => write!(f, "NEGATE"),
            Op::Equal => write!(f, "EQUAL"),
            Op::NotEqual => write!(f, "NOT_EQUAL"),
            Op::LessThan => write!(f, "LESS_THAN"),
            Op::GreaterThan => write!(f, "GREATER_THAN"),
            Op::LessEqual => write!(f, "LESS_EQUAL"),
            Op::GreaterEqual => write!(f, "GREATER_EQUAL"),
            Op::And => write!(f, "AND"),
            Op::Or => write!(f, "OR"),
            Op::Not => write!(f, "NOT"),
            Op::Jump(target) => write!(f, "JUMP {}", target),
            Op::JumpIfFalse(target) => write!(f, "JUMP_IF_FALSE {}", target),
            Op::JumpIfTrue(target) => write!(f, "JUMP_IF_TRUE {}", target),
            Op::Call(argc) => write!(f, "CALL {}", argc),
            Op::Return => write!(f, "RETURN"),
            Op::Print(argc) => write!(f, "PRINT {}", argc),
            Op::Input => write!(f, "INPUT"),
            Op::Halt => write!(f, "HALT"),
        }
    }
}

//! Bytecode: instruction set, compiled program container, compiler and
//! disassembler.

pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod op;
pub mod program;

pub use compile::Compiler;
pub use compile_error::CompileError;
pub use op::Op;
pub use program::{BytecodeProgram, Constant};

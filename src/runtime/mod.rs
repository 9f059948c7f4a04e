//! Bytecode execution: the virtual machine, its error type and input
//! providers.

pub mod input;
pub mod runtime_error;
pub mod vm;

pub use input::{BufferedInput, InputProvider, StdinInput};
pub use runtime_error::{RuntimeError, RuntimeErrorKind};
pub use vm::{Execution, Vm, VmConfig};

//! Human-readable bytecode listings.

use crate::bytecode::program::BytecodeProgram;

/// Render a compiled program as a listing with its constant pool, variable
/// table, function table and numbered instructions.
pub fn listing(program: &BytecodeProgram) -> String {
    let mut out = String::new();

    out.push_str("=== CONSTANTS ===\n");
    for (idx, constant) in program.constants.iter().enumerate() {
        out.push_str(&format!("{}: {}\n", idx, constant));
    }

    out.push_str("\n=== VARIABLES ===\n");
    for (idx, name) in program.variable_names.iter().enumerate() {
        out.push_str(&format!("{}: {}\n", idx, name));
    }

    out.push_str("\n=== FUNCTIONS ===\n");
    for (name, address) in &program.functions {
        out.push_str(&format!("{}: {}\n", name, address));
    }

    out.push_str("\n=== BYTECODE ===\n");
    for (idx, op) in program.instructions.iter().enumerate() {
        out.push_str(&format!("{:3}: {}\n", idx, op));
    }

    out
}

/// Print a listing to stdout.
pub fn print_bc(program: &BytecodeProgram) {
    print!("{}", listing(program));
}

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::bytecode::op::Op;

/// A value in the constant pool.
///
/// Numeric literals keep their source lexeme: conversion to a 64-bit float
/// happens when the constant is loaded, which is where a malformed lexeme
/// like `1.2.3` finally fails. Function references are poolable so that an
/// identifier naming a function can be loaded like any other constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Number(SmolStr),
    Str(String),
    Bool(bool),
    Null,
    Function { address: usize, arity: usize },
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Number(text) => write!(f, "{}", text),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Null => write!(f, "null"),
            Constant::Function { address, arity } => {
                write!(f, "<function @{}/{}>", address, arity)
            }
        }
    }
}

/// A compiled program: flat instruction list plus the constant pool.
///
/// The variable and function name tables are carried along for listings and
/// diagnostics; execution itself only needs indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BytecodeProgram {
    pub instructions: Vec<Op>,
    pub constants: Vec<Constant>,
    /// Names by variable index, in allocation order.
    pub variable_names: Vec<SmolStr>,
    /// Declared functions as `(name, entry address)`, in declaration order.
    pub functions: Vec<(SmolStr, usize)>,
}

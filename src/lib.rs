//! An interpreter for a small imperative language whose keywords are
//! pluggable per natural language: the same program shape can be written
//! with English keywords (`if`, `while`, `function`, ...) or with
//! transliterated Tamil, Malayalam, Telugu, Hindi or Sanskrit ones.
//!
//! The pipeline is strictly one-way:
//!
//! ```text
//! (source, language) -> tokens -> AST -> bytecode -> output lines
//! ```
//!
//! Each stage fails independently: lexing never aborts (unclassifiable
//! lexemes surface as unknown tokens and are rejected by the parser),
//! parsing and compilation produce a [`Diagnostic`], execution produces a
//! [`RuntimeError`].
//!
//! ```
//! let program = bhasha::compile("var x = 10; print(x + 1);", "en").unwrap();
//! let mut input = bhasha::BufferedInput::empty();
//! let result = bhasha::run(&program, &mut input).unwrap();
//! assert_eq!(result.output_lines, vec!["11"]);
//! ```

pub mod ast;
pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod runtime;
pub mod translate;

use thiserror::Error;

pub use bytecode::{BytecodeProgram, CompileError, Constant, Op};
pub use frontend::{ParseError, Token, TokenKind};
pub use lang::{LanguageEntry, Value};
pub use runtime::{
    BufferedInput, Execution, InputProvider, RuntimeError, RuntimeErrorKind, StdinInput, Vm,
    VmConfig,
};

use bytecode::Compiler;
use frontend::{Lexer, Parser};

/// What went wrong before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// The offending token was one the scanner could not classify.
    #[error("lexical error")]
    LexicalError,

    #[error("syntax error")]
    SyntaxError,

    /// An identifier names neither a variable nor a function.
    #[error("undefined name")]
    UndefinedName,

    /// The requested language code is not in the catalog.
    #[error("unknown language")]
    UnknownLanguage,
}

/// A compile-stage failure with its source position.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message} at {line}:{column}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic {
            kind: if err.lexical {
                DiagnosticKind::LexicalError
            } else {
                DiagnosticKind::SyntaxError
            },
            message: err.message,
            line: err.line,
            column: err.col,
        }
    }
}

impl From<CompileError> for Diagnostic {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::UndefinedName { name, line, col } => Diagnostic {
                kind: DiagnosticKind::UndefinedName,
                message: format!("undefined name '{}'", name),
                line,
                column: col,
            },
        }
    }
}

/// Compile a source program written with the keywords of `lang_code`.
pub fn compile(source: &str, lang_code: &str) -> Result<BytecodeProgram, Diagnostic> {
    let entry = lang::lookup(lang_code).ok_or_else(|| Diagnostic {
        kind: DiagnosticKind::UnknownLanguage,
        message: format!("unknown language code '{}'", lang_code),
        line: 0,
        column: 0,
    })?;

    let tokens = Lexer::new(source, entry).tokenize();
    let program = Parser::new(tokens).parse()?;
    Ok(Compiler::new(entry).compile(&program)?)
}

/// Execute a compiled program with unbounded steps.
pub fn run(
    program: &BytecodeProgram,
    io: &mut dyn InputProvider,
) -> Result<Execution, RuntimeError> {
    Vm::new().run(program, io)
}

/// Execute a compiled program under the given limits.
pub fn run_with_config(
    program: &BytecodeProgram,
    io: &mut dyn InputProvider,
    config: VmConfig,
) -> Result<Execution, RuntimeError> {
    Vm::with_config(config).run(program, io)
}

/// All supported language entries, in catalog order.
pub fn list_languages() -> &'static [LanguageEntry] {
    lang::list_all()
}

/// Canonical demo program, in English keywords. [`example_for`] translates
/// it per language.
const DEMO_PROGRAM: &str = "\
function greet(name) {
    print(\"hello, \" + name);
}
greet(\"world\");

var n = 5;
var total = 1;
while (n > 1) {
    total = total * n;
    n = n - 1;
}
print(\"5! =\", total);
";

/// A demo program spelled with the keywords of `lang_code`.
pub fn example_for(lang_code: &str) -> Option<String> {
    let to = lang::lookup(lang_code)?;
    let from = lang::lookup("en")?;
    Some(translate::translate_with(DEMO_PROGRAM, from, to))
}

/// Re-spell a program's keywords from one language into another.
pub fn translate(source: &str, from_code: &str, to_code: &str) -> Option<String> {
    let from = lang::lookup(from_code)?;
    let to = lang::lookup(to_code)?;
    Some(translate::translate_with(source, from, to))
}

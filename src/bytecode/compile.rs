use std::collections::HashMap;

use log::debug;
use smol_str::SmolStr;

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, UnaryOp};
use crate::bytecode::compile_error::CompileError;
use crate::bytecode::op::Op;
use crate::bytecode::program::{BytecodeProgram, Constant};
use crate::lang::{Builtin, LanguageEntry};

struct FunctionInfo {
    address: usize,
    arity: usize,
}

/// Lowers an AST to a flat instruction list plus a constant pool.
///
/// Variables live in a single flat index space keyed by name: inner scopes
/// alias outer ones, and re-declaring a name reuses its slot. Jumps are
/// emitted with placeholder targets and patched once the destination is
/// known. Function bodies are laid out inline, each behind a forward jump
/// so straight-line execution never falls into them.
///
/// The compiler holds the language entry the source was lexed with: a call
/// to whatever that entry spells `print` or `input` compiles to the builtin
/// instruction rather than a function call.
pub struct Compiler<'a> {
    entry: &'a LanguageEntry,
    instructions: Vec<Op>,
    constants: Vec<Constant>,
    variables: HashMap<SmolStr, usize>,
    variable_names: Vec<SmolStr>,
    functions: HashMap<SmolStr, FunctionInfo>,
    function_order: Vec<(SmolStr, usize)>,
}

impl<'a> Compiler<'a> {
    pub fn new(entry: &'a LanguageEntry) -> Self {
        Compiler {
            entry,
            instructions: Vec::new(),
            constants: Vec::new(),
            variables: HashMap::new(),
            variable_names: Vec::new(),
            functions: HashMap::new(),
            function_order: Vec::new(),
        }
    }

    pub fn compile(mut self, program: &Program) -> Result<BytecodeProgram, CompileError> {
        for stmt in &program.statements {
            self.compile_stmt(stmt)?;
        }
        self.emit(Op::Halt);

        debug!(
            "compiled {} instructions, {} constants, {} variables, {} functions",
            self.instructions.len(),
            self.constants.len(),
            self.variable_names.len(),
            self.function_order.len()
        );

        Ok(BytecodeProgram {
            instructions: self.instructions,
            constants: self.constants,
            variable_names: self.variable_names,
            functions: self.function_order,
        })
    }

    // Emission helpers

    fn emit(&mut self, op: Op) -> usize {
        self.instructions.push(op);
        self.instructions.len() - 1
    }

    fn patch_jump(&mut self, at: usize, target: usize) {
        if let Some(Op::Jump(t) | Op::JumpIfFalse(t) | Op::JumpIfTrue(t)) =
            self.instructions.get_mut(at)
        {
            *t = target;
        }
    }

    /// Pool a constant, reusing the index of a structurally equal entry.
    fn add_constant(&mut self, constant: Constant) -> usize {
        if let Some(idx) = self.constants.iter().position(|c| c == &constant) {
            return idx;
        }
        self.constants.push(constant);
        self.constants.len() - 1
    }

    fn emit_constant(&mut self, constant: Constant) {
        let idx = self.add_constant(constant);
        self.emit(Op::LoadConst(idx));
    }

    /// Discard an expression value in statement position. `PRINT` consumes
    /// its operands and pushes nothing, so a statement that ends in it has
    /// nothing left to pop.
    fn emit_statement_pop(&mut self) {
        if !matches!(self.instructions.last(), Some(Op::Print(_))) {
            self.emit(Op::Pop);
        }
    }

    /// Variable slot for a name: reused if the name is known, freshly
    /// allocated otherwise. Indices grow monotonically.
    fn variable_slot(&mut self, name: &SmolStr) -> usize {
        if let Some(&idx) = self.variables.get(name) {
            return idx;
        }
        let idx = self.variable_names.len();
        self.variables.insert(name.clone(), idx);
        self.variable_names.push(name.clone());
        idx
    }

    // Statements

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::VarDecl { name, initializer } => {
                match initializer {
                    Some(expr) => self.compile_expr(expr)?,
                    None => self.emit_constant(Constant::Null),
                }
                let idx = self.variable_slot(name);
                self.emit(Op::StoreVar(idx));
                self.emit(Op::Pop);
            }

            Stmt::FunDecl { name, params, body } => {
                self.compile_fun_decl(name, params, body)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_expr(condition)?;
                let jump_to_else = self.emit(Op::JumpIfFalse(0));
                self.compile_stmt(then_branch)?;

                match else_branch {
                    Some(else_branch) => {
                        let jump_to_end = self.emit(Op::Jump(0));
                        let else_start = self.instructions.len();
                        self.patch_jump(jump_to_else, else_start);
                        self.compile_stmt(else_branch)?;
                        let end = self.instructions.len();
                        self.patch_jump(jump_to_end, end);
                    }
                    None => {
                        let end = self.instructions.len();
                        self.patch_jump(jump_to_else, end);
                    }
                }
            }

            Stmt::While { condition, body } => {
                let loop_start = self.instructions.len();
                self.compile_expr(condition)?;
                let exit = self.emit(Op::JumpIfFalse(0));
                self.compile_stmt(body)?;
                self.emit(Op::Jump(loop_start));
                let end = self.instructions.len();
                self.patch_jump(exit, end);
            }

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                // Statement initializers discard their own value.
                if let Some(init) = initializer {
                    self.compile_stmt(init)?;
                }

                let loop_start = self.instructions.len();
                match condition {
                    Some(condition) => self.compile_expr(condition)?,
                    None => self.emit_constant(Constant::Bool(true)),
                }
                let exit = self.emit(Op::JumpIfFalse(0));

                self.compile_stmt(body)?;
                if let Some(increment) = increment {
                    self.compile_expr(increment)?;
                    self.emit_statement_pop();
                }
                self.emit(Op::Jump(loop_start));
                let end = self.instructions.len();
                self.patch_jump(exit, end);
            }

            Stmt::Return { value } => {
                match value {
                    Some(expr) => self.compile_expr(expr)?,
                    None => self.emit_constant(Constant::Null),
                }
                self.emit(Op::Return);
            }

            Stmt::Block(statements) => {
                for stmt in statements {
                    self.compile_stmt(stmt)?;
                }
            }

            Stmt::Expr(expr) => {
                self.compile_expr(expr)?;
                self.emit_statement_pop();
            }
        }

        Ok(())
    }

    fn compile_fun_decl(
        &mut self,
        name: &SmolStr,
        params: &[SmolStr],
        body: &[Stmt],
    ) -> Result<(), CompileError> {
        // The body sits inline in the instruction stream; jump over it so
        // straight-line execution cannot fall in.
        let jump_over = self.emit(Op::Jump(0));
        let address = self.instructions.len();

        // Registered before the body compiles so recursive calls resolve.
        self.functions.insert(
            name.clone(),
            FunctionInfo {
                address,
                arity: params.len(),
            },
        );
        self.function_order.push((name.clone(), address));

        // Arguments arrive on the stack in call order, so the last parameter
        // is on top and gets bound first.
        for param in params.iter().rev() {
            let idx = self.variable_slot(param);
            self.emit(Op::StoreVar(idx));
            self.emit(Op::Pop);
        }

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        // Fall-through return so control never runs off the body's end.
        self.emit_constant(Constant::Null);
        self.emit(Op::Return);

        let after = self.instructions.len();
        self.patch_jump(jump_over, after);
        Ok(())
    }

    // Expressions

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(literal) => {
                let constant = match literal {
                    Literal::Number(text) => Constant::Number(text.clone()),
                    Literal::Str(s) => Constant::Str(s.clone()),
                    Literal::Bool(b) => Constant::Bool(*b),
                    Literal::Null => Constant::Null,
                };
                self.emit_constant(constant);
            }

            Expr::Identifier { name, line, col } => {
                if let Some(&idx) = self.variables.get(name) {
                    self.emit(Op::LoadVar(idx));
                } else if let Some(info) = self.functions.get(name) {
                    let constant = Constant::Function {
                        address: info.address,
                        arity: info.arity,
                    };
                    self.emit_constant(constant);
                } else {
                    return Err(CompileError::undefined_name(name, *line, *col));
                }
            }

            Expr::Assign { name, value } => {
                self.compile_expr(value)?;
                let idx = self.variable_slot(name);
                self.emit(Op::StoreVar(idx));
            }

            Expr::Unary { op, operand } => {
                self.compile_expr(operand)?;
                self.emit(match op {
                    UnaryOp::Negate => Op::Negate,
                    UnaryOp::Not => Op::Not,
                });
            }

            Expr::Binary { left, op, right } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit(binary_op(*op));
            }

            Expr::Call { callee, args } => {
                if let Expr::Identifier { name, .. } = callee.as_ref() {
                    match self.entry.builtin_of(name) {
                        Some(Builtin::Print) => {
                            for arg in args {
                                self.compile_expr(arg)?;
                            }
                            self.emit(Op::Print(args.len()));
                            return Ok(());
                        }
                        Some(Builtin::Input) => {
                            // Arguments to input are ignored outright.
                            self.emit(Op::Input);
                            return Ok(());
                        }
                        None => {}
                    }
                }

                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.compile_expr(callee)?;
                self.emit(Op::Call(args.len()));
            }
        }

        Ok(())
    }
}

fn binary_op(op: BinaryOp) -> Op {
    match op {
        BinaryOp::Add => Op::Add,
        BinaryOp::Subtract => Op::Subtract,
        BinaryOp::Multiply => Op::Multiply,
        BinaryOp::Divide => Op::Divide,
        BinaryOp::Modulo => Op::Modulo,
        BinaryOp::Equal => Op::Equal,
        BinaryOp::NotEqual => Op::NotEqual,
        BinaryOp::LessThan => Op::LessThan,
        BinaryOp::GreaterThan => Op::GreaterThan,
        BinaryOp::LessEqual => Op::LessEqual,
        BinaryOp::GreaterEqual => Op::GreaterEqual,
        BinaryOp::And => Op::And,
        BinaryOp::Or => Op::Or,
    }
}

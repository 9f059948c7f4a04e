use std::cmp::Ordering;

use log::{debug, trace};

use crate::bytecode::op::Op;
use crate::bytecode::program::{BytecodeProgram, Constant};
use crate::lang::Value;
use crate::runtime::input::InputProvider;
use crate::runtime::runtime_error::RuntimeError;

/// Execution limits. The default places no bound on the step count; hosts
/// that want to contain runaway loops set `max_steps`.
#[derive(Debug, Clone, Default)]
pub struct VmConfig {
    pub max_steps: Option<usize>,
}

/// One call record: where to resume, and how long the variable table was
/// when the call was made. Returning truncates the table back to that
/// length, which is what keeps recursion sound in a flat variable space.
#[derive(Debug)]
struct Frame {
    return_pc: usize,
    frame_base: usize,
}

/// The result of a completed execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub output_lines: Vec<String>,
}

/// Stack-based virtual machine.
///
/// State is reset at the start of every `run`, so one machine can execute
/// the same program repeatedly. Execution stops at `Halt`, at a top-level
/// `Return`, or when the program counter runs off the end.
pub struct Vm {
    stack: Vec<Value>,
    variables: Vec<Value>,
    frames: Vec<Frame>,
    pc: usize,
    steps: usize,
    output: Vec<String>,
    config: VmConfig,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Vm {
            stack: Vec::new(),
            variables: Vec::new(),
            frames: Vec::new(),
            pc: 0,
            steps: 0,
            output: Vec::new(),
            config,
        }
    }

    /// Operand stack contents, mostly useful to tests.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.variables.clear();
        self.frames.clear();
        self.pc = 0;
        self.steps = 0;
        self.output.clear();
    }

    pub fn run(
        &mut self,
        program: &BytecodeProgram,
        io: &mut dyn InputProvider,
    ) -> Result<Execution, RuntimeError> {
        self.reset();

        while self.pc < program.instructions.len() {
            let pc = self.pc;

            self.steps += 1;
            if let Some(max) = self.config.max_steps {
                if self.steps > max {
                    return Err(RuntimeError::limit_exceeded(pc, max));
                }
            }

            let op = program.instructions[pc];
            trace!("pc {:3}: {} (stack depth {})", pc, op, self.stack.len());

            match op {
                Op::LoadConst(idx) => {
                    let value = self.constant(program, idx, pc)?;
                    self.stack.push(value);
                }

                Op::LoadVar(idx) => match self.variables.get(idx) {
                    Some(value) => self.stack.push(value.clone()),
                    None => {
                        return Err(RuntimeError::bad_instruction(
                            pc,
                            format!("variable index {} out of range", idx),
                        ))
                    }
                },

                Op::StoreVar(idx) => {
                    let value = self.pop(pc)?;
                    if idx >= self.variables.len() {
                        self.variables.resize(idx + 1, Value::Null);
                    }
                    self.variables[idx] = value.clone();
                    // The value stays available: assignment is an expression.
                    self.stack.push(value);
                }

                Op::Pop => {
                    self.pop(pc)?;
                }

                Op::Add => {
                    let right = self.pop(pc)?;
                    let left = self.pop(pc)?;
                    let value = match (&left, &right) {
                        // String-biased: one string operand makes it a
                        // concatenation of textual forms.
                        (Value::Str(_), _) | (_, Value::Str(_)) => {
                            Value::Str(format!("{}{}", left, right))
                        }
                        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                        _ => {
                            return Err(self.operand_type_error(pc, "+", &left, &right));
                        }
                    };
                    self.stack.push(value);
                }

                Op::Subtract => {
                    let (a, b) = self.numeric_operands(pc, "-")?;
                    self.stack.push(Value::Number(a - b));
                }

                Op::Multiply => {
                    let (a, b) = self.numeric_operands(pc, "*")?;
                    self.stack.push(Value::Number(a * b));
                }

                Op::Divide => {
                    let (a, b) = self.numeric_operands(pc, "/")?;
                    if b == 0.0 {
                        return Err(RuntimeError::division_by_zero(pc));
                    }
                    self.stack.push(Value::Number(a / b));
                }

                Op::Modulo => {
                    let (a, b) = self.numeric_operands(pc, "%")?;
                    if b == 0.0 {
                        return Err(RuntimeError::division_by_zero(pc));
                    }
                    self.stack.push(Value::Number(a % b));
                }

                Op::Negate => {
                    let value = self.pop(pc)?;
                    match value {
                        Value::Number(n) => self.stack.push(Value::Number(-n)),
                        other => {
                            return Err(RuntimeError::bad_instruction(
                                pc,
                                format!("cannot negate a {}", other.type_name()),
                            ))
                        }
                    }
                }

                Op::Equal => {
                    let right = self.pop(pc)?;
                    let left = self.pop(pc)?;
                    self.stack.push(Value::Bool(left == right));
                }

                Op::NotEqual => {
                    let right = self.pop(pc)?;
                    let left = self.pop(pc)?;
                    self.stack.push(Value::Bool(left != right));
                }

                Op::LessThan => self.compare(pc, "<", |o| o == Ordering::Less)?,
                Op::GreaterThan => self.compare(pc, ">", |o| o == Ordering::Greater)?,
                Op::LessEqual => self.compare(pc, "<=", |o| o != Ordering::Greater)?,
                Op::GreaterEqual => self.compare(pc, ">=", |o| o != Ordering::Less)?,

                Op::And => {
                    // Both operands were evaluated; select by truthiness.
                    let right = self.pop(pc)?;
                    let left = self.pop(pc)?;
                    let value = if left.is_truthy() { right } else { left };
                    self.stack.push(value);
                }

                Op::Or => {
                    let right = self.pop(pc)?;
                    let left = self.pop(pc)?;
                    let value = if left.is_truthy() { left } else { right };
                    self.stack.push(value);
                }

                Op::Not => {
                    let value = self.pop(pc)?;
                    self.stack.push(Value::Bool(!value.is_truthy()));
                }

                Op::Jump(target) => {
                    self.jump(program, target, pc)?;
                    continue;
                }

                Op::JumpIfFalse(target) => {
                    let value = self.pop(pc)?;
                    if !value.is_truthy() {
                        self.jump(program, target, pc)?;
                        continue;
                    }
                }

                Op::JumpIfTrue(target) => {
                    let value = self.pop(pc)?;
                    if value.is_truthy() {
                        self.jump(program, target, pc)?;
                        continue;
                    }
                }

                Op::Call(argc) => {
                    let callee = self.pop(pc)?;
                    let (address, arity) = match callee {
                        Value::Function { address, arity } => (address, arity),
                        other => {
                            return Err(RuntimeError::bad_instruction(
                                pc,
                                format!("cannot call a {}", other.type_name()),
                            ))
                        }
                    };
                    if arity != argc {
                        return Err(RuntimeError::bad_instruction(
                            pc,
                            format!("function expects {} arguments, got {}", arity, argc),
                        ));
                    }
                    if address >= program.instructions.len() {
                        return Err(RuntimeError::bad_instruction(
                            pc,
                            format!("call target {} out of range", address),
                        ));
                    }
                    self.frames.push(Frame {
                        return_pc: pc,
                        frame_base: self.variables.len(),
                    });
                    self.pc = address;
                    continue;
                }

                Op::Return => {
                    match self.frames.pop() {
                        Some(frame) => {
                            let value = self.pop(pc)?;
                            // Drop the callee's locals, restoring the
                            // caller's view of the variable table.
                            self.variables.truncate(frame.frame_base);
                            self.stack.push(value);
                            self.pc = frame.return_pc + 1;
                            continue;
                        }
                        // Top-level return halts the machine.
                        None => break,
                    }
                }

                Op::Print(argc) => {
                    let mut parts = Vec::with_capacity(argc);
                    for _ in 0..argc {
                        parts.push(self.pop(pc)?);
                    }
                    parts.reverse();
                    let line = parts
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(" ");
                    self.output.push(line);
                }

                Op::Input => {
                    self.stack.push(Value::Str(io.next_line()));
                }

                Op::Halt => break,
            }

            self.pc += 1;
        }

        debug!(
            "halted after {} steps with {} output lines",
            self.steps,
            self.output.len()
        );

        Ok(Execution {
            output_lines: std::mem::take(&mut self.output),
        })
    }

    // Dispatch helpers

    fn pop(&mut self, pc: usize) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| RuntimeError::stack_underflow(pc))
    }

    fn jump(
        &mut self,
        program: &BytecodeProgram,
        target: usize,
        pc: usize,
    ) -> Result<(), RuntimeError> {
        if target >= program.instructions.len() {
            return Err(RuntimeError::bad_instruction(
                pc,
                format!("jump target {} out of range", target),
            ));
        }
        self.pc = target;
        Ok(())
    }

    /// Materialize a pool entry. Numbers convert from their lexeme here,
    /// which is where a malformed literal finally fails.
    fn constant(
        &self,
        program: &BytecodeProgram,
        idx: usize,
        pc: usize,
    ) -> Result<Value, RuntimeError> {
        let constant = program.constants.get(idx).ok_or_else(|| {
            RuntimeError::bad_instruction(pc, format!("constant index {} out of range", idx))
        })?;
        match constant {
            Constant::Number(text) => text.parse::<f64>().map(Value::Number).map_err(|_| {
                RuntimeError::bad_instruction(pc, format!("malformed number literal '{}'", text))
            }),
            Constant::Str(s) => Ok(Value::Str(s.clone())),
            Constant::Bool(b) => Ok(Value::Bool(*b)),
            Constant::Null => Ok(Value::Null),
            Constant::Function { address, arity } => Ok(Value::Function {
                address: *address,
                arity: *arity,
            }),
        }
    }

    fn numeric_operands(&mut self, pc: usize, op: &str) -> Result<(f64, f64), RuntimeError> {
        let right = self.pop(pc)?;
        let left = self.pop(pc)?;
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(self.operand_type_error(pc, op, &left, &right)),
        }
    }

    fn compare(
        &mut self,
        pc: usize,
        op: &str,
        accept: impl Fn(Ordering) -> bool,
    ) -> Result<(), RuntimeError> {
        let right = self.pop(pc)?;
        let left = self.pop(pc)?;
        let ordering = match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => return Err(self.operand_type_error(pc, op, &left, &right)),
        };
        // An incomparable pair (NaN) compares false under every operator.
        let result = ordering.map(accept).unwrap_or(false);
        self.stack.push(Value::Bool(result));
        Ok(())
    }

    fn operand_type_error(&self, pc: usize, op: &str, left: &Value, right: &Value) -> RuntimeError {
        RuntimeError::bad_instruction(
            pc,
            format!(
                "'{}' not defined for {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Compiler;
    use crate::frontend::{Lexer, Parser};
    use crate::lang::lookup;
    use crate::runtime::input::BufferedInput;
    use crate::runtime::runtime_error::RuntimeErrorKind;

    // Test helpers

    /// Wrap raw ops and constants into a program.
    fn program_from_ops(ops: Vec<Op>, constants: Vec<Constant>) -> BytecodeProgram {
        BytecodeProgram {
            instructions: ops,
            constants,
            variable_names: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Run raw ops and return the output lines.
    fn run_ops(ops: Vec<Op>, constants: Vec<Constant>) -> Result<Execution, RuntimeError> {
        let program = program_from_ops(ops, constants);
        Vm::new().run(&program, &mut BufferedInput::empty())
    }

    /// Compile a source program (English keywords) and run it.
    fn run_source(source: &str) -> Result<Execution, RuntimeError> {
        let en = lookup("en").unwrap();
        let tokens = Lexer::new(source, en).tokenize();
        let ast = Parser::new(tokens).parse().expect("source should parse");
        let program = Compiler::new(en).compile(&ast).expect("source should compile");
        Vm::new().run(&program, &mut BufferedInput::empty())
    }

    fn output_of(source: &str) -> Vec<String> {
        run_source(source).expect("program should run").output_lines
    }

    fn num(text: &str) -> Constant {
        Constant::Number(text.into())
    }

    #[test]
    fn test_load_and_print() {
        let exec = run_ops(
            vec![Op::LoadConst(0), Op::Print(1), Op::Halt],
            vec![num("7")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["7"]);
    }

    #[test]
    fn test_print_joins_with_spaces() {
        let exec = run_ops(
            vec![Op::LoadConst(0), Op::LoadConst(1), Op::Print(2), Op::Halt],
            vec![num("1"), Constant::Str("two".to_string())],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["1 two"]);
    }

    #[test]
    fn test_print_no_arguments_is_an_empty_line() {
        let exec = run_ops(vec![Op::Print(0), Op::Halt], vec![]).unwrap();
        assert_eq!(exec.output_lines, vec![""]);
    }

    #[test]
    fn test_add_numbers() {
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::LoadConst(1),
                Op::Add,
                Op::Print(1),
                Op::Halt,
            ],
            vec![num("10"), num("20")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["30"]);
    }

    #[test]
    fn test_add_is_string_biased() {
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::LoadConst(1),
                Op::Add,
                Op::Print(1),
                Op::Halt,
            ],
            vec![Constant::Str("n = ".to_string()), num("3")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["n = 3"]);
    }

    #[test]
    fn test_subtract_rejects_strings() {
        let err = run_ops(
            vec![Op::LoadConst(0), Op::LoadConst(0), Op::Subtract, Op::Halt],
            vec![Constant::Str("a".to_string())],
        )
        .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
    }

    #[test]
    fn test_division_by_zero() {
        let err = run_ops(
            vec![Op::LoadConst(0), Op::LoadConst(1), Op::Divide, Op::Halt],
            vec![num("1"), num("0")],
        )
        .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
        assert_eq!(err.pc, 2);
    }

    #[test]
    fn test_modulo_by_zero() {
        let err = run_ops(
            vec![Op::LoadConst(0), Op::LoadConst(1), Op::Modulo, Op::Halt],
            vec![num("5"), num("0")],
        )
        .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
    }

    #[test]
    fn test_stack_underflow() {
        let err = run_ops(vec![Op::Pop, Op::Halt], vec![]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::StackUnderflow);
        assert_eq!(err.pc, 0);
    }

    #[test]
    fn test_constant_index_out_of_range() {
        let err = run_ops(vec![Op::LoadConst(9), Op::Halt], vec![]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
    }

    #[test]
    fn test_malformed_number_fails_at_load() {
        let err = run_ops(vec![Op::LoadConst(0), Op::Halt], vec![num("1.2.3")]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
        assert!(err.message.contains("1.2.3"));
    }

    #[test]
    fn test_jump_target_out_of_range() {
        let err = run_ops(vec![Op::Jump(99), Op::Halt], vec![]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
    }

    #[test]
    fn test_step_limit_exceeded() {
        let program = program_from_ops(vec![Op::Jump(0)], vec![]);
        let mut vm = Vm::with_config(VmConfig {
            max_steps: Some(100),
        });
        let err = vm.run(&program, &mut BufferedInput::empty()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::ExecutionLimitExceeded);
    }

    #[test]
    fn test_store_grows_table_and_fills_gaps_with_null() {
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::StoreVar(3),
                Op::Pop,
                Op::LoadVar(1),
                Op::Print(1),
                Op::Halt,
            ],
            vec![num("1")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["null"]);
    }

    #[test]
    fn test_load_var_out_of_range() {
        let err = run_ops(vec![Op::LoadVar(0), Op::Halt], vec![]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
    }

    #[test]
    fn test_store_var_pushes_the_value_back() {
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::StoreVar(0),
                Op::Print(1),
                Op::Halt,
            ],
            vec![num("5")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["5"]);
    }

    #[test]
    fn test_and_selects_by_truthiness() {
        // 0 && 5 yields the first (falsy) operand.
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::LoadConst(1),
                Op::And,
                Op::Print(1),
                Op::Halt,
            ],
            vec![num("0"), num("5")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["0"]);
    }

    #[test]
    fn test_or_selects_by_truthiness() {
        // 0 || 5 yields the second operand.
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::LoadConst(1),
                Op::Or,
                Op::Print(1),
                Op::Halt,
            ],
            vec![num("0"), num("5")],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["5"]);
    }

    #[test]
    fn test_string_ordering_is_by_code_points() {
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::LoadConst(1),
                Op::LessThan,
                Op::Print(1),
                Op::Halt,
            ],
            vec![
                Constant::Str("apple".to_string()),
                Constant::Str("banana".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["true"]);
    }

    #[test]
    fn test_mixed_comparison_is_rejected() {
        let err = run_ops(
            vec![Op::LoadConst(0), Op::LoadConst(1), Op::LessThan, Op::Halt],
            vec![num("1"), Constant::Str("1".to_string())],
        )
        .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
    }

    #[test]
    fn test_equality_is_deep_and_typed() {
        let exec = run_ops(
            vec![
                Op::LoadConst(0),
                Op::LoadConst(1),
                Op::Equal,
                Op::Print(1),
                Op::Halt,
            ],
            vec![num("1"), Constant::Str("1".to_string())],
        )
        .unwrap();
        assert_eq!(exec.output_lines, vec!["false"]);
    }

    #[test]
    fn test_call_non_function() {
        let err = run_ops(
            vec![Op::LoadConst(0), Op::Call(0), Op::Halt],
            vec![num("1")],
        )
        .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
        assert!(err.message.contains("cannot call"));
    }

    #[test]
    fn test_call_arity_mismatch() {
        let err = run_ops(
            vec![Op::LoadConst(0), Op::Call(0), Op::Halt],
            vec![Constant::Function {
                address: 0,
                arity: 2,
            }],
        )
        .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::BadInstruction);
        assert!(err.message.contains("argument"));
    }

    #[test]
    fn test_top_level_return_halts() {
        let exec = run_ops(
            vec![Op::LoadConst(0), Op::Return, Op::Print(1), Op::Halt],
            vec![Constant::Null],
        )
        .unwrap();
        assert!(exec.output_lines.is_empty());
    }

    #[test]
    fn test_input_pushes_a_line() {
        let program = program_from_ops(vec![Op::Input, Op::Print(1), Op::Halt], vec![]);
        let mut input = BufferedInput::new(["hello"]);
        let exec = Vm::new().run(&program, &mut input).unwrap();
        assert_eq!(exec.output_lines, vec!["hello"]);
    }

    #[test]
    fn test_exhausted_input_reads_empty_string() {
        let program = program_from_ops(vec![Op::Input, Op::Print(1), Op::Halt], vec![]);
        let exec = Vm::new().run(&program, &mut BufferedInput::empty()).unwrap();
        assert_eq!(exec.output_lines, vec![""]);
    }

    #[test]
    fn test_recursive_call_restores_caller_frame() {
        let output = output_of(
            "function fact(n) { if (n <= 1) { return 1; } else { return n * fact(n - 1); } } \
             print(fact(5));",
        );
        assert_eq!(output, vec!["120"]);
    }

    #[test]
    fn test_return_truncates_callee_locals() {
        // `a` lives below the callee's parameter slot and must survive the
        // call; the parameter slot is dropped on return.
        let output = output_of(
            "var a = 1; function f(x) { return x; } print(f(2)); print(a);",
        );
        assert_eq!(output, vec!["2", "1"]);
    }

    #[test]
    fn test_stack_is_empty_after_each_statement() {
        let en = lookup("en").unwrap();
        let source = "var x = 1; x = x + 2; print(x); if (x > 1) { x = 0; }";
        let tokens = Lexer::new(source, en).tokenize();
        let ast = Parser::new(tokens).parse().unwrap();
        let program = Compiler::new(en).compile(&ast).unwrap();
        let mut vm = Vm::new();
        vm.run(&program, &mut BufferedInput::empty()).unwrap();
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn test_rerun_resets_state() {
        let en = lookup("en").unwrap();
        let tokens = Lexer::new("var x = 1; print(x);", en).tokenize();
        let ast = Parser::new(tokens).parse().unwrap();
        let program = Compiler::new(en).compile(&ast).unwrap();
        let mut vm = Vm::new();
        let first = vm.run(&program, &mut BufferedInput::empty()).unwrap();
        let second = vm.run(&program, &mut BufferedInput::empty()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_halt_stops_before_later_instructions() {
        let exec = run_ops(
            vec![Op::Halt, Op::LoadConst(0), Op::Print(1)],
            vec![num("1")],
        )
        .unwrap();
        assert!(exec.output_lines.is_empty());
    }
}

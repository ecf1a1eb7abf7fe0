//! Tree-walking evaluator for the pseudocode language
//!
//! One `Interpreter` owns one `Environment` for one synchronous run; there
//! is no suspension, no cancellation and no shared state. Runaway loops are
//! bounded by [`ITERATION_CAP`] and stop silently when they hit it.

use std::collections::HashMap;

use tracing::debug;

use crate::error::RuntimeError;
use crate::pseudo::parser::{BinOp, DeclaredType, Expr, Stmt, UnaryOp};

/// Hard bound on WHILE/FOR iterations. The language has no cancellation
/// mechanism, so this is the only brake on a non-terminating program.
pub const ITERATION_CAP: usize = 50_100;

/// A runtime value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// The declared type this value satisfies.
    pub fn declared_type(&self) -> DeclaredType {
        match self {
            Value::Number(_) => DeclaredType::Number,
            Value::Text(_) => DeclaredType::Text,
            Value::Boolean(_) => DeclaredType::Boolean,
        }
    }

    /// Text rendering used by OUTPUT.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Number(n) => {
                if *n == n.trunc() && n.abs() < 1e10 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

/// A declared scalar slot; the value stays unset until first assignment or
/// a FOR counter binding.
#[derive(Clone, Debug)]
struct Variable {
    declared_type: DeclaredType,
    value: Option<Value>,
}

/// A declared array; bounds are inclusive and fixed when the declaration
/// statement executes. Elements are individually unset until assigned.
#[derive(Clone, Debug)]
struct ArrayVar {
    element_type: DeclaredType,
    lower: f64,
    upper: f64,
    // Bounds checks compare on the float index; storage keys truncate.
    storage: HashMap<i64, Value>,
}

/// Live name-to-storage mappings for one program execution. Variables and
/// arrays are separate namespaces and never consult each other.
#[derive(Debug, Default)]
struct Environment {
    variables: HashMap<String, Variable>,
    arrays: HashMap<String, ArrayVar>,
}

/// Consumer of OUTPUT lines; the evaluator never assumes a rendering.
pub trait OutputSink {
    fn write_line(&mut self, line: &str);
}

impl OutputSink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// The interpreter; owns the environment for one run.
pub struct Interpreter {
    env: Environment,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::default(),
        }
    }

    /// Run a parsed program against the output sink.
    ///
    /// Returns the last statement's value (statements yield no value, so
    /// `None` on success) or the first runtime error; execution halts there.
    pub fn run(
        &mut self,
        program: &[Stmt],
        sink: &mut dyn OutputSink,
    ) -> Result<Option<Value>, RuntimeError> {
        let mut result = None;
        for stmt in program {
            result = self.exec_stmt(stmt, sink)?;
        }
        Ok(result)
    }

    fn exec_stmt(
        &mut self,
        stmt: &Stmt,
        sink: &mut dyn OutputSink,
    ) -> Result<Option<Value>, RuntimeError> {
        match stmt {
            Stmt::VarDecl {
                name,
                declared_type,
            } => {
                // Re-declaring a name silently replaces the existing slot.
                self.env.variables.insert(
                    name.clone(),
                    Variable {
                        declared_type: *declared_type,
                        value: None,
                    },
                );
                Ok(None)
            }

            Stmt::ArrayDecl {
                name,
                element_type,
                lower,
                upper,
            } => {
                let lower = self.expect_number(lower, "array bound")?;
                let upper = self.expect_number(upper, "array bound")?;
                self.env.arrays.insert(
                    name.clone(),
                    ArrayVar {
                        element_type: *element_type,
                        lower,
                        upper,
                        storage: HashMap::new(),
                    },
                );
                Ok(None)
            }

            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                let slot = self
                    .env
                    .variables
                    .get_mut(name)
                    .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.clone()))?;
                match value {
                    Some(v) if v.declared_type() == slot.declared_type => {
                        slot.value = Some(v);
                        Ok(None)
                    }
                    _ => Err(RuntimeError::TypeMismatch(format!(
                        "assignment to variable '{}'",
                        name
                    ))),
                }
            }

            Stmt::ArrayAssign { name, index, value } => {
                let index = self.eval_expr(index)?;
                let value = self.eval_expr(value)?;
                let arr = self
                    .env
                    .arrays
                    .get_mut(name)
                    .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.clone()))?;
                let idx = match index {
                    Some(Value::Number(n)) if n >= arr.lower && n <= arr.upper => n,
                    _ => return Err(RuntimeError::IndexOutOfBounds(name.clone())),
                };
                match value {
                    Some(v) if v.declared_type() == arr.element_type => {
                        arr.storage.insert(idx as i64, v);
                        Ok(None)
                    }
                    _ => Err(RuntimeError::TypeMismatch(format!(
                        "assignment to array '{}'",
                        name
                    ))),
                }
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.expect_boolean(condition, "IF condition")? {
                    for stmt in then_branch {
                        self.exec_stmt(stmt, sink)?;
                    }
                } else if let Some(else_branch) = else_branch {
                    for stmt in else_branch {
                        self.exec_stmt(stmt, sink)?;
                    }
                }
                Ok(None)
            }

            Stmt::While { condition, body } => {
                let mut count = 0;
                while self.expect_boolean(condition, "WHILE condition")? {
                    if count >= ITERATION_CAP {
                        debug!("WHILE loop stopped at the iteration cap");
                        break;
                    }
                    for stmt in body {
                        self.exec_stmt(stmt, sink)?;
                    }
                    count += 1;
                }
                Ok(None)
            }

            Stmt::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                // Start, end and step are evaluated once, before the loop.
                let start = self.expect_number(start, "FOR start")?;
                let end = self.expect_number(end, "FOR end")?;
                let step = match step {
                    Some(expr) => self.expect_number(expr, "FOR step")?,
                    None => 1.0,
                };

                // The body only runs when start < end (strictly).
                if start < end {
                    let mut count = 0;
                    let mut i = start;
                    while i <= end && count < ITERATION_CAP {
                        // Counter binding bypasses the declared-type check.
                        match self.env.variables.get_mut(var) {
                            Some(slot) => slot.value = Some(Value::Number(i)),
                            None => {
                                return Err(RuntimeError::UndeclaredIdentifier(var.clone()))
                            }
                        }
                        for stmt in body {
                            self.exec_stmt(stmt, sink)?;
                        }
                        i += step;
                        count += 1;
                    }
                    if count == ITERATION_CAP {
                        debug!("FOR loop stopped at the iteration cap");
                    }
                }
                Ok(None)
            }

            Stmt::Output(expr) => {
                // An unset result is suppressed; no line is emitted.
                if let Some(value) = self.eval_expr(expr)? {
                    sink.write_line(&value.to_display_string());
                }
                Ok(None)
            }
        }
    }

    /// Evaluate an expression. `Ok(None)` is the "unset" result produced by
    /// reading an in-bounds array element that was never assigned; it
    /// propagates through unary operators and pairs of unset operands.
    fn eval_expr(&self, expr: &Expr) -> Result<Option<Value>, RuntimeError> {
        match expr {
            Expr::Number(n) => Ok(Some(Value::Number(*n))),
            Expr::String(s) => Ok(Some(Value::Text(s.clone()))),
            Expr::Boolean(b) => Ok(Some(Value::Boolean(*b))),

            Expr::Variable(name) => {
                let var = self
                    .env
                    .variables
                    .get(name)
                    .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.clone()))?;
                match &var.value {
                    Some(v) => Ok(Some(v.clone())),
                    None => Err(RuntimeError::UseBeforeAssignment(name.clone())),
                }
            }

            Expr::ArrayAccess(name, index) => {
                let arr = self
                    .env
                    .arrays
                    .get(name)
                    .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.clone()))?;
                match self.eval_expr(index)? {
                    Some(Value::Number(n)) if n >= arr.lower && n <= arr.upper => {
                        Ok(arr.storage.get(&(n as i64)).cloned())
                    }
                    _ => Err(RuntimeError::IndexOutOfBounds(name.clone())),
                }
            }

            Expr::UnaryOp(op, operand) => {
                let value = match self.eval_expr(operand)? {
                    Some(v) => v,
                    None => return Ok(None),
                };
                match (op, value) {
                    (UnaryOp::Pos, Value::Number(n)) => Ok(Some(Value::Number(n))),
                    (UnaryOp::Neg, Value::Number(n)) => Ok(Some(Value::Number(-n))),
                    (UnaryOp::Not, Value::Boolean(b)) => Ok(Some(Value::Boolean(!b))),
                    _ => Err(RuntimeError::TypeMismatch("unary expression".to_string())),
                }
            }

            Expr::BinaryOp(lhs, op, rhs) => {
                // Both sides are always evaluated; AND/OR do not short-circuit.
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                let (lhs, rhs) = match (lhs, rhs) {
                    (None, None) => return Ok(None),
                    (Some(l), Some(r)) => (l, r),
                    _ => {
                        return Err(RuntimeError::TypeMismatch(
                            "binary expression".to_string(),
                        ))
                    }
                };
                eval_binary(*op, lhs, rhs)
            }
        }
    }

    fn expect_number(&self, expr: &Expr, what: &str) -> Result<f64, RuntimeError> {
        match self.eval_expr(expr)? {
            Some(Value::Number(n)) => Ok(n),
            _ => Err(RuntimeError::TypeMismatch(what.to_string())),
        }
    }

    fn expect_boolean(&self, expr: &Expr, what: &str) -> Result<bool, RuntimeError> {
        match self.eval_expr(expr)? {
            Some(Value::Boolean(b)) => Ok(b),
            _ => Err(RuntimeError::TypeMismatch(what.to_string())),
        }
    }
}

/// Apply a binary operator to two set operands, checking tags first.
/// Relational ordering is the host's native one per tag: numbers by value,
/// text lexicographically, booleans with false < true.
fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Option<Value>, RuntimeError> {
    use Value::{Boolean, Number, Text};

    let value = match (op, lhs, rhs) {
        (BinOp::Add, Number(a), Number(b)) => Number(a + b),
        (BinOp::Sub, Number(a), Number(b)) => Number(a - b),
        (BinOp::Mul, Number(a), Number(b)) => Number(a * b),
        (BinOp::Div, Number(a), Number(b)) => Number(a / b),

        (BinOp::And, Boolean(a), Boolean(b)) => Boolean(a && b),
        (BinOp::Or, Boolean(a), Boolean(b)) => Boolean(a || b),

        (BinOp::Eq, a, b) if a.declared_type() == b.declared_type() => Boolean(a == b),
        (BinOp::Ne, a, b) if a.declared_type() == b.declared_type() => Boolean(a != b),

        (BinOp::Lt, Number(a), Number(b)) => Boolean(a < b),
        (BinOp::Le, Number(a), Number(b)) => Boolean(a <= b),
        (BinOp::Gt, Number(a), Number(b)) => Boolean(a > b),
        (BinOp::Ge, Number(a), Number(b)) => Boolean(a >= b),

        (BinOp::Lt, Text(a), Text(b)) => Boolean(a < b),
        (BinOp::Le, Text(a), Text(b)) => Boolean(a <= b),
        (BinOp::Gt, Text(a), Text(b)) => Boolean(a > b),
        (BinOp::Ge, Text(a), Text(b)) => Boolean(a >= b),

        (BinOp::Lt, Boolean(a), Boolean(b)) => Boolean(a < b),
        (BinOp::Le, Boolean(a), Boolean(b)) => Boolean(a <= b),
        (BinOp::Gt, Boolean(a), Boolean(b)) => Boolean(a > b),
        (BinOp::Ge, Boolean(a), Boolean(b)) => Boolean(a >= b),

        _ => {
            return Err(RuntimeError::TypeMismatch(
                "binary expression".to_string(),
            ))
        }
    };

    Ok(Some(value))
}

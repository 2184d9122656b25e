//! Tree-walking execution over an analyzed `Program` (§4.4): a global
//! function table discovered in one pass before `main` runs, a stack of
//! per-call frames, and a single process-wide output buffer.

use cppi_par::{BinOp, Expr, IncDecOp, Literal, Param, Program, Stmt, UnOp};
use cppi_util::{Span, Symbol};
use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::frame::Frame;
use crate::value::{self, Value};

#[derive(Clone, Copy)]
struct FuncInfo<'a> {
    params: &'a [Param],
    body: &'a [Stmt],
}

/// A block's outcome: either it ran to completion, or a nested `return`
/// short-circuited it and is still threading upward (§4.4, §9).
enum ControlFlow {
    Normal,
    Returned(Value),
}

pub struct RunOutcome {
    pub exit_code: Result<i32, RuntimeError>,
    pub output: String,
}

/// Runs `program`'s `main` to completion and returns its exit code plus
/// everything written to `cout` along the way. Assumes `program` already
/// passed semantic analysis; a program that never reached that bar may
/// surface a `RuntimeError` this phase was never designed to recover from.
pub fn run(program: &Program) -> RunOutcome {
    let mut functions = FxHashMap::default();
    for item in &program.items {
        if let Stmt::FuncDecl { name, params, body, .. } = item {
            functions.insert(*name, FuncInfo { params, body });
        }
    }
    let mut evaluator = Evaluator {
        functions,
        output: String::new(),
    };
    let exit_code = evaluator.run_main();
    RunOutcome {
        exit_code,
        output: evaluator.output,
    }
}

struct Evaluator<'a> {
    functions: FxHashMap<Symbol, FuncInfo<'a>>,
    output: String,
}

impl<'a> Evaluator<'a> {
    fn run_main(&mut self) -> Result<i32, RuntimeError> {
        let func = *self
            .functions
            .get(&Symbol::intern("main"))
            .ok_or(RuntimeError::MissingMain)?;
        let mut frame = Frame::new();
        match self.exec_block(&mut frame, func.body)? {
            ControlFlow::Returned(v) => Ok(v.as_i64() as i32),
            ControlFlow::Normal => Ok(0),
        }
    }

    fn call_function(&mut self, func: FuncInfo<'a>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut frame = Frame::new();
        for (param, arg) in func.params.iter().zip(args) {
            frame.declare(param.name, value::coerce_to(arg, param.ty));
        }
        match self.exec_block(&mut frame, func.body)? {
            ControlFlow::Returned(v) => Ok(v),
            ControlFlow::Normal => Ok(Value::Void),
        }
    }

    fn exec_block(&mut self, frame: &mut Frame, statements: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        for stmt in statements {
            match self.exec_stmt(frame, stmt)? {
                ControlFlow::Normal => {}
                returned => return Ok(returned),
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_stmt(&mut self, frame: &mut Frame, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::ExprStmt { expr, .. } => {
                self.eval_expr(frame, expr)?;
                Ok(ControlFlow::Normal)
            }
            Stmt::VarDecl { ty, name, init, .. } => {
                let value = match init {
                    Some(expr) => {
                        let evaluated = self.eval_expr(frame, expr)?;
                        value::coerce_to(evaluated, *ty)
                    }
                    None => value::default_for(*ty),
                };
                frame.declare(*name, value);
                Ok(ControlFlow::Normal)
            }
            Stmt::Block { statements, .. } => {
                frame.push_layer();
                let result = self.exec_block(frame, statements);
                frame.pop_layer();
                result
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval_expr(frame, condition)?.is_truthy() {
                    self.exec_stmt(frame, then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(frame, else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }
            Stmt::While { condition, body, .. } => {
                while self.eval_expr(frame, condition)?.is_truthy() {
                    match self.exec_stmt(frame, body)? {
                        ControlFlow::Normal => {}
                        returned => return Ok(returned),
                    }
                }
                Ok(ControlFlow::Normal)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                frame.push_layer();
                if let Some(init) = init {
                    self.exec_stmt(frame, init)?;
                }
                let outcome = self.run_for_loop(frame, condition.as_ref(), update.as_ref(), body);
                frame.pop_layer();
                outcome
            }
            Stmt::Return { value, .. } => {
                let result = match value {
                    Some(expr) => self.eval_expr(frame, expr)?,
                    None => Value::Void,
                };
                Ok(ControlFlow::Returned(result))
            }
            Stmt::FuncDecl { .. } | Stmt::ClassDecl { .. } | Stmt::Include { .. } | Stmt::UsingNamespace { .. } => {
                Ok(ControlFlow::Normal)
            }
        }
    }

    fn run_for_loop(
        &mut self,
        frame: &mut Frame,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Result<ControlFlow, RuntimeError> {
        loop {
            let continue_looping = match condition {
                Some(cond) => self.eval_expr(frame, cond)?.is_truthy(),
                None => true,
            };
            if !continue_looping {
                return Ok(ControlFlow::Normal);
            }
            match self.exec_stmt(frame, body)? {
                ControlFlow::Normal => {}
                returned => return Ok(returned),
            }
            if let Some(update) = update {
                self.eval_expr(frame, update)?;
            }
        }
    }

    fn eval_expr(&mut self, frame: &mut Frame, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value, .. } => Ok(literal_value(value)),
            Expr::Identifier { name, .. } => self.lookup(frame, *name),
            Expr::StdOut { .. } => Ok(Value::Ostream),
            Expr::Binary { op, left, right, span } => self.eval_binary(frame, *op, left, right, *span),
            Expr::Unary { op, operand, span } => {
                let value = self.eval_expr(frame, operand)?;
                apply_unary(*op, value, *span)
            }
            Expr::PreIncDec { op, operand, span } => self.eval_incdec(frame, *op, operand, *span, true),
            Expr::PostIncDec { op, operand, span } => self.eval_incdec(frame, *op, operand, *span, false),
            Expr::Call { callee, args, span } => self.eval_call(frame, *callee, args, *span),
            Expr::Assign { target, value, .. } => {
                let evaluated = self.eval_expr(frame, value)?;
                let existing = frame.get(*target);
                let stored = match &existing {
                    Some(old) => value::coerce_like(old, evaluated),
                    None => evaluated,
                };
                if !frame.set(*target, stored.clone()) {
                    return Err(RuntimeError::Unsupported {
                        detail: format!("cannot assign to undeclared name '{}'", target.as_str()),
                    });
                }
                Ok(stored)
            }
        }
    }

    /// Bare `cout`/`endl` resolve as built-ins once they clear semantic
    /// analysis's `seed_globals` — they never occupy a frame slot, so
    /// frame lookup falling through to here is the expected path, not a
    /// fallback for a mistake.
    fn lookup(&self, frame: &Frame, name: Symbol) -> Result<Value, RuntimeError> {
        if let Some(value) = frame.get(name) {
            return Ok(value);
        }
        match name.as_str() {
            "cout" => Ok(Value::Ostream),
            "endl" => Ok(Value::Str("\n".to_string())),
            other => Err(RuntimeError::Unsupported {
                detail: format!("'{other}' is not defined"),
            }),
        }
    }

    fn eval_binary(
        &mut self,
        frame: &mut Frame,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And => {
                let lhs = self.eval_expr(frame, left)?;
                if !lhs.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_expr(frame, right)?.is_truthy()))
            }
            BinOp::Or => {
                let lhs = self.eval_expr(frame, left)?;
                if lhs.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_expr(frame, right)?.is_truthy()))
            }
            BinOp::Shl => {
                let lhs = self.eval_expr(frame, left)?;
                if matches!(lhs, Value::Ostream) {
                    let rhs = self.eval_expr(frame, right)?;
                    self.output.push_str(&rhs.to_string());
                    Ok(Value::Ostream)
                } else {
                    let rhs = self.eval_expr(frame, right)?;
                    Ok(Value::Int(lhs.as_i64() << (rhs.as_i64() & 63)))
                }
            }
            _ => {
                let lhs = self.eval_expr(frame, left)?;
                let rhs = self.eval_expr(frame, right)?;
                value::apply_binary(op, lhs, rhs, span)
            }
        }
    }

    fn eval_incdec(
        &mut self,
        frame: &mut Frame,
        op: IncDecOp,
        operand: &Expr,
        span: Span,
        is_pre: bool,
    ) -> Result<Value, RuntimeError> {
        let Expr::Identifier { name, .. } = operand else {
            return Err(RuntimeError::Unsupported {
                detail: format!("increment/decrement target must be a variable at line {}", span.line),
            });
        };
        let old = frame.get(*name).ok_or_else(|| RuntimeError::Unsupported {
            detail: format!("'{}' is not defined", name.as_str()),
        })?;
        let step = match op {
            IncDecOp::Inc => value::apply_binary(BinOp::Add, old.clone(), Value::Int(1), span)?,
            IncDecOp::Dec => value::apply_binary(BinOp::Sub, old.clone(), Value::Int(1), span)?,
        };
        let new_value = value::coerce_like(&old, step);
        frame.set(*name, new_value.clone());
        Ok(if is_pre { new_value } else { old })
    }

    fn eval_call(&mut self, frame: &mut Frame, callee: Symbol, args: &[Expr], span: Span) -> Result<Value, RuntimeError> {
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(frame, arg)?);
        }
        let func = *self.functions.get(&callee).ok_or_else(|| RuntimeError::Unsupported {
            detail: format!("call to undefined function '{}' at line {}", callee.as_str(), span.line),
        })?;
        self.call_function(func, arg_values)
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        // The grammar has one floating-literal token; an unsuffixed
        // floating constant defaults to `double`, matching the source
        // language's own literal rule.
        Literal::Float(f) => Value::Double(*f),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Char(c) => Value::Char(*c),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Endl => Value::Str("\n".to_string()),
        Literal::Null => Value::Int(0),
    }
}

fn apply_unary(op: UnOp, value: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnOp::Neg => match value {
            Value::Int(i) => Ok(Value::Int(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Double(d) => Ok(Value::Double(-d)),
            Value::Char(c) => Ok(Value::Int(-(c as i64))),
            _ => Err(RuntimeError::Unsupported {
                detail: format!("unary '-' on a non-numeric value at line {}", span.line),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppi_lex::tokenize;
    use cppi_par::parse;

    fn run_source(source: &str) -> RunOutcome {
        let tokens = tokenize(source);
        let program = parse(tokens).expect("fixture source must parse");
        run(&program)
    }

    #[test]
    fn hello_world_prints_and_exits_zero() {
        let outcome = run_source(
            r#"#include <iostream>
using namespace std;
int main(){ cout << "Hello, World!" << endl; return 0; }"#,
        );
        assert_eq!(outcome.exit_code, Ok(0));
        assert_eq!(outcome.output, "Hello, World!\n");
    }

    #[test]
    fn arithmetic_and_chained_insertion() {
        let outcome = run_source("int main(){ int x=10; int y=20; cout << (x+y) << endl; return 0; }");
        assert_eq!(outcome.exit_code, Ok(0));
        assert_eq!(outcome.output, "30\n");
    }

    #[test]
    fn function_call_returns_a_value() {
        let outcome =
            run_source("int add(int a,int b){ return a+b; } int main(){ cout << add(5,3) << endl; return 0; }");
        assert_eq!(outcome.exit_code, Ok(0));
        assert_eq!(outcome.output, "8\n");
    }

    #[test]
    fn for_loop_accumulates_output_across_iterations() {
        let outcome =
            run_source("int main(){ for(int i=1;i<=3;i=i+1){ cout << i << \" \"; } cout << endl; return 0; }");
        assert_eq!(outcome.exit_code, Ok(0));
        assert_eq!(outcome.output, "1 2 3 \n");
    }

    #[test]
    fn if_else_early_return_short_circuits_the_function_body() {
        let outcome = run_source("int main(){ if (2>1) return 7; else return 9; }");
        assert_eq!(outcome.exit_code, Ok(7));
        assert_eq!(outcome.output, "");
    }

    #[test]
    fn missing_main_is_a_runtime_error() {
        let outcome = run_source("int helper(){ return 1; }");
        assert_eq!(outcome.exit_code, Err(RuntimeError::MissingMain));
    }

    #[test]
    fn falling_off_the_end_of_main_defaults_to_exit_code_zero() {
        let outcome = run_source("int main(){ int x = 5; }");
        assert_eq!(outcome.exit_code, Ok(0));
    }

    #[test]
    fn block_scoped_variable_does_not_leak_past_its_block() {
        let outcome = run_source(
            "int main(){ int x = 1; { int x = 2; cout << x; } cout << x; return 0; }",
        );
        assert_eq!(outcome.output, "21");
    }

    #[test]
    fn pre_and_post_increment_differ_in_the_value_they_yield() {
        let outcome = run_source("int main(){ int x = 5; cout << x++ << x << ++x; return 0; }");
        assert_eq!(outcome.output, "567");
    }

    #[test]
    fn division_by_zero_surfaces_as_a_runtime_error() {
        let outcome = run_source("int main(){ int x = 1; int y = 0; cout << (x/y); return 0; }");
        assert!(matches!(outcome.exit_code, Err(RuntimeError::DivisionByZero { .. })));
    }

    #[test]
    fn logical_or_short_circuits_and_never_evaluates_the_right_side() {
        let outcome = run_source("int main(){ int x = 1; if (x == 1 || (1/0) == 0) { cout << \"ok\"; } return 0; }");
        assert_eq!(outcome.exit_code, Ok(0));
        assert_eq!(outcome.output, "ok");
    }
}

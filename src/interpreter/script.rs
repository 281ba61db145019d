//! Sandboxed evaluator for the dynamic-language subset
//!
//! Walks the AST produced by [`crate::parser`] and records a capture point
//! after the statements a learner is asked to predict:
//!
//! - a declaration with an initializer (`let total = 0;`)
//! - a `console.log(...)` call statement
//! - a bare call of a named function (`greet();`)
//!
//! Every capture deep-copies the visible bindings (globals overlaid with the
//! locals of the innermost call), the simulated call stack and the output so
//! far. After a run that completes, one more capture marks the final state at
//! the last source line.
//!
//! # Sandbox
//!
//! Nothing escapes the evaluator: `console.log` appends to the captured output,
//! there is no I/O, no globals beyond `Math` and `console`, and no dynamic code
//! loading. Runaway loops are stopped by a step budget and runaway recursion by
//! a call depth limit.
//!
//! # Scoping
//!
//! Scoping is per function: blocks do not open scopes. Assigning to a name that
//! was never declared creates a global, as sloppy-mode scripts do.
//!
//! `undefined` has no JSON form, so it is a missing value (a `None` slot): a
//! name holding it stays declared but is left out of captured bindings, and
//! `console.log` prints it as `undefined`.

use crate::config::SimulationConfig;
use crate::interpreter::builtins;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::{apply_binary, apply_unary};
use crate::interpreter::SimulationRun;
use crate::memory::value::{self, Value};
use crate::memory::Bindings;
use crate::parser::ast::{BinOp, DeclKind, Expr, Stmt};
use crate::parser::parse_program;
use crate::snapshot::TraceAccumulator;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::{debug, warn};

/// An evaluated expression; `None` is `undefined`
type Slot = Option<Value>;

/// How a statement finished
#[derive(Debug)]
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Slot),
}

/// Why execution stopped early
#[derive(Debug)]
enum Interrupt {
    Fault(RuntimeError),
    /// Step budget exhausted; not a failure
    Budget,
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Fault(err)
    }
}

type Exec<T> = Result<T, Interrupt>;

/// A user-defined function
#[derive(Debug)]
struct FunctionDef {
    params: Vec<String>,
    body: Vec<Stmt>,
}

/// Locals of one active user function call
#[derive(Debug, Default)]
struct Scope {
    locals: Bindings,
    consts: FxHashSet<String>,
    /// Declared names currently holding `undefined`
    unset: FxHashSet<String>,
}

impl Scope {
    fn declares(&self, name: &str) -> bool {
        self.locals.contains(name) || self.unset.contains(name)
    }
}

/// Runs one dynamic-subset snippet.
///
/// Like [`crate::interpreter::CStepper`], a runner owns all of its state and is
/// consumed by [`ScriptRunner::run`].
pub struct ScriptRunner<'a> {
    source: &'a str,
    globals: Bindings,
    global_consts: FxHashSet<String>,
    global_unset: FxHashSet<String>,
    scopes: Vec<Scope>,
    functions: FxHashMap<String, Rc<FunctionDef>>,
    recorder: TraceAccumulator,

    /// Statements and loop iterations executed so far
    steps: usize,
    /// Loops enclosing the current statement within the current function
    loop_depth: usize,

    step_budget: usize,
    max_call_depth: usize,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(source: &'a str, config: &SimulationConfig) -> Self {
        ScriptRunner {
            source,
            globals: Bindings::new(),
            global_consts: FxHashSet::default(),
            global_unset: FxHashSet::default(),
            scopes: Vec::new(),
            functions: FxHashMap::default(),
            recorder: TraceAccumulator::new(),
            steps: 0,
            loop_depth: 0,
            step_budget: config.script_step_budget,
            max_call_depth: config.max_call_depth,
        }
    }

    /// Execute the snippet; faults end the run but keep what was captured
    pub fn run(mut self) -> SimulationRun {
        let program = match parse_program(self.source) {
            Ok(program) => program,
            Err(err) => {
                let err = RuntimeError::from(err);
                warn!(error = %err, "snippet did not parse");
                return SimulationRun {
                    error: Some(err.to_string()),
                    ..SimulationRun::default()
                };
            }
        };

        self.hoist(&program.statements);

        let (error, truncated) = match self.exec_block(&program.statements) {
            Ok(_) => {
                let last_line = self.source.lines().count().max(1);
                self.capture(last_line, "Final state".to_string());
                (None, false)
            }
            Err(Interrupt::Budget) => {
                warn!(budget = self.step_budget, "step budget exhausted, returning partial trace");
                (None, true)
            }
            Err(Interrupt::Fault(err)) => {
                warn!(line = err.line(), error = %err, "live execution faulted");
                (Some(err.to_string()), false)
            }
        };

        let (trace, output) = self.recorder.finish();
        debug!(snapshots = trace.len(), outputs = output.len(), "dynamic run finished");

        SimulationRun {
            trace,
            output,
            error,
            truncated,
        }
    }

    fn hoist(&mut self, body: &[Stmt]) {
        for stmt in body {
            if let Stmt::Function {
                name, params, body, ..
            } = stmt
            {
                self.define_function(name, params, body);
            }
        }
    }

    fn define_function(&mut self, name: &str, params: &[String], body: &[Stmt]) {
        self.functions.insert(
            name.to_string(),
            Rc::new(FunctionDef {
                params: params.to_vec(),
                body: body.to_vec(),
            }),
        );
    }

    fn tick(&mut self) -> Exec<()> {
        self.steps += 1;
        if self.steps > self.step_budget {
            return Err(Interrupt::Budget);
        }
        Ok(())
    }

    fn exec_block(&mut self, body: &[Stmt]) -> Exec<Flow> {
        for stmt in body {
            match self.exec_stmt(stmt, true)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute one statement; `instrument` enables its capture point
    fn exec_stmt(&mut self, stmt: &Stmt, instrument: bool) -> Exec<Flow> {
        self.tick()?;
        let line = stmt.location().line;

        match stmt {
            Stmt::VarDecl {
                kind, name, init, ..
            } => {
                let initial = match init {
                    Some(expr) => self.evaluate(expr, line)?,
                    None => None,
                };
                self.declare(*kind, name, initial);
                if instrument && init.is_some() {
                    self.capture(line, format!("Line {}: Variable {} assigned", line, name));
                }
            }
            Stmt::Assign {
                target, op, value, ..
            } => {
                let rhs = self.evaluate(value, line)?;
                let new_value = match op {
                    Some(op) => {
                        let current = self.lookup(target, line)?;
                        Some(combine(*op, &current, &rhs, line)?)
                    }
                    None => rhs,
                };
                self.assign(target, new_value, line)?;
            }
            Stmt::Update { target, delta, .. } => {
                let current = self.lookup(target, line)?;
                let updated = combine(BinOp::Add, &current, &Some(value::int(*delta)), line)?;
                self.assign(target, Some(updated), line)?;
            }
            Stmt::Expression { expr, .. } => {
                self.evaluate(expr, line)?;
                if instrument {
                    if let Some(note) = call_capture_note(expr) {
                        self.capture(line, format!("Line {}: {}", line, note));
                    }
                }
            }
            Stmt::Block { body, .. } => return self.exec_block(body),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let test = self.evaluate(condition, line)?;
                if is_truthy(&test) {
                    return self.exec_block(then_branch);
                }
                if let Some(else_branch) = else_branch {
                    return self.exec_block(else_branch);
                }
            }
            Stmt::While {
                condition, body, ..
            } => return self.exec_loop(Some(condition), None, body, line),
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.exec_stmt(init, false)?;
                }
                return self.exec_loop(condition.as_ref(), update.as_deref(), body, line);
            }
            Stmt::Function {
                name, params, body, ..
            } => {
                if !self.functions.contains_key(name) {
                    self.define_function(name, params, body);
                }
            }
            Stmt::Return { value, .. } => {
                if self.scopes.is_empty() {
                    return Err(unsupported("Illegal return statement", line));
                }
                let result = match value {
                    Some(expr) => self.evaluate(expr, line)?,
                    None => None,
                };
                return Ok(Flow::Return(result));
            }
            Stmt::Break { .. } => {
                if self.loop_depth == 0 {
                    return Err(unsupported("Illegal break statement", line));
                }
                return Ok(Flow::Break);
            }
            Stmt::Continue { .. } => {
                if self.loop_depth == 0 {
                    return Err(unsupported("Illegal continue statement", line));
                }
                return Ok(Flow::Continue);
            }
        }

        Ok(Flow::Normal)
    }

    fn exec_loop(
        &mut self,
        condition: Option<&Expr>,
        update: Option<&Stmt>,
        body: &[Stmt],
        line: usize,
    ) -> Exec<Flow> {
        self.loop_depth += 1;
        let result = self.loop_iterations(condition, update, body, line);
        self.loop_depth -= 1;
        result
    }

    fn loop_iterations(
        &mut self,
        condition: Option<&Expr>,
        update: Option<&Stmt>,
        body: &[Stmt],
        line: usize,
    ) -> Exec<Flow> {
        loop {
            self.tick()?;
            if let Some(condition) = condition {
                if !is_truthy(&self.evaluate(condition, line)?) {
                    break;
                }
            }

            match self.exec_block(body)? {
                Flow::Break => break,
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Normal | Flow::Continue => {}
            }

            if let Some(update) = update {
                self.exec_stmt(update, false)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, line: usize) -> Exec<Slot> {
        match expr {
            Expr::Literal(v) => Ok(Some(v.clone())),
            Expr::Ident(name) => Ok(self.lookup(name, line)?),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(or_null(&self.evaluate(element, line)?));
                }
                Ok(Some(Value::Array(items)))
            }
            Expr::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, field) in fields {
                    if let Some(v) = self.evaluate(field, line)? {
                        map.insert(key.clone(), v);
                    }
                }
                Ok(Some(Value::Object(map)))
            }
            Expr::Unary { op, operand } => {
                let operand = self.evaluate(operand, line)?;
                Ok(Some(apply_unary(*op, &or_null(&operand))))
            }
            Expr::Binary { op, left, right } => {
                let left = self.evaluate(left, line)?;
                match op {
                    BinOp::And if !is_truthy(&left) => Ok(left),
                    BinOp::Or if is_truthy(&left) => Ok(left),
                    BinOp::And | BinOp::Or => self.evaluate(right, line),
                    _ => {
                        let right = self.evaluate(right, line)?;
                        Ok(Some(combine(*op, &left, &right, line)?))
                    }
                }
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                let test = self.evaluate(condition, line)?;
                if is_truthy(&test) {
                    self.evaluate(then_expr, line)
                } else {
                    self.evaluate(else_expr, line)
                }
            }
            Expr::Index { target, index } => {
                let target = or_null(&self.evaluate(target, line)?);
                let index = or_null(&self.evaluate(index, line)?);
                Ok(Some(read_index(&target, &index, line)?))
            }
            Expr::Member { target, property } => {
                let target = or_null(&self.evaluate(target, line)?);
                Ok(Some(read_property(&target, property, line)?))
            }
            Expr::Call { callee, args } => self.call(callee, args, line),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], line: usize) -> Exec<Slot> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg, line)?);
        }

        match callee {
            Expr::Ident(name) => self.call_user(name, values, line),
            Expr::Member { target, property } => match target.as_ref() {
                Expr::Ident(object) if object == "console" && property == "log" => {
                    self.recorder.record_output(builtins::format_log_line(&values));
                    Ok(None)
                }
                Expr::Ident(object) if object == "Math" => {
                    let args: Vec<Value> = values.iter().map(or_null).collect();
                    Ok(Some(builtins::call_math(property, &args).ok_or_else(|| {
                        not_callable(format!("Math.{}", property), line)
                    })?))
                }
                Expr::Ident(object) if property == "push" => {
                    if self.binding(object).is_none() {
                        let err = if self.is_declared(object) {
                            not_callable(format!("{}.push", object), line)
                        } else {
                            undefined(object, line)
                        };
                        return Err(err.into());
                    }
                    let slot = self
                        .binding_mut(object)
                        .ok_or_else(|| undefined(object, line))?;
                    let items = values.into_iter().map(|v| v.unwrap_or(Value::Null)).collect();
                    Ok(Some(builtins::array_push(slot, items).ok_or_else(|| {
                        not_callable(format!("{}.push", object), line)
                    })?))
                }
                _ => {
                    let name = callee.callee_path().unwrap_or_else(|| property.clone());
                    Err(not_callable(name, line).into())
                }
            },
            _ => Err(unsupported("call of a computed callee", line)),
        }
    }

    fn call_user(&mut self, name: &str, args: Vec<Slot>, line: usize) -> Exec<Slot> {
        let Some(function) = self.functions.get(name).cloned() else {
            if self.is_declared(name) {
                return Err(not_callable(name.to_string(), line).into());
            }
            return Err(undefined(name, line).into());
        };

        if self.scopes.len() >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                line,
            }
            .into());
        }

        let mut args = args.into_iter();
        let mut scope = Scope::default();
        for param in &function.params {
            store(&mut scope.locals, &mut scope.unset, param, args.next().flatten());
        }

        self.recorder.push_frame(name, &scope.locals, line);
        self.scopes.push(scope);
        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);

        self.hoist(&function.body);
        let result = self.exec_block(&function.body);

        self.loop_depth = outer_loop_depth;
        self.scopes.pop();
        self.recorder.pop_frame();

        match result? {
            Flow::Return(v) => Ok(v),
            _ => Ok(None),
        }
    }

    fn binding(&self, name: &str) -> Option<&Value> {
        match self.scopes.last() {
            Some(scope) if scope.declares(name) => scope.locals.get(name),
            _ => self.globals.get(name),
        }
    }

    fn binding_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self.scopes.last_mut() {
            Some(scope) if scope.declares(name) => scope.locals.get_mut(name),
            _ => self.globals.get_mut(name),
        }
    }

    /// Bound or declared (possibly holding `undefined`) in the visible scope
    fn is_declared(&self, name: &str) -> bool {
        match self.scopes.last() {
            Some(scope) if scope.declares(name) => true,
            _ => self.globals.contains(name) || self.global_unset.contains(name),
        }
    }

    fn lookup(&self, name: &str, line: usize) -> Result<Slot, RuntimeError> {
        if let Some(v) = self.binding(name) {
            return Ok(Some(v.clone()));
        }
        if name == "undefined" || self.is_declared(name) {
            return Ok(None);
        }
        if self.functions.contains_key(name) || name == "Math" || name == "console" {
            return Err(RuntimeError::Unsupported {
                message: format!("'{}' cannot be used as a value", name),
                line,
            });
        }
        Err(undefined(name, line))
    }

    fn declare(&mut self, kind: DeclKind, name: &str, initial: Slot) {
        let (bindings, consts, unset) = match self.scopes.last_mut() {
            Some(scope) => (&mut scope.locals, &mut scope.consts, &mut scope.unset),
            None => (&mut self.globals, &mut self.global_consts, &mut self.global_unset),
        };
        store(bindings, unset, name, initial);
        if kind == DeclKind::Const {
            consts.insert(name.to_string());
        } else {
            consts.remove(name);
        }
    }

    fn assign(&mut self, name: &str, new_value: Slot, line: usize) -> Result<(), RuntimeError> {
        let is_const = match self.scopes.last() {
            Some(scope) if scope.declares(name) => scope.consts.contains(name),
            _ => self.global_consts.contains(name),
        };
        if is_const {
            return Err(RuntimeError::ConstAssignment {
                name: name.to_string(),
                line,
            });
        }

        match self.scopes.last_mut() {
            Some(scope) if scope.declares(name) => {
                store(&mut scope.locals, &mut scope.unset, name, new_value)
            }
            _ => store(&mut self.globals, &mut self.global_unset, name, new_value),
        }
        Ok(())
    }

    /// Globals overlaid with the locals of the innermost call
    fn visible_bindings(&self) -> Bindings {
        let mut visible = self.globals.clone();
        if let Some(scope) = self.scopes.last() {
            for name in &scope.unset {
                visible.remove(name);
            }
            visible.extend_from(&scope.locals);
        }
        visible
    }

    fn capture(&mut self, line: usize, note: String) {
        let visible = self.visible_bindings();
        self.recorder.commit(line, &visible, None, Some(note));
    }
}

/// Bind a defined value, or mark the name as holding `undefined`
fn store(bindings: &mut Bindings, unset: &mut FxHashSet<String>, name: &str, slot: Slot) {
    match slot {
        Some(v) => {
            unset.remove(name);
            bindings.set(name, v);
        }
        None => {
            bindings.remove(name);
            unset.insert(name.to_string());
        }
    }
}

fn or_null(slot: &Slot) -> Value {
    slot.clone().unwrap_or(Value::Null)
}

fn is_truthy(slot: &Slot) -> bool {
    slot.as_ref().is_some_and(value::is_truthy)
}

/// Binary operator over slots; `undefined` joins strings by name and acts as
/// `null` everywhere else
fn combine(op: BinOp, left: &Slot, right: &Slot, line: usize) -> Result<Value, RuntimeError> {
    match (op, left, right) {
        (BinOp::Add, None, Some(Value::String(s))) => Ok(Value::String(format!("undefined{}", s))),
        (BinOp::Add, Some(Value::String(s)), None) => Ok(Value::String(format!("{}undefined", s))),
        _ => apply_binary(op, &or_null(left), &or_null(right), line),
    }
}

/// Capture note for an instrumented call statement
fn call_capture_note(expr: &Expr) -> Option<&'static str> {
    let Expr::Call { callee, .. } = expr else {
        return None;
    };
    match callee.as_ref() {
        Expr::Ident(_) => Some("Function called"),
        _ if callee.callee_path().as_deref() == Some("console.log") => Some("Output logged"),
        _ => None,
    }
}

pub(crate) fn read_index(target: &Value, index: &Value, line: usize) -> Result<Value, RuntimeError> {
    match target {
        Value::Array(items) => Ok(value::as_int(index)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null)),
        Value::String(s) => Ok(value::as_int(index)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        Value::Object(_) => read_property(target, &value::display_value(index), line),
        Value::Null => Err(RuntimeError::TypeError {
            message: format!(
                "Cannot read properties of null (reading '{}')",
                value::display_value(index)
            ),
            line,
        }),
        _ => Ok(Value::Null),
    }
}

pub(crate) fn read_property(target: &Value, property: &str, line: usize) -> Result<Value, RuntimeError> {
    if property == "length" {
        if let Some(length) = builtins::length_of(target) {
            return Ok(length);
        }
    }
    match target {
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        Value::Null => Err(RuntimeError::TypeError {
            message: format!("Cannot read properties of null (reading '{}')", property),
            line,
        }),
        _ => Ok(Value::Null),
    }
}

fn undefined(name: &str, line: usize) -> RuntimeError {
    RuntimeError::UndefinedVariable {
        name: name.to_string(),
        line,
    }
}

fn not_callable(name: String, line: usize) -> RuntimeError {
    RuntimeError::NotCallable { name, line }
}

fn unsupported(message: &str, line: usize) -> Interrupt {
    Interrupt::Fault(RuntimeError::Unsupported {
        message: message.to_string(),
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(source: &str) -> SimulationRun {
        ScriptRunner::new(source, &SimulationConfig::default()).run()
    }

    #[test]
    fn test_captures_declarations_and_logs() {
        let result = run("let a = 2;\nlet b = a * 3;\nconsole.log(\"b is\", b);\n");
        assert!(result.error.is_none());
        assert_eq!(result.output, vec!["b is 6"]);

        let notes: Vec<_> = result.trace.iter().filter_map(|s| s.note.as_deref()).collect();
        assert_eq!(
            notes,
            vec![
                "Line 1: Variable a assigned",
                "Line 2: Variable b assigned",
                "Line 3: Output logged",
                "Final state",
            ]
        );
        assert_eq!(result.trace[3].source_line, 3);
        assert_eq!(result.trace[2].emitted, vec!["b is 6"]);
        assert!(result.trace[0].emitted.is_empty());
    }

    #[test]
    fn test_loops_and_compound_assignment() {
        let result = run(
            "let total = 0;\nfor (let i = 1; i <= 4; i++) {\n  if (i === 3) continue;\n  total += i;\n}\nconsole.log(total);\n",
        );
        assert_eq!(result.output, vec!["7"]);
        let last = result.trace.last().unwrap();
        assert_eq!(last.bindings.get("total"), Some(&json!(7)));
        assert_eq!(last.bindings.get("i"), Some(&json!(5)));
    }

    #[test]
    fn test_function_call_pushes_frame() {
        let source = "function show(n) {\n  console.log(n * 2);\n}\nshow(21);\n";
        let result = run(source);
        assert_eq!(result.output, vec!["42"]);

        let inside = &result.trace[0];
        assert_eq!(inside.note.as_deref(), Some("Line 2: Output logged"));
        assert_eq!(inside.call_stack.len(), 1);
        assert_eq!(inside.call_stack[0].name, "show");
        assert_eq!(inside.call_stack[0].source_line, 4);
        assert_eq!(inside.bindings.get("n"), Some(&json!(21)));

        let after = &result.trace[1];
        assert_eq!(after.note.as_deref(), Some("Line 4: Function called"));
        assert!(after.call_stack.is_empty());
        assert!(after.bindings.get("n").is_none());
    }

    #[test]
    fn test_recursion() {
        let source = "function fact(n) {\n  return n <= 1 ? 1 : n * fact(n - 1);\n}\nconst r = fact(5);\n";
        let result = run(source);
        assert!(result.error.is_none());
        assert_eq!(result.trace[0].bindings.get("r"), Some(&json!(120)));
    }

    #[test]
    fn test_fault_keeps_partial_trace() {
        let result = run("let a = 1;\nconsole.log(a);\nlet b = missing + 1;\nlet c = 3;\n");
        assert_eq!(
            result.error.as_deref(),
            Some("ReferenceError: missing is not defined (line 3)")
        );
        assert_eq!(result.trace.len(), 2);
        assert_eq!(result.output, vec!["1"]);
    }

    #[test]
    fn test_const_reassignment_faults() {
        let result = run("const k = 1;\nk = 2;\n");
        assert!(result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Assignment to constant")));
    }

    #[test]
    fn test_step_budget_truncates() {
        let config = SimulationConfig {
            script_step_budget: 200,
            ..SimulationConfig::default()
        };
        let result = ScriptRunner::new("let n = 0;\nwhile (true) {\n  n++;\n}\n", &config).run();
        assert!(result.truncated);
        assert!(result.error.is_none());
        assert_eq!(result.trace.len(), 1);
    }

    #[test]
    fn test_call_depth_limit() {
        let result = run("function f(n) {\n  return f(n + 1);\n}\nf(0);\n");
        assert!(result
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("RangeError")));
    }

    #[test]
    fn test_arrays_and_objects() {
        let result = run(
            "let xs = [1, 2];\nxs.push(3);\nlet p = {x: xs.length, y: xs[0]};\nconsole.log(xs, p);\n",
        );
        assert_eq!(result.output, vec!["[1,2,3] {\"x\":3,\"y\":1}"]);
        let last = result.trace.last().unwrap();
        assert_eq!(last.bindings.get("p"), Some(&json!({"x": 3, "y": 1})));
    }

    #[test]
    fn test_undefined_prints_and_stays_out_of_bindings() {
        let source = "let x;\nconsole.log(x);\nfunction noop(a) {\n}\nlet r = noop(1);\nconsole.log(r, \"n=\" + x, x === undefined);\nx = 5;\nconsole.log(x);\n";
        let result = run(source);
        assert!(result.error.is_none(), "{:?}", result.error);
        assert_eq!(result.output, vec!["undefined", "undefined n=undefined true", "5"]);

        assert!(result.trace[0].bindings.get("x").is_none());
        let declared = &result.trace[1];
        assert_eq!(declared.note.as_deref(), Some("Line 5: Variable r assigned"));
        assert!(declared.bindings.get("r").is_none());
        assert_eq!(result.trace.last().unwrap().bindings.get("x"), Some(&json!(5)));
    }

    #[test]
    fn test_missing_argument_is_undefined_and_shadows_global() {
        let source = "let b = 2;\nfunction show(a, b) {\n  console.log(a, b);\n}\nshow(1);\n";
        let result = run(source);
        assert_eq!(result.output, vec!["1 undefined"]);

        let inside = &result.trace[1];
        assert_eq!(inside.call_stack[0].bindings.get("a"), Some(&json!(1)));
        assert!(inside.call_stack[0].bindings.get("b").is_none());
        assert!(inside.bindings.get("b").is_none());
        assert_eq!(result.trace.last().unwrap().bindings.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_syntax_error_reports_failure() {
        let result = run("let f = (x) => x;\n");
        assert!(result.error.is_some());
        assert!(result.trace.is_empty());
    }
}

//! Statement matcher for the C-like subset
//!
//! Each source line is classified by trying a fixed list of recognizers in
//! priority order and taking the first match. Every recognizer is anchored to
//! the whole trimmed line (a trailing `// comment` after the terminator is
//! tolerated), so `for (int i = 0; ...)` never looks like a declaration and
//! `int* p = &x;` is not an integer declaration.
//!
//! # Recognized shapes (priority order)
//!
//! 1. blank, comment, `#include`, `using ...` lines → [`Statement::NoOp`]
//! 2. `int x = 5;` (also `long`, `short`) → [`Statement::Declare`]
//! 3. `x = 7;` where `x` is bound → [`Statement::Assign`]
//! 4. `x++;` where `x` is bound → [`Statement::Increment`]
//! 5. `x += y;` where both are bound → [`Statement::AddAssign`]
//! 6. `while (x <= 5) {` → [`Statement::WhileHead`]
//! 7. `}` → [`Statement::CloseBrace`]
//! 8. `cout << ... ;` → [`Statement::Output`]
//! 9. `[int] r = factorial(5);` → [`Statement::FactorialCall`]
//! 10. anything else → [`Statement::Unrecognized`]

use crate::interpreter::constants::{C_DECL_KEYWORDS, FACTORIAL_CALLEE};
use crate::memory::value::{self, Value};
use crate::memory::Bindings;
use std::fmt;
use unscanny::Scanner;

/// One classified line
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    NoOp,
    Declare { name: String, value: i64 },
    Assign { name: String, value: i64 },
    Increment { name: String },
    AddAssign { target: String, operand: String },
    WhileHead(LoopCondition),
    CloseBrace,
    /// Output text with bound names already substituted
    Output { text: String },
    FactorialCall { target: String, argument: i64 },
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn holds(self, left: f64, right: f64) -> bool {
        match self {
            CmpOp::Lt => left < right,
            CmpOp::Le => left <= right,
            CmpOp::Gt => left > right,
            CmpOp::Ge => left >= right,
        }
    }
}

/// Single-condition loop guard `<variable> <op> <limit>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopCondition {
    pub variable: String,
    pub op: CmpOp,
    pub limit: i64,
}

impl LoopCondition {
    /// Parse a `while (x < 10) {` head line
    pub fn parse(line: &str) -> Option<Self> {
        let mut s = LineScanner::new(line);
        s.keyword("while")?;
        s.punct('(')?;
        let variable = s.identifier()?;
        let op = s.comparison()?;
        let limit = s.integer()?;
        s.punct(')')?;
        s.punct('{')?;
        s.end()?;
        Some(Self { variable, op, limit })
    }

    /// Current value of the guarded variable; unbound or non-numeric reads as 0
    pub fn current_value(&self, bindings: &Bindings) -> Value {
        bindings
            .get(&self.variable)
            .filter(|v| v.is_number())
            .cloned()
            .unwrap_or_else(|| value::int(0))
    }

    pub fn evaluate(&self, bindings: &Bindings) -> bool {
        let current = value::as_number(&self.current_value(bindings)).unwrap_or(0.0);
        self.op.holds(current, self.limit as f64)
    }

    /// Textual form recorded on the snapshot, e.g. `while (i <= 5)`
    pub fn render(&self) -> String {
        format!("while ({} {} {})", self.variable, self.op.symbol(), self.limit)
    }
}

impl fmt::Display for LoopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Classify one source line against the current bindings
pub fn classify(line: &str, bindings: &Bindings) -> Statement {
    let trimmed = line.trim();

    if is_noop(trimmed) {
        return Statement::NoOp;
    }
    if let Some((name, value)) = match_declaration(trimmed) {
        return Statement::Declare { name, value };
    }
    if let Some((name, value)) = match_assignment(trimmed) {
        if bindings.contains(&name) {
            return Statement::Assign { name, value };
        }
    }
    if let Some(name) = match_increment(trimmed) {
        if bindings.contains(&name) {
            return Statement::Increment { name };
        }
    }
    if let Some((target, operand)) = match_add_assign(trimmed) {
        if bindings.contains(&target) && bindings.contains(&operand) {
            return Statement::AddAssign { target, operand };
        }
    }
    if let Some(condition) = LoopCondition::parse(trimmed) {
        return Statement::WhileHead(condition);
    }
    if trimmed == "}" {
        return Statement::CloseBrace;
    }
    if let Some(args) = match_output(trimmed) {
        return Statement::Output {
            text: render_output(args, bindings),
        };
    }
    if let Some((target, argument)) = match_factorial_call(trimmed) {
        return Statement::FactorialCall { target, argument };
    }

    Statement::Unrecognized
}

fn is_noop(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with("#include")
        || trimmed.starts_with("using")
}

fn match_declaration(line: &str) -> Option<(String, i64)> {
    let mut s = LineScanner::new(line);
    s.decl_keyword()?;
    let name = s.identifier()?;
    s.punct('=')?;
    let value = s.integer()?;
    s.terminator()?;
    Some((name, value))
}

fn match_assignment(line: &str) -> Option<(String, i64)> {
    let mut s = LineScanner::new(line);
    let name = s.identifier()?;
    s.punct('=')?;
    let value = s.integer()?;
    s.terminator()?;
    Some((name, value))
}

fn match_increment(line: &str) -> Option<String> {
    let mut s = LineScanner::new(line);
    let name = s.identifier()?;
    s.symbol("++")?;
    s.terminator()?;
    Some(name)
}

fn match_add_assign(line: &str) -> Option<(String, String)> {
    let mut s = LineScanner::new(line);
    let target = s.identifier()?;
    s.symbol("+=")?;
    let operand = s.identifier()?;
    s.terminator()?;
    Some((target, operand))
}

/// Text between `cout <<` and the terminating `;`
fn match_output(line: &str) -> Option<&str> {
    let mut s = LineScanner::new(line);
    if s.symbol("std::").is_none() {
        s = LineScanner::new(line);
    }
    s.keyword("cout")?;
    s.symbol("<<")?;

    let start = s.inner.cursor();
    let mut quote = None;
    while let Some(c) = s.inner.peek() {
        match (quote, c) {
            (Some(q), '\\') if q == '"' || q == '\'' => {
                s.inner.eat();
            }
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, ';') => break,
            _ => {}
        }
        s.inner.eat();
    }
    let args = s.inner.from(start);
    s.terminator()?;
    Some(args)
}

fn match_factorial_call(line: &str) -> Option<(String, i64)> {
    let mut s = LineScanner::new(line);
    if s.decl_keyword().is_none() {
        s = LineScanner::new(line);
    }
    let target = s.identifier()?;
    s.punct('=')?;
    let callee = s.identifier()?;
    if callee != FACTORIAL_CALLEE {
        return None;
    }
    s.punct('(')?;
    let argument = s.integer()?;
    s.punct(')')?;
    s.terminator()?;
    Some((target, argument))
}

/// Build the output text for the arguments of a stream-insertion chain.
///
/// Quoted pieces lose their quotes, `endl` pieces are dropped, and bound names
/// are replaced (whole word) by their current value, inside quotes as well.
pub fn render_output(args: &str, bindings: &Bindings) -> String {
    split_insertions(args)
        .into_iter()
        .filter_map(|piece| {
            let piece = piece.trim();
            if piece == "endl" || piece == "std::endl" {
                return None;
            }
            let text = substitute_names(unquote(piece).unwrap_or(piece), bindings);
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split on `<<` outside string and character literals
fn split_insertions(args: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    let mut chars = args.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '<' if matches!(chars.peek(), Some((_, '<'))) => {
                pieces.push(&args[start..i]);
                chars.next();
                start = i + 2;
            }
            _ => {}
        }
    }
    pieces.push(&args[start..]);
    pieces
}

fn unquote(piece: &str) -> Option<&str> {
    let mut chars = piece.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if (first == '"' || first == '\'') && first == last {
        Some(&piece[1..piece.len() - 1])
    } else {
        None
    }
}

/// Replace whole-word occurrences of bound names by their values
fn substitute_names(piece: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(piece.len());
    let mut s = Scanner::new(piece);

    while let Some(c) = s.peek() {
        if is_ident_start(c) {
            let word = s.eat_while(is_ident_continue);
            match bindings.get(word) {
                Some(v) => out.push_str(&value::display_value(v)),
                None => out.push_str(word),
            }
        } else if c.is_ascii_digit() {
            // keeps `x1` style tokens inside numbers from being split
            out.push_str(s.eat_while(is_ident_continue));
        } else {
            out.push(c);
            s.eat();
        }
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whitespace-insensitive token scanner over one trimmed line
struct LineScanner<'a> {
    inner: Scanner<'a>,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            inner: Scanner::new(line),
        }
    }

    fn identifier(&mut self) -> Option<String> {
        self.inner.eat_whitespace();
        if !self.inner.peek().is_some_and(is_ident_start) {
            return None;
        }
        Some(self.inner.eat_while(is_ident_continue).to_string())
    }

    /// A keyword that must not run on into a longer identifier
    fn keyword(&mut self, word: &str) -> Option<()> {
        self.inner.eat_whitespace();
        let start = self.inner.cursor();
        if self.inner.eat_if(word) && !self.inner.peek().is_some_and(is_ident_continue) {
            Some(())
        } else {
            self.inner.jump(start);
            None
        }
    }

    fn decl_keyword(&mut self) -> Option<()> {
        let found = C_DECL_KEYWORDS.iter().any(|kw| self.keyword(kw).is_some());
        if !found {
            return None;
        }
        // the declared name must be separated from the keyword by whitespace
        (!self.inner.eat_whitespace().is_empty()).then_some(())
    }

    /// Optionally negative decimal integer literal
    fn integer(&mut self) -> Option<i64> {
        self.inner.eat_whitespace();
        let start = self.inner.cursor();
        self.inner.eat_if('-');
        if self.inner.eat_while(|c: char| c.is_ascii_digit()).is_empty() {
            return None;
        }
        if self.inner.peek().is_some_and(is_ident_continue) || self.inner.peek() == Some('.') {
            return None;
        }
        self.inner.from(start).parse().ok()
    }

    fn comparison(&mut self) -> Option<CmpOp> {
        self.inner.eat_whitespace();
        let op = if self.inner.eat_if("<=") {
            CmpOp::Le
        } else if self.inner.eat_if(">=") {
            CmpOp::Ge
        } else if self.inner.eat_if('<') {
            CmpOp::Lt
        } else if self.inner.eat_if('>') {
            CmpOp::Gt
        } else {
            return None;
        };
        Some(op)
    }

    fn punct(&mut self, c: char) -> Option<()> {
        self.inner.eat_whitespace();
        self.inner.eat_if(c).then_some(())
    }

    fn symbol(&mut self, text: &str) -> Option<()> {
        self.inner.eat_whitespace();
        self.inner.eat_if(text).then_some(())
    }

    /// Nothing but whitespace or a line comment left
    fn end(&mut self) -> Option<()> {
        self.inner.eat_whitespace();
        (self.inner.done() || self.inner.after().starts_with("//")).then_some(())
    }

    fn terminator(&mut self) -> Option<()> {
        self.punct(';')?;
        self.end()
    }
}

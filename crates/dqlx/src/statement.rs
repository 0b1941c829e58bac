//! Query text with explicit argument slots.
//!
//! Every compiled fragment is a [`Statement`]: a run of text pieces interleaved
//! with argument slots. Slots are only turned into text at the very end, either
//! as `$N` variable references ([`crate::operation`]) or as inlined literals
//! ([`crate::mutation`]). Because slots are structural, the number of
//! placeholders in the output always equals the number of bound arguments, and
//! user data that happens to contain the placeholder sentinel is never rewritten.
use crate::value::Value;
use std::fmt::{self, Display, Formatter};

/// Sentinel used when a statement is displayed with unresolved slots.
pub const PLACEHOLDER: &str = "??";

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Arg(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    parts: Vec<Part>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut statement = Self::new();
        statement.push_str(text);
        statement
    }

    pub fn push_str(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(Part::Text(last)) => last.push_str(&text),
            _ => self.parts.push(Part::Text(text)),
        }
    }

    /// Appends one argument slot.
    pub fn push_arg(&mut self, value: impl Into<Value>) {
        self.parts.push(Part::Arg(value.into()));
    }

    pub fn append(&mut self, other: Statement) {
        for part in other.parts {
            match part {
                Part::Text(text) => self.push_str(text),
                Part::Arg(value) => self.parts.push(Part::Arg(value)),
            }
        }
    }

    /// True when the statement produces no text and binds nothing.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Arguments in the order their slots appear in the text.
    pub fn args(&self) -> Vec<&Value> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Arg(value) => Some(value),
                Part::Text(_) => None,
            })
            .collect()
    }

    pub fn arg_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, Part::Arg(_)))
            .count()
    }

    /// Joins statements with `separator`, skipping empty ones.
    pub fn join(statements: impl IntoIterator<Item = Statement>, separator: &str) -> Statement {
        let mut joined = Statement::new();
        let mut first = true;
        for statement in statements.into_iter().filter(|s| !s.is_empty()) {
            if !first {
                joined.push_str(separator);
            }
            joined.append(statement);
            first = false;
        }
        joined
    }

    /// Wraps a non-empty statement in `open` / `close`.
    pub fn wrap(self, open: &str, close: &str) -> Statement {
        if self.is_empty() {
            return self;
        }
        let mut wrapped = Statement::text(open);
        wrapped.append(self);
        wrapped.push_str(close);
        wrapped
    }

    /// Renders the text, asking `slot` for the text of each argument slot.
    /// `slot` receives the zero-based slot index and the bound value.
    pub fn render<F>(&self, mut slot: F) -> String
    where
        F: FnMut(usize, &Value) -> String,
    {
        let mut out = String::new();
        let mut index = 0;
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Arg(value) => {
                    out.push_str(&slot(index, value));
                    index += 1;
                }
            }
        }
        out
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, _| PLACEHOLDER.to_string()))
    }
}

/// Anything that compiles to a DQL fragment on its own.
pub trait ToDql {
    fn to_dql(&self) -> crate::DqlResult<Statement>;
}

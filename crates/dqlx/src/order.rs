//! Pagination and ordering clauses.
use crate::error::{DqlError, DqlResult};
use crate::escape::escape_predicate;
use crate::expression::Expression;
use crate::statement::{Statement, ToDql};

/// `first`, `offset` and `after` of a block. Zero / empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub first: i64,
    pub offset: u64,
    pub after: String,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(mut self, first: i64) -> Self {
        self.first = first;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.after = after.into();
        self
    }

    pub fn wants_pagination(&self) -> bool {
        self.first != 0 || self.offset != 0 || !self.after.is_empty()
    }
}

impl ToDql for Cursor {
    fn to_dql(&self) -> DqlResult<Statement> {
        let mut clauses = Vec::new();
        if self.first != 0 {
            let mut clause = Statement::text("first:");
            clause.push_arg(self.first);
            clauses.push(clause);
        }
        if self.offset != 0 {
            let mut clause = Statement::text("offset:");
            clause.push_arg(self.offset);
            clauses.push(clause);
        }
        if !self.after.is_empty() {
            let mut clause = Statement::text("after:");
            clause.push_arg(self.after.as_str());
            clauses.push(clause);
        }
        Ok(Statement::join(clauses, ","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "orderasc",
            Direction::Desc => "orderdesc",
        }
    }
}

/// What a block is sorted by.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    Predicate(String),
    /// Only `val(..)` is accepted here.
    Expr(Expression),
}

impl From<&str> for OrderKey {
    fn from(predicate: &str) -> Self {
        OrderKey::Predicate(predicate.to_string())
    }
}

impl From<String> for OrderKey {
    fn from(predicate: String) -> Self {
        OrderKey::Predicate(predicate)
    }
}

impl From<Expression> for OrderKey {
    fn from(expr: Expression) -> Self {
        OrderKey::Expr(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub direction: Direction,
    pub key: OrderKey,
}

impl OrderBy {
    pub fn asc(key: impl Into<OrderKey>) -> Self {
        Self {
            direction: Direction::Asc,
            key: key.into(),
        }
    }

    pub fn desc(key: impl Into<OrderKey>) -> Self {
        Self {
            direction: Direction::Desc,
            key: key.into(),
        }
    }
}

impl ToDql for OrderBy {
    fn to_dql(&self) -> DqlResult<Statement> {
        let key = match &self.key {
            OrderKey::Predicate(predicate) => {
                let predicate = escape_predicate(predicate);
                if predicate.is_empty() {
                    return Err(DqlError::malformed(self.direction.keyword(), "empty predicate"));
                }
                Statement::text(predicate)
            }
            OrderKey::Expr(expr) if expr.is_val() => expr.to_dql()?,
            OrderKey::Expr(expr) => {
                return Err(DqlError::mismatch(
                    self.direction.keyword(),
                    "a predicate or val(..)",
                    expr.name(),
                ))
            }
        };
        Ok(key.wrap(&format!("{}: ", self.direction.keyword()), ""))
    }
}

#[cfg(test)]
mod order_tests {
    use super::*;
    use crate::expression::{count, val};
    use pretty_assertions::assert_eq;

    #[test]
    fn only_set_cursor_fields_emit_clauses() {
        assert!(!Cursor::new().wants_pagination());
        assert!(Cursor::new().to_dql().unwrap().is_empty());

        let cursor = Cursor::new().first(10).after("0x2a");
        assert!(cursor.wants_pagination());
        let statement = cursor.to_dql().unwrap();
        assert_eq!(statement.to_string(), "first:??,after:??");
        assert_eq!(statement.arg_count(), 2);
    }

    #[test]
    fn order_by_predicate_or_val() {
        assert_eq!(
            OrderBy::asc("name@en").to_dql().unwrap().to_string(),
            "orderasc: name@en"
        );
        assert_eq!(
            OrderBy::desc(val("score")).to_dql().unwrap().to_string(),
            "orderdesc: val(score)"
        );
    }

    #[test]
    fn order_by_other_expressions_is_a_type_mismatch() {
        let err = OrderBy::asc(count("friend")).to_dql().unwrap_err();
        assert!(matches!(err, DqlError::TypeMismatch { .. }));
    }
}

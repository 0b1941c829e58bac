//! Filter expressions and DQL functions.
use crate::error::{DqlError, DqlResult};
use crate::escape::{escape_name, escape_predicate};
use crate::statement::{Statement, ToDql};
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Field → value pairs of a map-keyed filter. Ordered by key, so equal maps
/// always compile to identical text.
pub type FilterMap = BTreeMap<String, Value>;

/// Builds a [`FilterMap`] from `key => value` pairs.
///
/// # Example
/// ```
/// # use dqlx::{filter_map, Expression};
/// let expr = Expression::Eq(filter_map! { "field2" => "value2", "field1" => "value1" });
/// assert_eq!(expr.to_string(), "eq(field1,??) AND eq(field2,??)");
/// ```
#[macro_export]
macro_rules! filter_map {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::expression::FilterMap::new();
        $(map.insert(::std::string::String::from($key), $crate::value::Value::from($value));)*
        map
    }};
}

/// The single operand of `uid(..)`, `val(..)` and the aggregate functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A predicate or DQL variable name, written into the text.
    Predicate(String),
    /// A value bound to an argument slot.
    Value(Value),
    Expr(Box<Expression>),
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        Operand::Predicate(name.to_string())
    }
}

impl From<String> for Operand {
    fn from(name: String) -> Self {
        Operand::Predicate(name)
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Expr(Box::new(expr))
    }
}

impl ToDql for Operand {
    fn to_dql(&self) -> DqlResult<Statement> {
        match self {
            Operand::Predicate(name) => Ok(Statement::text(escape_predicate(name))),
            Operand::Value(value) => value_slots(value),
            Operand::Expr(expr) => expr.to_dql(),
        }
    }
}

/// A DQL filter or function expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Eq(FilterMap),
    Le(FilterMap),
    Lt(FilterMap),
    Ge(FilterMap),
    Gt(FilterMap),
    Has(BTreeSet<String>),
    Type(String),
    AllOfTerms(FilterMap),
    AnyOfTerms(FilterMap),
    Regexp(FilterMap),
    /// Fuzzy match; `distance` is the maximum Levenshtein distance.
    Match { terms: FilterMap, distance: u32 },
    AllOfText(FilterMap),
    AnyOfText(FilterMap),
    Exact(FilterMap),
    Term(FilterMap),
    FullText(FilterMap),
    UidIn(FilterMap),
    Between { predicate: String, from: Value, to: Value },
    Uid(Operand),
    Val(Operand),
    /// Written verbatim, binds nothing.
    Raw(String),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Count(Operand),
    Sum(Operand),
    Avg(Operand),
    Min(Operand),
    Max(Operand),
    Expand(String),
}

impl Expression {
    /// The DQL function name, or the connector for `And`/`Or`/`Not`.
    pub fn name(&self) -> &'static str {
        match self {
            Expression::Eq(_) => "eq",
            Expression::Le(_) => "le",
            Expression::Lt(_) => "lt",
            Expression::Ge(_) => "ge",
            Expression::Gt(_) => "gt",
            Expression::Has(_) => "has",
            Expression::Type(_) => "type",
            Expression::AllOfTerms(_) => "allofterms",
            Expression::AnyOfTerms(_) => "anyofterms",
            Expression::Regexp(_) => "regexp",
            Expression::Match { .. } => "match",
            Expression::AllOfText(_) => "alloftext",
            Expression::AnyOfText(_) => "anyoftext",
            Expression::Exact(_) => "exact",
            Expression::Term(_) => "term",
            Expression::FullText(_) => "fulltext",
            Expression::UidIn(_) => "uid_in",
            Expression::Between { .. } => "between",
            Expression::Uid(_) => "uid",
            Expression::Val(_) => "val",
            Expression::Raw(_) => "raw",
            Expression::And(_) => "AND",
            Expression::Or(_) => "OR",
            Expression::Not(_) => "NOT",
            Expression::Count(_) => "count",
            Expression::Sum(_) => "sum",
            Expression::Avg(_) => "avg",
            Expression::Min(_) => "min",
            Expression::Max(_) => "max",
            Expression::Expand(_) => "expand",
        }
    }

    /// Whether the expression can stand on its own inside `@filter(..)`,
    /// `@facets(..)` or `@if(..)`.
    pub fn is_filter(&self) -> bool {
        !matches!(
            self,
            Expression::Val(_)
                | Expression::Count(_)
                | Expression::Sum(_)
                | Expression::Avg(_)
                | Expression::Min(_)
                | Expression::Max(_)
                | Expression::Expand(_)
        )
    }

    pub fn is_val(&self) -> bool {
        matches!(self, Expression::Val(_))
    }
}

impl ToDql for Expression {
    fn to_dql(&self) -> DqlResult<Statement> {
        let name = self.name();
        match self {
            Expression::Eq(map)
            | Expression::Le(map)
            | Expression::Lt(map)
            | Expression::Ge(map)
            | Expression::Gt(map)
            | Expression::AllOfTerms(map)
            | Expression::AnyOfTerms(map)
            | Expression::Regexp(map)
            | Expression::AllOfText(map)
            | Expression::AnyOfText(map)
            | Expression::Exact(map)
            | Expression::Term(map)
            | Expression::FullText(map)
            | Expression::UidIn(map) => map_functions(name, map, None),
            Expression::Match { terms, distance } => map_functions(name, terms, Some(*distance)),
            Expression::Has(predicates) => {
                let mut statements = Vec::with_capacity(predicates.len());
                for predicate in predicates {
                    let predicate = function_predicate(name, predicate)?;
                    statements.push(Statement::text(format!("has({})", predicate)));
                }
                Ok(Statement::join(statements, " AND "))
            }
            Expression::Type(type_name) => {
                Ok(Statement::text(format!("type({})", escape_name(type_name))))
            }
            Expression::Between {
                predicate,
                from,
                to,
            } => {
                let predicate = function_predicate(name, predicate)?;
                let mut statement = Statement::text(format!("between({},", predicate));
                statement.append(value_slots(from)?);
                statement.push_str(",");
                statement.append(value_slots(to)?);
                statement.push_str(")");
                Ok(statement)
            }
            Expression::Uid(operand)
            | Expression::Val(operand)
            | Expression::Count(operand)
            | Expression::Sum(operand)
            | Expression::Avg(operand)
            | Expression::Min(operand)
            | Expression::Max(operand) => Ok(operand.to_dql()?.wrap(&format!("{}(", name), ")")),
            Expression::Expand(type_name) => {
                Ok(Statement::text(format!("expand({})", escape_name(type_name))))
            }
            Expression::Raw(text) => Ok(Statement::text(text.clone())),
            Expression::And(children) => connect(children, " AND "),
            Expression::Or(children) => connect(children, " OR "),
            Expression::Not(inner) => {
                let inner = inner.to_dql()?;
                Ok(inner.wrap("NOT ", ""))
            }
        }
    }
}

impl std::fmt::Display for Expression {
    /// Shows the compiled fragment with `??` in place of argument slots.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_dql() {
            Ok(statement) => write!(f, "{}", statement),
            Err(err) => write!(f, "<invalid {}: {}>", self.name(), err),
        }
    }
}

/// `fn(<key>,<value>)` per entry, keys in sorted order, joined by ` AND `.
fn map_functions(name: &str, map: &FilterMap, distance: Option<u32>) -> DqlResult<Statement> {
    let mut statements = Vec::with_capacity(map.len());
    for (field, value) in map {
        let field = function_predicate(name, field)?;
        let mut statement = Statement::text(format!("{}({},", name, field));
        statement.append(value_slots(value)?);
        if let Some(distance) = distance {
            statement.push_str(format!(",{}", distance));
        }
        statement.push_str(")");
        statements.push(statement);
    }
    Ok(Statement::join(statements, " AND "))
}

/// The escaped predicate of a function; rejects names that escape to nothing.
fn function_predicate(function: &str, predicate: &str) -> DqlResult<String> {
    let escaped = escape_predicate(predicate);
    if escaped.is_empty() {
        return Err(DqlError::malformed(function, "empty predicate"));
    }
    Ok(escaped)
}

/// One slot for a scalar, `[slot,slot,..]` for a list, the text itself for a raw value.
pub(crate) fn value_slots(value: &Value) -> DqlResult<Statement> {
    if value.is_list() {
        let items = value.to_list()?;
        let mut statement = Statement::text("[");
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                statement.push_str(",");
            }
            match item {
                Value::Raw(text) => statement.push_str(text),
                Value::List(_) => {
                    return Err(DqlError::mismatch("list operand", "a scalar element", "list"))
                }
                other => statement.push_arg(bindable(other)?),
            }
        }
        statement.push_str("]");
        return Ok(statement);
    }

    match value {
        Value::Raw(text) => Ok(Statement::text(text.clone())),
        other => {
            let mut statement = Statement::new();
            statement.push_arg(bindable(other.clone())?);
            Ok(statement)
        }
    }
}

/// Dgraph has no literal for NaN or the infinities.
fn bindable(value: Value) -> DqlResult<Value> {
    match value {
        Value::Float(f) if !f.is_finite() => {
            Err(DqlError::malformed("float operand", format!("{} is not finite", f)))
        }
        other => Ok(other),
    }
}

fn connect(children: &[Expression], separator: &str) -> DqlResult<Statement> {
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        parts.push(child.to_dql()?);
    }
    Ok(Statement::join(parts, separator).wrap("(", ")"))
}

/// Rejects expressions that cannot appear where a filter is expected.
pub(crate) fn ensure_filter(expr: &Expression, context: &str) -> DqlResult<()> {
    if expr.is_filter() {
        Ok(())
    } else {
        Err(DqlError::mismatch(context, "a filter expression", expr.name()))
    }
}

// --- Helper functions for building expressions --- //

fn single(field: impl Into<String>, value: impl Into<Value>) -> FilterMap {
    let mut map = FilterMap::new();
    map.insert(field.into(), value.into());
    map
}

macro_rules! map_filter_fns {
    ($($(#[$doc:meta])* $fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $fn_name(field: impl Into<String>, value: impl Into<Value>) -> Expression {
                Expression::$variant(single(field, value))
            }
        )*
    };
}

map_filter_fns! {
    /// `eq(field, value)`
    eq => Eq,
    /// `le(field, value)`
    le => Le,
    /// `lt(field, value)`
    lt => Lt,
    /// `ge(field, value)`
    ge => Ge,
    /// `gt(field, value)`
    gt => Gt,
    allofterms => AllOfTerms,
    anyofterms => AnyOfTerms,
    /// `regexp(field, pattern)`
    regexp => Regexp,
    alloftext => AllOfText,
    anyoftext => AnyOfText,
    exact => Exact,
    term => Term,
    fulltext => FullText,
    /// `uid_in(field, uid)`
    uid_in => UidIn,
}

/// `match(field, value, distance)`
pub fn match_(field: impl Into<String>, value: impl Into<Value>, distance: u32) -> Expression {
    Expression::Match {
        terms: single(field, value),
        distance,
    }
}

/// `has(predicate)`
pub fn has(predicate: impl Into<String>) -> Expression {
    Expression::Has(BTreeSet::from([predicate.into()]))
}

/// `type(Name)`
pub fn type_(name: impl Into<String>) -> Expression {
    Expression::Type(name.into())
}

/// `between(predicate, from, to)`
pub fn between(
    predicate: impl Into<String>,
    from: impl Into<Value>,
    to: impl Into<Value>,
) -> Expression {
    Expression::Between {
        predicate: predicate.into(),
        from: from.into(),
        to: to.into(),
    }
}

/// `uid(value)` where the uid, or list of uids, is bound as an argument.
pub fn uid(value: impl Into<Value>) -> Expression {
    Expression::Uid(Operand::Value(value.into()))
}

/// `uid(variable)` for uids bound to a DQL variable elsewhere in the request.
pub fn uid_of(variable: impl Into<String>) -> Expression {
    Expression::Uid(Operand::Predicate(variable.into()))
}

/// `val(variable)`
pub fn val(variable: impl Into<String>) -> Expression {
    Expression::Val(Operand::Predicate(variable.into()))
}

pub fn raw(text: impl Into<String>) -> Expression {
    Expression::Raw(text.into())
}

pub fn and(children: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::And(children.into_iter().collect())
}

pub fn or(children: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::Or(children.into_iter().collect())
}

pub fn not(inner: Expression) -> Expression {
    Expression::Not(Box::new(inner))
}

pub fn count(operand: impl Into<Operand>) -> Expression {
    Expression::Count(operand.into())
}

pub fn sum(operand: impl Into<Operand>) -> Expression {
    Expression::Sum(operand.into())
}

pub fn avg(operand: impl Into<Operand>) -> Expression {
    Expression::Avg(operand.into())
}

pub fn min(operand: impl Into<Operand>) -> Expression {
    Expression::Min(operand.into())
}

pub fn max(operand: impl Into<Operand>) -> Expression {
    Expression::Max(operand.into())
}

/// `expand(Type)`; use `_all_` for every predicate of the node's types.
pub fn expand(type_name: impl Into<String>) -> Expression {
    Expression::Expand(type_name.into())
}

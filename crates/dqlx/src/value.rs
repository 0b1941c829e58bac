//! Native values bound to query placeholders.
use crate::error::{DqlError, DqlResult};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, Utc};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// A value carried by an argument slot.
///
/// The variant is what drives the declared DQL type of the query variable the
/// value is bound to, so integers of every width collapse into `Int`/`UInt` and
/// both float widths into `Float`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<FixedOffset>),
    /// Anything else that only knows how to display itself. Declared as `string`.
    Other(String),
    /// A list operand. `None` is a nil list, `Some(vec![])` an empty one;
    /// both compile to `[]` without arguments.
    List(Option<Vec<Value>>),
    /// Emitted verbatim, never bound to a variable (e.g. a reference to a
    /// previously bound DQL variable).
    Raw(String),
}

/// Scalar types usable in a query parameter declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DqlType {
    String,
    Int,
    Float,
    Bool,
    DateTime,
}

impl DqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DqlType::String => "string",
            DqlType::Int => "int",
            DqlType::Float => "float",
            DqlType::Bool => "bool",
            DqlType::DateTime => "datetime",
        }
    }
}

impl Display for DqlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// A value that is written into the query text as-is.
    pub fn raw(text: impl Into<String>) -> Self {
        Value::Raw(text.into())
    }

    /// Reference to a DQL variable bound elsewhere in the request (`x as ...`).
    pub fn var(name: impl Into<String>) -> Self {
        Value::Raw(name.into())
    }

    /// Fallback for types without a dedicated variant.
    pub fn display(value: impl Display) -> Self {
        Value::Other(value.to_string())
    }

    pub fn nil_list() -> Self {
        Value::List(None)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Value::Raw(_))
    }

    /// Flattens a list operand into its elements. A nil list yields no elements.
    pub(crate) fn to_list(&self) -> DqlResult<Vec<Value>> {
        match self {
            Value::List(Some(items)) => Ok(items.clone()),
            Value::List(None) => Ok(Vec::new()),
            other => Err(DqlError::NotAList(other.kind().to_string())),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::Other(_) => "other",
            Value::List(_) => "list",
            Value::Raw(_) => "raw",
        }
    }

    /// The DQL type a query variable holding this value is declared with.
    pub fn dql_type(&self) -> DqlType {
        match self {
            Value::String(_) => DqlType::String,
            Value::Int(_) | Value::UInt(_) => DqlType::Int,
            Value::Float(_) => DqlType::Float,
            Value::Bool(_) => DqlType::Bool,
            Value::DateTime(_) => DqlType::DateTime,
            Value::Other(_) | Value::List(_) | Value::Raw(_) => DqlType::String,
        }
    }

    /// String form used for the variables map. Timestamps are RFC3339.
    pub fn format(&self) -> String {
        match self {
            Value::String(s) | Value::Other(s) | Value::Raw(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            Value::List(items) => format!(
                "[{}]",
                items.iter().flatten().map(Value::format).join(" ")
            ),
        }
    }

    /// Literal form used when a value is inlined into the query text instead
    /// of being bound to a variable. Textual values become quoted, escaped
    /// string literals.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Bool(_) | Value::Raw(_) => {
                self.format()
            }
            Value::List(items) => format!(
                "[{}]",
                items.iter().flatten().map(Value::to_literal).join(",")
            ),
            Value::String(_) | Value::Other(_) | Value::DateTime(_) => {
                serde_json::Value::String(self.format()).to_string()
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

// --- Conversions --- //

macro_rules! impl_from_for_value {
    ($variant:ident, $into:ty, $($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::$variant(value as $into)
            }
        })*
    };
}

impl_from_for_value!(Int, i64, i8, i16, i32, i64, isize);
impl_from_for_value!(UInt, u64, u8, u16, u32, u64, usize);
impl_from_for_value!(Float, f64, f32, f64);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl From<DateTime<Local>> for Value {
    fn from(dt: DateTime<Local>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(items: Vec<T>) -> Self {
        Value::List(Some(items.into_iter().map(Into::into).collect()))
    }
}

impl<T> From<Option<Vec<T>>> for Value
where
    T: Into<Value>,
{
    fn from(items: Option<Vec<T>>) -> Self {
        Value::List(items.map(|items| items.into_iter().map(Into::into).collect()))
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(items: [T; N]) -> Self {
        Value::List(Some(items.into_iter().map(Into::into).collect()))
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(items: &[T]) -> Self {
        Value::List(Some(items.iter().cloned().map(Into::into).collect()))
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn integer_widths_declare_int() {
        assert_eq!(Value::from(3u8).dql_type(), DqlType::Int);
        assert_eq!(Value::from(-3i16).dql_type(), DqlType::Int);
        assert_eq!(Value::from(3usize).dql_type(), DqlType::Int);
        assert_eq!(Value::from(1.5f32).dql_type(), DqlType::Float);
    }

    #[test]
    fn timestamps_format_as_rfc3339() {
        let dt = Utc.with_ymd_and_hms(1982, 6, 25, 0, 0, 0).unwrap();
        assert_eq!(Value::from(dt).format(), "1982-06-25T00:00:00Z");
    }

    #[test]
    fn literals_quote_text() {
        assert_eq!(Value::from("say \"hi\"").to_literal(), r#""say \"hi\"""#);
        assert_eq!(Value::from(10).to_literal(), "10");
        assert_eq!(Value::from(true).to_literal(), "true");
    }

    #[test]
    fn nil_and_empty_lists_flatten_to_nothing() {
        let nil: Option<Vec<i32>> = None;
        assert_eq!(Value::from(nil).to_list().unwrap(), Vec::<Value>::new());
        assert_eq!(
            Value::from(Vec::<i32>::new()).to_list().unwrap(),
            Vec::<Value>::new()
        );
        assert!(matches!(
            Value::from(1).to_list(),
            Err(DqlError::NotAList(_))
        ));
    }
}

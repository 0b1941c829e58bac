//! Fluent, injection-safe query and mutation compiler for Dgraph DQL.
//!
//! Builders describe query blocks; [`compile`] turns them into query text in
//! which every user supplied value is replaced by a typed query variable
//! (`$0`, `$1`, ..), together with the variable map to send along.

pub mod builder;
pub mod edge;
pub mod error;
pub mod escape;
pub mod expression;
pub mod format;
pub mod mutation;
pub mod operation;
pub mod order;
pub mod selection;
pub mod statement;
pub mod value;

pub use error::{DqlError, DqlResult};
pub use expression::{Expression, FilterMap};
pub use format::minify;
pub use operation::{compile, CompiledQuery};
pub use statement::{Statement, ToDql};
pub use value::{DqlType, Value};

pub mod prelude {
    pub use super::builder::{query, query_type, variable, Part, QueryBuilder, ROOT_QUERY};
    pub use super::edge::{edge_path, parse_edge_path, Facet};
    pub use super::error::{DqlError, DqlResult};
    pub use super::expression::{
        allofterms, alloftext, and, anyofterms, anyoftext, avg, between, count, eq, exact, expand,
        fulltext, ge, gt, has, le, lt, match_, max, min, not, or, raw, regexp, sum, term, type_,
        uid, uid_in, uid_of, val, Expression, FilterMap, Operand,
    };
    pub use super::format::minify;
    pub use super::mutation::{compile_condition, CompiledMutation, Mutation};
    pub use super::operation::{compile, CompiledQuery};
    pub use super::order::{Cursor, Direction, OrderBy, OrderKey};
    pub use super::selection::{Selection, SelectionItem};
    pub use super::statement::{Statement, ToDql};
    pub use super::value::{DqlType, Value};
    pub use crate::filter_map;
}

#[cfg(test)]
mod tests;

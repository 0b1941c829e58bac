//! Mutations and upsert conditions.
use crate::builder::QueryBuilder;
use crate::error::DqlResult;
use crate::expression::{ensure_filter, Expression};
use crate::operation::{compile as compile_query, CompiledQuery};
use crate::statement::{Statement, ToDql};
use derive_getters::Getters;
use serde::Serialize;
use tracing::{instrument, trace};

/// Compiles `filters` into an `@if(..) ` guard with every value inlined as a
/// literal. Returns an empty string when no filter produces any text.
pub fn compile_condition(filters: &[Expression]) -> DqlResult<String> {
    let mut statements = Vec::with_capacity(filters.len());
    for filter in filters {
        ensure_filter(filter, "@if")?;
        statements.push(filter.to_dql()?);
    }

    let condition = Statement::join(statements, " AND ");
    if condition.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(
        "@if({}) ",
        condition.render(|_, value| value.to_literal())
    ))
}

/// A set and/or delete mutation, optionally guarded by an upsert query and
/// condition.
///
/// ```
/// use dqlx::prelude::*;
/// use serde_json::json;
///
/// let mutation = Mutation::new()
///     .query(variable(eq("email", "wrong_email@dgraph.io")).as_("u"))
///     .condition(eq("len(u)", 1))
///     .set(json!({ "uid": "uid(u)", "email": "correct_email@dgraph.io" }))
///     .unwrap();
///
/// let compiled = mutation.compile().unwrap();
/// assert_eq!(compiled.condition().as_deref(), Some("@if(eq(len(u),1)) "));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    /// Payloads are serialized eagerly so struct field order survives.
    set: Option<String>,
    delete: Option<String>,
    condition: Vec<Expression>,
    query: Option<QueryBuilder>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data to insert or update.
    pub fn set(mut self, data: impl Serialize) -> DqlResult<Self> {
        self.set = Some(serde_json::to_string(&data)?);
        Ok(self)
    }

    /// Data to delete.
    pub fn delete(mut self, data: impl Serialize) -> DqlResult<Self> {
        self.delete = Some(serde_json::to_string(&data)?);
        Ok(self)
    }

    /// Adds a filter to the `@if(..)` guard. Filters are combined with `AND`.
    pub fn condition(mut self, filter: Expression) -> Self {
        self.condition.push(filter);
        self
    }

    /// The query block of an upsert.
    pub fn query(mut self, query: QueryBuilder) -> Self {
        self.query = Some(query);
        self
    }

    #[instrument(name = "dqlx.compile_mutation", skip_all, err)]
    pub fn compile(&self) -> DqlResult<CompiledMutation> {
        let query = match &self.query {
            Some(query) => Some(compile_query(std::slice::from_ref(query))?),
            None => None,
        };

        let condition = compile_condition(&self.condition)?;
        let condition = (!condition.is_empty()).then_some(condition);

        let set_json = self.set.clone();
        let delete_json = self.delete.clone();

        trace!(
            upsert = query.is_some(),
            condition = condition.as_deref().unwrap_or_default(),
            "compiled mutation"
        );

        Ok(CompiledMutation {
            query,
            condition,
            set_json,
            delete_json,
        })
    }
}

#[derive(Getters, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CompiledMutation {
    query: Option<CompiledQuery>,
    condition: Option<String>,
    set_json: Option<String>,
    delete_json: Option<String>,
}

#[cfg(test)]
mod mutation_tests {
    use super::*;
    use crate::expression::{and, eq, gt, val};
    use crate::DqlError;
    use pretty_assertions::assert_eq;

    #[test]
    fn condition_inlines_quoted_literals() {
        let condition =
            compile_condition(&[eq("name", "Jane \"J\" Doe"), and([gt("age", 30)])]).unwrap();
        assert_eq!(condition, r#"@if(eq(name,"Jane \"J\" Doe") AND (gt(age,30))) "#);
    }

    #[test]
    fn empty_condition_compiles_to_nothing() {
        assert_eq!(compile_condition(&[]).unwrap(), "");
        assert_eq!(compile_condition(&[and([])]).unwrap(), "");
    }

    #[test]
    fn val_is_not_a_condition() {
        let err = compile_condition(&[val("n")]).unwrap_err();
        assert!(matches!(err, DqlError::TypeMismatch { .. }));
    }

    #[test]
    fn plain_set_mutation() {
        let compiled = Mutation::new()
            .set(serde_json::json!({ "name": "Alice" }))
            .unwrap()
            .compile()
            .unwrap();

        assert_eq!(compiled.query(), &None);
        assert_eq!(compiled.condition(), &None);
        assert_eq!(compiled.set_json().as_deref(), Some(r#"{"name":"Alice"}"#));
        assert_eq!(compiled.delete_json(), &None);
    }

    #[derive(Serialize)]
    struct Film {
        uid: &'static str,
        name: &'static str,
        director: &'static str,
    }

    #[test]
    fn set_keeps_struct_field_order() {
        let compiled = Mutation::new()
            .set(Film {
                uid: "_:film",
                name: "Blade Runner",
                director: "_:scott",
            })
            .unwrap()
            .compile()
            .unwrap();

        assert_eq!(
            compiled.set_json().as_deref(),
            Some(r#"{"uid":"_:film","name":"Blade Runner","director":"_:scott"}"#)
        );
    }
}

//! Query blocks.
use crate::error::{DqlError, DqlResult};
use crate::escape::{escape_name, escape_predicate};
use crate::expression::{ensure_filter, Expression};
use crate::order::{Cursor, OrderBy};
use crate::selection::Node;
use crate::statement::{Statement, ToDql};
use std::collections::BTreeMap;

/// Separator between the segments of an edge path.
pub const EDGE_TRAVERSAL: &str = "->";

/// Parent path → child blocks, in registration order.
pub type EdgeRegistry = BTreeMap<String, Vec<Edge>>;

pub fn edge_path<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(EDGE_TRAVERSAL)
}

pub fn parse_edge_path(path: &str) -> Vec<String> {
    path.split(EDGE_TRAVERSAL).map(str::to_string).collect()
}

/// Joins two paths, treating an empty side as absent.
pub(crate) fn join_path(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}{}{}", base, EDGE_TRAVERSAL, path),
    }
}

/// Everything but the last segment of `path`.
pub(crate) fn parent_path(path: &str) -> &str {
    match path.rfind(EDGE_TRAVERSAL) {
        Some(index) => &path[..index],
        None => "",
    }
}

/// A facet request on an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    /// Plain `@facets`.
    All,
    /// A facet key; all keys of one edge share a single `@facets(..)`.
    Predicate(String),
    /// A facet filter such as `eq(close, true)`.
    Expr(Expression),
}

impl From<&str> for Facet {
    fn from(predicate: &str) -> Self {
        Facet::Predicate(predicate.to_string())
    }
}

impl From<String> for Facet {
    fn from(predicate: String) -> Self {
        Facet::Predicate(predicate)
    }
}

impl From<Expression> for Facet {
    fn from(expr: Expression) -> Self {
        Facet::Expr(expr)
    }
}

/// One query block, either at the root of the query or nested in another block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edge {
    /// Full edge path; only the last segment is written.
    pub name: String,
    /// DQL variable the block is bound to (`alias as name`).
    pub alias: String,
    pub root_filter: Option<Expression>,
    pub filters: Vec<Expression>,
    pub pagination: Cursor,
    pub order: Vec<OrderBy>,
    pub group: Vec<String>,
    pub facets: Vec<Facet>,
    /// `Some(vec![])` is a bare `@cascade`.
    pub cascade: Option<Vec<String>>,
    pub is_root: bool,
    pub is_variable: bool,
    pub node: Node,
}

impl Edge {
    pub fn root(name: impl Into<String>, root_filter: Expression) -> Self {
        Self {
            name: name.into(),
            root_filter: Some(root_filter),
            is_root: true,
            ..Default::default()
        }
    }

    /// A nested block at `path`; its children are registered under the same path.
    pub fn nested(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            node: Node::new(path.clone()),
            name: path,
            ..Default::default()
        }
    }

    pub fn relative_name(&self) -> &str {
        self.name
            .rsplit(EDGE_TRAVERSAL)
            .next()
            .unwrap_or_default()
            .trim()
    }

    pub fn to_dql(&self, registry: &EdgeRegistry) -> DqlResult<Statement> {
        let mut statement = self.label()?;
        statement.append(self.parameters()?);

        let directives = Statement::join(
            [
                self.facets_clause()?,
                self.filter_clause()?,
                self.group_clause(),
                self.cascade_clause(),
            ],
            " ",
        );
        statement.append(directives.wrap(" ", ""));

        statement.push_str(" { ");
        statement.append(self.node.to_dql(registry)?);
        statement.push_str(" }");
        Ok(statement)
    }

    fn label(&self) -> DqlResult<Statement> {
        let alias = escape_name(&self.alias);
        let label = if self.is_variable {
            "var".to_string()
        } else {
            let name = escape_predicate(self.relative_name());
            if name.is_empty() {
                return Err(DqlError::malformed(&self.name, "empty block name"));
            }
            name
        };

        if alias.is_empty() {
            Ok(Statement::text(label))
        } else {
            Ok(Statement::text(format!("{} as {}", alias, label)))
        }
    }

    /// `(func: ..,first:..,orderasc: ..)` for root blocks, `(first:..,orderasc: ..)`
    /// for nested ones.
    fn parameters(&self) -> DqlResult<Statement> {
        let mut parameters = Vec::new();
        if self.is_root {
            match &self.root_filter {
                Some(filter) => parameters.push(filter.to_dql()?.wrap("func: ", "")),
                None => {
                    return Err(DqlError::malformed(
                        &self.name,
                        "root block without a root function",
                    ))
                }
            }
        }
        if self.pagination.wants_pagination() {
            parameters.push(self.pagination.to_dql()?);
        }
        for order in &self.order {
            parameters.push(order.to_dql()?);
        }
        Ok(Statement::join(parameters, ",").wrap("(", ")"))
    }

    fn facets_clause(&self) -> DqlResult<Statement> {
        let mut clauses = Vec::new();
        if self.facets.iter().any(|facet| matches!(facet, Facet::All)) {
            clauses.push(Statement::text("@facets"));
        }

        let keys: Vec<String> = self
            .facets
            .iter()
            .filter_map(|facet| match facet {
                Facet::Predicate(key) => Some(escape_predicate(key)),
                _ => None,
            })
            .filter(|key| !key.is_empty())
            .collect();
        if !keys.is_empty() {
            clauses.push(Statement::text(format!("@facets({})", keys.join(","))));
        }

        for facet in &self.facets {
            if let Facet::Expr(expr) = facet {
                ensure_filter(expr, "@facets")?;
                clauses.push(expr.to_dql()?.wrap("@facets(", ")"));
            }
        }
        Ok(Statement::join(clauses, " "))
    }

    fn filter_clause(&self) -> DqlResult<Statement> {
        let mut filters = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            ensure_filter(filter, "@filter")?;
            filters.push(filter.to_dql()?);
        }
        Ok(Statement::join(filters, " AND ").wrap("@filter(", ")"))
    }

    fn group_clause(&self) -> Statement {
        let group: Vec<String> = self
            .group
            .iter()
            .map(|predicate| escape_predicate(predicate))
            .filter(|predicate| !predicate.is_empty())
            .collect();
        if group.is_empty() {
            Statement::new()
        } else {
            Statement::text(format!("@groupby({})", group.join(",")))
        }
    }

    fn cascade_clause(&self) -> Statement {
        match &self.cascade {
            None => Statement::new(),
            Some(fields) if fields.is_empty() => Statement::text("@cascade"),
            Some(fields) => Statement::text(format!(
                "@cascade({})",
                fields
                    .iter()
                    .map(|field| escape_predicate(field))
                    .collect::<Vec<_>>()
                    .join(",")
            )),
        }
    }
}

#[cfg(test)]
mod edge_tests {
    use super::*;
    use crate::expression::{count, eq, has};
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_name_is_last_segment() {
        assert_eq!(Edge::nested("films->starring->actor").relative_name(), "actor");
        assert_eq!(Edge::nested("films").relative_name(), "films");
        assert_eq!(Edge::nested("films->").relative_name(), "");
    }

    #[test]
    fn paths_round_trip() {
        let path = edge_path(&["films", "starring"]);
        assert_eq!(path, "films->starring");
        assert_eq!(parse_edge_path(&path), vec!["films", "starring"]);
        assert_eq!(parent_path("films->starring"), "films");
        assert_eq!(parent_path("films"), "");
        assert_eq!(join_path("", "films"), "films");
    }

    #[test]
    fn empty_relative_name_is_malformed() {
        let err = Edge::nested("films->").to_dql(&EdgeRegistry::new()).unwrap_err();
        assert!(matches!(err, DqlError::MalformedOperand { .. }));
    }

    #[test]
    fn nested_edge_clause_order() {
        let mut edge = Edge::nested("friend");
        edge.alias = "F".to_string();
        edge.pagination = Cursor::new().first(5);
        edge.order.push(OrderBy::asc("name"));
        edge.facets = vec![Facet::from("since"), Facet::from(eq("close", true))];
        edge.filters.push(has("name"));
        edge.cascade = Some(vec![]);
        edge.node.attributes = "uid name".into();

        let statement = edge.to_dql(&EdgeRegistry::new()).unwrap();
        assert_eq!(
            statement.to_string(),
            "F as friend(first:??,orderasc: name) @facets(since) @facets(eq(close,??)) \
             @filter(has(name)) @cascade { uid name }"
        );
        assert_eq!(statement.arg_count(), 2);
    }

    #[test]
    fn aggregate_facet_is_a_type_mismatch() {
        let mut edge = Edge::nested("friend");
        edge.facets.push(Facet::from(count("since")));
        let err = edge.to_dql(&EdgeRegistry::new()).unwrap_err();
        assert!(matches!(err, DqlError::TypeMismatch { .. }));
    }
}

//! Fluent query construction.
//!
//! A [`QueryBuilder`] owns its root block and a registry of every nested block,
//! keyed by the path of the block they are nested in. Builders are plain values:
//! every method consumes the builder and returns the updated one.
//!
//! ```
//! use dqlx::prelude::*;
//!
//! let films = query(eq("name@en", "Blade Runner"))
//!     .name("bladerunner")
//!     .fields("uid name@en initial_release_date")
//!     .edge_fn("starring", |starring| {
//!         starring
//!             .first(10)
//!             .edge_with("performance.actor", [Part::from("name@en")])
//!     });
//!
//! let compiled = compile(&[films]).unwrap();
//! assert!(compiled.text().starts_with("query Bladerunner($0:string, $1:int)"));
//! ```
use crate::edge::{join_path, parent_path, Edge, EdgeRegistry, Facet, EDGE_TRAVERSAL};
use crate::error::DqlResult;
use crate::expression::{type_, Expression};
use crate::order::{Cursor, OrderBy, OrderKey};
use crate::selection::Selection;
use crate::statement::Statement;

/// Name given to blocks that were never named explicitly.
pub const ROOT_QUERY: &str = "rootQuery";

/// Something that can be applied to a block created with
/// [`QueryBuilder::edge_with`].
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Fields(Selection),
    Filter(Expression),
    Pagination(Cursor),
    Order(OrderBy),
    Facet(Facet),
    GroupBy(String),
    Cascade(Vec<String>),
}

impl From<&str> for Part {
    fn from(blob: &str) -> Self {
        Part::Fields(Selection::from(blob))
    }
}

impl From<Selection> for Part {
    fn from(selection: Selection) -> Self {
        Part::Fields(selection)
    }
}

impl From<Expression> for Part {
    fn from(filter: Expression) -> Self {
        Part::Filter(filter)
    }
}

impl From<Cursor> for Part {
    fn from(cursor: Cursor) -> Self {
        Part::Pagination(cursor)
    }
}

impl From<OrderBy> for Part {
    fn from(order: OrderBy) -> Self {
        Part::Order(order)
    }
}

impl From<Facet> for Part {
    fn from(facet: Facet) -> Self {
        Part::Facet(facet)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    root_edge: Edge,
    children: EdgeRegistry,
    variables: Vec<QueryBuilder>,
}

/// Starts a query block rooted at `func: root_filter`.
pub fn query(root_filter: Expression) -> QueryBuilder {
    QueryBuilder::from_edge(Edge::root(ROOT_QUERY, root_filter))
}

/// Starts a query block over every node of the given type.
pub fn query_type(type_name: impl Into<String>) -> QueryBuilder {
    query(type_(type_name))
}

/// Starts a `var(func: ..)` block.
pub fn variable(root_filter: Expression) -> QueryBuilder {
    let mut edge = Edge::root("var", root_filter);
    edge.is_variable = true;
    QueryBuilder::from_edge(edge)
}

impl QueryBuilder {
    fn from_edge(root_edge: Edge) -> Self {
        Self {
            root_edge,
            children: EdgeRegistry::new(),
            variables: Vec::new(),
        }
    }

    pub fn root_edge(&self) -> &Edge {
        &self.root_edge
    }

    pub fn children(&self) -> &EdgeRegistry {
        &self.children
    }

    pub fn variables(&self) -> &[QueryBuilder] {
        &self.variables
    }

    /// The name the block is emitted under.
    pub fn block_name(&self) -> &str {
        self.root_edge.relative_name()
    }

    pub fn is_variable(&self) -> bool {
        self.root_edge.is_variable
    }

    /// Path of the block the builder stands for. Empty for top level blocks.
    fn base_path(&self) -> &str {
        &self.root_edge.node.parent_name
    }

    // --- Root block --- //

    /// Renames the block. Inside [`QueryBuilder::edge_fn`] only the last path
    /// segment changes, so the block stays under its parent.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let parent = parent_path(self.base_path());
        self.root_edge.name = if parent.is_empty() {
            name
        } else {
            format!("{}{}{}", parent, EDGE_TRAVERSAL, name)
        };
        self
    }

    /// Binds the block to a DQL variable: `alias as block(..)`.
    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.root_edge.alias = alias.into();
        self
    }

    /// Replaces the selection with the predicates found in `blob`.
    pub fn fields(self, blob: &str) -> Self {
        self.select(blob)
    }

    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.root_edge.node.attributes = selection.into();
        self
    }

    pub fn filter(mut self, filter: Expression) -> Self {
        self.root_edge.filters.push(filter);
        self
    }

    pub fn paginate(mut self, cursor: Cursor) -> Self {
        self.root_edge.pagination = cursor;
        self
    }

    pub fn first(mut self, first: i64) -> Self {
        self.root_edge.pagination.first = first;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.root_edge.pagination.offset = offset;
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.root_edge.pagination.after = after.into();
        self
    }

    pub fn order_asc(mut self, key: impl Into<OrderKey>) -> Self {
        self.root_edge.order.push(OrderBy::asc(key));
        self
    }

    pub fn order_desc(mut self, key: impl Into<OrderKey>) -> Self {
        self.root_edge.order.push(OrderBy::desc(key));
        self
    }

    pub fn group_by(mut self, predicate: impl Into<String>) -> Self {
        self.root_edge.group.push(predicate.into());
        self
    }

    pub fn facets(mut self, facet: impl Into<Facet>) -> Self {
        self.root_edge.facets.push(facet.into());
        self
    }

    pub fn all_facets(self) -> Self {
        self.facets(Facet::All)
    }

    /// Bare `@cascade`.
    pub fn cascade(mut self) -> Self {
        self.root_edge.cascade = Some(Vec::new());
        self
    }

    /// `@cascade(field, ..)`
    pub fn cascade_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_edge.cascade = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Attaches a block that defines variables this one uses. Attached blocks,
    /// `var(..)` or named, are emitted before the query blocks.
    pub fn with_variable(mut self, variable: QueryBuilder) -> Self {
        self.variables.push(variable);
        self
    }

    // --- Nested blocks --- //

    /// Adds an empty nested block at `path`.
    pub fn edge(self, path: &str) -> Self {
        self.edge_with(path, std::iter::empty::<Part>())
    }

    /// Adds a nested block at `path` and applies `parts` to it.
    pub fn edge_with(mut self, path: &str, parts: impl IntoIterator<Item = Part>) -> Self {
        let full = join_path(self.base_path(), path);
        let mut edge = Edge::nested(full);
        for part in parts {
            match part {
                Part::Fields(selection) => edge.node.attributes = selection,
                Part::Filter(filter) => edge.filters.push(filter),
                Part::Pagination(cursor) => edge.pagination = cursor,
                Part::Order(order) => edge.order.push(order),
                Part::Facet(facet) => edge.facets.push(facet),
                Part::GroupBy(predicate) => edge.group.push(predicate),
                Part::Cascade(fields) => edge.cascade = Some(fields),
            }
        }
        self.register(edge);
        self
    }

    /// Adds a nested block at `path` configured by `f`.
    ///
    /// `f` receives a builder standing for the new block: its root block methods
    /// apply to the nested block and its edge paths are relative to it.
    pub fn edge_fn<F>(mut self, path: &str, f: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let full = join_path(self.base_path(), path);
        let nested = f(QueryBuilder::from_edge(Edge::nested(full)));
        self.merge(nested);
        self
    }

    /// Grafts an independently built query as a nested block at `path`.
    ///
    /// The root function of `other` becomes a filter of the nested block and all
    /// of its nested blocks move along with it.
    pub fn edge_from_query(mut self, path: &str, other: QueryBuilder) -> Self {
        let full = join_path(self.base_path(), path);
        let old_base = other.base_path().to_string();
        let rebase = |path: &str| join_path(&full, relative_to(&old_base, path));

        let QueryBuilder {
            root_edge,
            children,
            variables,
        } = other;

        let mut edge = root_edge;
        edge.name = full.clone();
        edge.node.parent_name = full.clone();
        edge.is_root = false;
        edge.is_variable = false;
        if let Some(root_filter) = edge.root_filter.take() {
            edge.filters.insert(0, root_filter);
        }

        let mut grafted = QueryBuilder::from_edge(edge);
        grafted.variables = variables;
        for (key, edges) in children {
            let rebased = edges
                .into_iter()
                .map(|mut child| {
                    child.name = rebase(&child.name);
                    child.node.parent_name = rebase(&child.node.parent_name);
                    child
                })
                .collect();
            grafted.children.insert(rebase(&key), rebased);
        }

        self.merge(grafted);
        self
    }

    fn register(&mut self, edge: Edge) {
        let parent = parent_path(&edge.name).to_string();
        self.children.entry(parent).or_default().push(edge);
    }

    /// Takes over the blocks of a builder produced for a nested block.
    fn merge(&mut self, nested: QueryBuilder) {
        let QueryBuilder {
            root_edge,
            children,
            variables,
        } = nested;

        self.register(root_edge);
        for (key, edges) in children {
            self.children.entry(key).or_default().extend(edges);
        }
        self.variables.extend(variables);
    }

    /// Compiles the root block and every nested block into one statement.
    pub fn to_dql(&self) -> DqlResult<Statement> {
        self.root_edge.to_dql(&self.children)
    }
}

/// `path` with the `base` prefix removed.
fn relative_to<'a>(base: &str, path: &'a str) -> &'a str {
    if base.is_empty() {
        return path;
    }
    if path == base {
        return "";
    }
    path.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix(EDGE_TRAVERSAL))
        .unwrap_or(path)
}

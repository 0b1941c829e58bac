//! What a block selects: predicates, computed values and nested blocks.
use crate::edge::EdgeRegistry;
use crate::error::DqlResult;
use crate::escape::{escape_name, escape_predicate, parse_predicates};
use crate::expression::Expression;
use crate::statement::{Statement, ToDql};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionItem {
    /// An already escaped predicate, possibly carrying an alias or directive.
    Predicate(String),
    /// `count(friend)`
    Computed(Expression),
    /// `total : count(friend)`
    Aliased { alias: String, expr: Expression },
    /// `n as count(friend)`
    Bound { var: String, expr: Expression },
}

impl ToDql for SelectionItem {
    fn to_dql(&self) -> DqlResult<Statement> {
        match self {
            SelectionItem::Predicate(predicate) => Ok(Statement::text(predicate.clone())),
            SelectionItem::Computed(expr) => expr.to_dql(),
            SelectionItem::Aliased { alias, expr } => {
                Ok(expr.to_dql()?.wrap(&format!("{} : ", escape_name(alias)), ""))
            }
            SelectionItem::Bound { var, expr } => {
                Ok(expr.to_dql()?.wrap(&format!("{} as ", escape_name(var)), ""))
            }
        }
    }
}

/// Ordered list of selection items.
///
/// A string converts by splitting it into predicates, so `"uid name"` and a
/// multi-line blob both work wherever a selection is expected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<SelectionItem>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every predicate found in `blob`.
    pub fn fields(mut self, blob: &str) -> Self {
        self.items
            .extend(parse_predicates(blob).into_iter().map(SelectionItem::Predicate));
        self
    }

    pub fn field(mut self, predicate: &str) -> Self {
        let predicate = escape_predicate(predicate);
        if !predicate.is_empty() {
            self.items.push(SelectionItem::Predicate(predicate));
        }
        self
    }

    pub fn compute(mut self, expr: Expression) -> Self {
        self.items.push(SelectionItem::Computed(expr));
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, expr: Expression) -> Self {
        self.items.push(SelectionItem::Aliased {
            alias: alias.into(),
            expr,
        });
        self
    }

    pub fn bind(mut self, var: impl Into<String>, expr: Expression) -> Self {
        self.items.push(SelectionItem::Bound {
            var: var.into(),
            expr,
        });
        self
    }

    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&str> for Selection {
    fn from(blob: &str) -> Self {
        Selection::new().fields(blob)
    }
}

impl From<String> for Selection {
    fn from(blob: String) -> Self {
        Selection::new().fields(&blob)
    }
}

impl From<Vec<SelectionItem>> for Selection {
    fn from(items: Vec<SelectionItem>) -> Self {
        Selection { items }
    }
}

impl ToDql for Selection {
    fn to_dql(&self) -> DqlResult<Statement> {
        let mut parts = Vec::with_capacity(self.items.len());
        for item in &self.items {
            parts.push(item.to_dql()?);
        }
        Ok(Statement::join(parts, " "))
    }
}

/// The body of a block. Nested blocks are not owned here but looked up in the
/// registry under `parent_name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub attributes: Selection,
    pub parent_name: String,
}

impl Node {
    pub fn new(parent_name: impl Into<String>) -> Self {
        Self {
            attributes: Selection::new(),
            parent_name: parent_name.into(),
        }
    }

    pub fn has_parent_attributes(&self) -> DqlResult<bool> {
        Ok(!self.attributes.to_dql()?.is_empty())
    }

    pub fn to_dql(&self, registry: &EdgeRegistry) -> DqlResult<Statement> {
        let attributes = self.attributes.to_dql()?;

        let mut children = Vec::new();
        if let Some(edges) = registry.get(&self.parent_name) {
            for edge in edges {
                children.push(edge.to_dql(registry)?);
            }
        }

        Ok(Statement::join([attributes, Statement::join(children, " ")], " "))
    }
}

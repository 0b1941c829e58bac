//! Turns builders into a complete, parameterized DQL request.
use crate::builder::QueryBuilder;
use crate::error::DqlResult;
use crate::statement::Statement;
use derive_getters::Getters;
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{instrument, trace};

/// Envelope name used when a request only contains variable blocks.
const FALLBACK_OPERATION_NAME: &str = "Query";

/// A compiled query: the text plus the variables it references.
#[derive(Getters, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    /// `query Name($0:type, ..) { block .. }`
    text: String,
    /// `$N` → the bound value in string form
    variables: BTreeMap<String, String>,
    /// `$N:type` in slot order
    declarations: Vec<String>,
}

impl CompiledQuery {
    pub fn into_parts(self) -> (String, BTreeMap<String, String>) {
        (self.text, self.variables)
    }
}

/// Compiles one or more top level blocks into a single request.
///
/// Variable blocks passed directly and every block attached with
/// [`QueryBuilder::with_variable`] are emitted first, once each. Top level
/// blocks that share a name are renamed `<name>_<index>`, `index` being the
/// position in `builders`.
#[instrument(name = "dqlx.compile", skip_all, fields(blocks = builders.len()), err)]
pub fn compile(builders: &[QueryBuilder]) -> DqlResult<CompiledQuery> {
    let mut variable_blocks = Vec::new();
    for builder in builders {
        collect_variables(builder, &mut variable_blocks);
        if builder.is_variable() && !variable_blocks.contains(builder) {
            variable_blocks.push(builder.clone());
        }
    }

    let mut operations = Vec::new();
    let mut seen: HashSet<String> = variable_blocks
        .iter()
        .filter(|block| !block.is_variable())
        .map(|block| block.block_name().to_string())
        .collect();

    for (index, builder) in builders.iter().enumerate() {
        if builder.is_variable() || variable_blocks.contains(builder) {
            continue;
        }

        let name = builder.block_name().to_string();
        let builder = if seen.insert(name.clone()) {
            builder.clone()
        } else {
            let renamed = format!("{}_{}", name, index);
            seen.insert(renamed.clone());
            builder.clone().name(renamed)
        };
        operations.push(builder);
    }

    let mut blocks = Vec::with_capacity(variable_blocks.len() + operations.len());
    for block in variable_blocks.iter().chain(operations.iter()) {
        blocks.push(block.to_dql()?);
    }
    let body = Statement::join(blocks, " ");

    let mut variables = BTreeMap::new();
    let mut declarations = Vec::with_capacity(body.arg_count());
    let rendered = body.render(|index, value| {
        let key = format!("${}", index);
        declarations.push(format!("{}:{}", key, value.dql_type()));
        variables.insert(key.clone(), value.format());
        key
    });

    let operation_name = operations
        .iter()
        .map(|builder| title_case(builder.block_name()))
        .join("_");
    let operation_name = if operation_name.is_empty() {
        FALLBACK_OPERATION_NAME.to_string()
    } else {
        operation_name
    };

    let text = format!(
        "query {}({}) {{ {} }}",
        operation_name,
        declarations.join(", "),
        rendered
    );
    trace!(query = %text, variables = variables.len(), "compiled query");

    Ok(CompiledQuery {
        text,
        variables,
        declarations,
    })
}

/// Attached blocks, depth first, so a block follows the ones it depends on.
fn collect_variables(builder: &QueryBuilder, into: &mut Vec<QueryBuilder>) {
    for attached in builder.variables() {
        collect_variables(attached, into);
        if !into.contains(attached) {
            into.push(attached.clone());
        }
    }
}

/// Lowercases `name`, then uppercases the first letter of every word. Only
/// letters, digits and `_` survive, so the result is a valid operation name.
pub(crate) fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars().flat_map(char::to_lowercase) {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
        }
        at_word_start = !is_word;
    }
    out
}

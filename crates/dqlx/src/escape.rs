//! Predicate escaping.
//!
//! Turns user supplied field names, aliases and directive blobs into DQL
//! predicate syntax that cannot break out of its position in the query.

/// Characters that are removed from every predicate before it is emitted.
const FORBIDDEN_CHARS: &[char] = &['^', '}', '|', '{', '\\', ',', '<', '>', '"'];

/// Function-like predicates that are emitted without angle brackets.
const PSEUDO_FUNCTIONS: &[&str] = &[
    "expand", "val", "count", "len", "uid", "sum", "avg", "min", "max",
];

/// Removes every forbidden character from `raw`.
pub fn strip_forbidden(raw: &str) -> String {
    raw.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect()
}

/// Escapes a single predicate.
///
/// Understands the forms `name`, `name@lang`, `name @directive(..)`,
/// `alias:name` and `var as name`. Plain identifiers stay bare, anything else is
/// wrapped in angle brackets. Pseudo functions such as `expand(_all_)` are
/// emitted unwrapped.
pub fn escape_predicate(raw: &str) -> String {
    let cleaned = strip_forbidden(raw);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    if let Some((var, rest)) = split_var_binding(cleaned) {
        return format!("{} as {}", escape_name(var), escape_body(rest));
    }

    if let Some((alias, rest)) = split_alias(cleaned) {
        return format!("{} : {}", escape_name(alias), escape_body(rest));
    }

    escape_body(cleaned)
}

/// Escapes a name that must not carry an alias or directive, such as a type
/// name or a DQL variable name.
pub fn escape_name(raw: &str) -> String {
    let cleaned = strip_forbidden(raw);
    let name = cleaned.trim();
    if name.is_empty() || is_bare_identifier(name) {
        name.to_string()
    } else {
        format!("<{}>", name)
    }
}

/// Splits a multi-line field blob into escaped predicates.
///
/// Blank lines are dropped. A line that has no alias, variable binding or call
/// syntax is further split on whitespace, so `"uid name"` yields two predicates.
pub fn parse_predicates(blob: &str) -> Vec<String> {
    blob.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| {
            if is_compound_line(line) {
                vec![line]
            } else {
                line.split_whitespace().collect()
            }
        })
        .map(escape_predicate)
        .filter(|predicate| !predicate.is_empty())
        .collect()
}

fn is_compound_line(line: &str) -> bool {
    line.contains('(') || line.contains(':') || split_var_binding(line).is_some()
}

fn escape_body(body: &str) -> String {
    if is_pseudo_function(body) {
        return body.to_string();
    }

    match body.split_once('@') {
        Some((name, directive)) => {
            let directive = directive.trim();
            let name = escape_name(name);
            if directive.contains('(') {
                format!("{} @{}", name, directive).trim_start().to_string()
            } else {
                format!("{}@{}", name, directive)
            }
        }
        None => escape_name(body),
    }
}

/// `var as predicate`, matched case-insensitively on the first ` as `.
fn split_var_binding(text: &str) -> Option<(&str, &str)> {
    let lower = text.to_ascii_lowercase();
    let index = lower.find(" as ")?;
    let (var, rest) = (&text[..index], &text[index + 4..]);
    if var.trim().is_empty() || rest.trim().is_empty() || var.contains('(') {
        return None;
    }
    Some((var.trim(), rest.trim()))
}

/// `alias:predicate`. A colon that appears after a directive (`name@en:fr`) or
/// inside a call is not an alias separator.
fn split_alias(text: &str) -> Option<(&str, &str)> {
    let index = text.find(':')?;
    let prefix = &text[..index];
    if prefix.contains('@') || prefix.contains('(') {
        return None;
    }
    let rest = &text[index + 1..];
    if prefix.trim().is_empty() || rest.trim().is_empty() {
        return None;
    }
    Some((prefix.trim(), rest.trim()))
}

fn is_pseudo_function(text: &str) -> bool {
    match text.split_once('(') {
        Some((name, _)) => {
            text.ends_with(')') && PSEUDO_FUNCTIONS.contains(&name.trim().to_ascii_lowercase().as_str())
        }
        None => false,
    }
}

/// `~?[A-Za-z_][A-Za-z0-9_.]*`
fn is_bare_identifier(name: &str) -> bool {
    let name = name.strip_prefix('~').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod escape_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_identifiers_stay_bare() {
        assert_eq!(escape_predicate("name"), "name");
        assert_eq!(escape_predicate("dgraph.type"), "dgraph.type");
        assert_eq!(escape_predicate("~director.film"), "~director.film");
    }

    #[test]
    fn unusual_names_are_bracketed() {
        assert_eq!(escape_predicate("release date"), "<release date>");
        assert_eq!(escape_predicate("8bit"), "<8bit>");
        assert_eq!(escape_predicate("名前"), "<名前>");
    }

    #[test]
    fn injection_characters_are_stripped() {
        assert_eq!(escape_predicate("name}{ evil"), "<name evil>");
        assert_eq!(escape_predicate("<name>"), "name");
        assert_eq!(escape_predicate("na\"me,"), "name");
    }

    #[test]
    fn directives_aliases_and_bindings() {
        assert_eq!(escape_predicate("name@en"), "name@en");
        assert_eq!(escape_predicate("name@en:fr"), "name@en:fr");
        assert_eq!(escape_predicate("title:name@en"), "title : name@en");
        assert_eq!(escape_predicate("friend @facets(since)"), "friend @facets(since)");
        assert_eq!(escape_predicate("F AS friend"), "F as friend");
    }

    #[test]
    fn pseudo_functions_are_unwrapped() {
        assert_eq!(escape_predicate("expand(_all_)"), "expand(_all_)");
        assert_eq!(escape_predicate("count(friend)"), "count(friend)");
        assert_eq!(escape_predicate("total : val(n)"), "total : val(n)");
    }

    #[test]
    fn blobs_split_into_ordered_predicates() {
        let blob = "
            uid
            name@en

            initial_release_date netflix_id
            n as count(starring)
        ";
        assert_eq!(
            parse_predicates(blob),
            vec![
                "uid",
                "name@en",
                "initial_release_date",
                "netflix_id",
                "n as count(starring)",
            ]
        );
    }
}

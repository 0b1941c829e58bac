use crate::prelude::*;
use pretty_assertions::assert_eq;

fn dql(builder: &QueryBuilder) -> String {
    builder.to_dql().unwrap().to_string()
}

#[test]
fn test_root_block() {
    let builder = query(eq("name", "Blade Runner"))
        .name("bladerunner")
        .fields("uid name");

    assert_eq!(
        dql(&builder),
        "bladerunner(func: eq(name,??)) { uid name }"
    );
    assert_eq!(builder.block_name(), "bladerunner");
}

#[test]
fn test_default_name_and_query_type() {
    let builder = query_type("Film").fields("uid");
    assert_eq!(builder.block_name(), ROOT_QUERY);
    assert_eq!(dql(&builder), "rootQuery(func: type(Film)) { uid }");
}

#[test]
fn test_root_parameters_and_directives() {
    let builder = query(has("name"))
        .name("people")
        .first(10)
        .offset(20)
        .order_asc("name")
        .order_desc(val("age"))
        .filter(gt("age", 18))
        .filter(lt("age", 65))
        .group_by("city")
        .cascade()
        .fields("uid name");

    assert_eq!(
        dql(&builder),
        minify(
            "people(func: has(name),first:??,offset:??,orderasc: name,orderdesc: val(age))
             @filter(gt(age,??) AND lt(age,??)) @groupby(city) @cascade { uid name }"
        )
    );
    assert_eq!(builder.to_dql().unwrap().arg_count(), 4);
}

#[test]
fn test_cascade_fields_and_facets() {
    let builder = query(has("name"))
        .name("people")
        .all_facets()
        .facets("since")
        .cascade_fields(["name", "email"])
        .fields("name");

    assert_eq!(
        dql(&builder),
        "people(func: has(name)) @facets @facets(since) @cascade(name,email) { name }"
    );
}

#[test]
fn test_nested_edges_by_path() {
    let builder = query(eq("name@en", "Blade Runner"))
        .name("film")
        .fields("uid")
        .edge_with("starring", [Part::from("uid")])
        .edge_with("starring->performance.actor", [Part::from("name@en")])
        .edge_with("genre", [Part::from("name@en"), Part::from(Cursor::new().first(3))]);

    assert_eq!(
        dql(&builder),
        minify(
            "film(func: eq(name@en,??)) {
                uid
                starring { uid performance.actor { name@en } }
                genre(first:??) { name@en }
            }"
        )
    );
}

#[test]
fn test_children_without_attributes_have_no_leading_space() {
    let builder = query(has("name")).name("q").edge("friend");
    assert_eq!(dql(&builder), "q(func: has(name)) { friend {  } }");
}

#[test]
fn test_edge_fn_paths_are_relative() {
    let builder = query(has("director.film"))
        .name("directors")
        .fields("name@en")
        .edge_fn("director.film", |films| {
            films
                .filter(ge("initial_release_date", "1980"))
                .order_asc("initial_release_date")
                .as_("F")
                .fields("name@en")
                .edge_fn("genre", |genre| genre.fields("name@en"))
                .edge_with("starring", [Part::from("uid")])
        });

    assert_eq!(
        dql(&builder),
        minify(
            "directors(func: has(director.film)) {
                name@en
                F as director.film(orderasc: initial_release_date) @filter(ge(initial_release_date,??)) {
                    name@en
                    genre { name@en }
                    starring { uid }
                }
            }"
        )
    );

    let keys: Vec<&String> = builder.children().keys().collect();
    assert_eq!(keys, vec!["", "director.film"]);
}

#[test]
fn test_edge_from_query_rebases_children() {
    let actors = query(has("actor.film"))
        .name("actors")
        .fields("name")
        .edge_with("actor.film", [Part::from("uid")]);

    let builder = query(type_("Film"))
        .name("films")
        .fields("uid")
        .edge_from_query("starring", actors);

    assert_eq!(
        dql(&builder),
        "films(func: type(Film)) { uid starring @filter(has(actor.film)) { name actor.film { uid } } }"
    );
    assert!(builder.children().contains_key("starring"));
}

#[test]
fn test_renaming_keeps_children() {
    let builder = query(has("name")).edge_with("friend", [Part::from("name")]);
    let renamed = builder.clone().name("people");

    assert_eq!(dql(&renamed), "people(func: has(name)) { friend { name } }");
    assert_eq!(dql(&builder), "rootQuery(func: has(name)) { friend { name } }");
}

#[test]
fn test_variable_blocks() {
    assert_eq!(
        dql(&variable(has("name")).fields("n as count(friend)")),
        "var(func: has(name)) { n as count(friend) }"
    );
    assert_eq!(
        dql(&variable(has("name")).as_("people")),
        "people as var(func: has(name)) {  }"
    );
}

#[test]
fn test_computed_selection() {
    let builder = query(uid_of("people"))
        .name("stats")
        .select(
            Selection::new()
                .field("name")
                .alias("friends", count("friend"))
                .bind("n", count("film")),
        );

    assert_eq!(
        dql(&builder),
        "stats(func: uid(people)) { name friends : count(friend) n as count(film) }"
    );
}

#[test]
fn test_ordering_by_aggregate_fails() {
    let err = query(has("name"))
        .order_desc(count("friend"))
        .to_dql()
        .unwrap_err();
    assert!(matches!(err, DqlError::TypeMismatch { .. }));
}

#[test]
fn test_facet_filters_on_nested_edge() {
    let builder = query(eq("name", "Alice")).name("alice").edge_with(
        "friend",
        [
            Part::from(Facet::from(eq("close", true))),
            Part::from("name"),
        ],
    );

    let statement = builder.to_dql().unwrap();
    assert_eq!(
        statement.to_string(),
        "alice(func: eq(name,??)) { friend @facets(eq(close,??)) { name } }"
    );
    assert_eq!(
        statement.args(),
        vec![&Value::from("Alice"), &Value::from(true)]
    );
}

#[test]
fn test_renaming_a_nested_block_keeps_its_parent() {
    let builder = query(has("name")).name("q").edge_fn("a", |a| {
        a.fields("uid")
            .edge_fn("b", |b| b.name("c").fields("name").edge_with("d", [Part::from("uid")]))
    });

    assert_eq!(
        dql(&builder),
        "q(func: has(name)) { a { uid c { name d { uid } } } }"
    );
}

//! Example: compile a two block query and an upsert, printing what would be
//! sent to Dgraph.
//!
//! Run with:
//! ```
//! RUST_LOG=dqlx=trace cargo run -p dqlx --example bladerunner
//! ```

use dqlx::prelude::*;
use serde_json::json;

fn main() -> DqlResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bladerunner = query(eq("name@en", "Blade Runner"))
        .name("bladerunner")
        .fields("uid name@en initial_release_date netflix_id")
        .edge_fn("starring", |starring| {
            starring
                .first(5)
                .edge_with("performance.actor", [Part::from("name@en")])
                .edge_with("performance.character", [Part::from("name@en")])
        });

    let eighties = query_type("Film")
        .name("eighties")
        .filter(between("initial_release_date", "1980-01-01", "1989-12-31"))
        .order_asc("initial_release_date")
        .first(10)
        .fields("name@en initial_release_date");

    let compiled = compile(&[bladerunner, eighties])?;
    println!("=== Query ===");
    println!("{}", compiled.text());
    println!("=== Variables ===");
    println!("{}", serde_json::to_string_pretty(compiled.variables())?);

    let upsert = Mutation::new()
        .query(variable(eq("email", "deckard@tyrell.corp")).as_("u"))
        .condition(eq("len(u)", 0))
        .set(json!({
            "uid": "_:deckard",
            "email": "deckard@tyrell.corp",
            "dgraph.type": "Person",
        }))?
        .compile()?;

    println!("\n=== Upsert ===");
    if let Some(query) = upsert.query() {
        println!("query:     {}", query.text());
    }
    println!("condition: {}", upsert.condition().as_deref().unwrap_or_default());
    println!("set:       {}", upsert.set_json().as_deref().unwrap_or_default());

    Ok(())
}

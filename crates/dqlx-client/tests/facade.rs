use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dqlx_client::prelude::*;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Answers every request with a canned response and remembers what it was sent.
#[derive(Default)]
struct RecordingExecutor {
    response: RawResponse,
    queries: Mutex<Vec<QueryRequest>>,
    mutations: Mutex<Vec<MutationRequest>>,
    fail: bool,
}

impl RecordingExecutor {
    fn answering(json: &str) -> Self {
        Self {
            response: RawResponse::from_json(json),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn query(&self, request: QueryRequest) -> anyhow::Result<RawResponse> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        self.queries.lock().unwrap().push(request);
        Ok(self.response.clone())
    }

    async fn mutate(&self, request: MutationRequest) -> anyhow::Result<RawResponse> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        self.mutations.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

#[derive(Deserialize, Debug, PartialEq)]
struct Film {
    uid: String,
    name: String,
    initial_release_date: DateTime<Utc>,
}

#[tokio::test]
async fn test_execute_single_block() {
    let executor = RecordingExecutor::answering(
        r#"{"bladerunner":[{"uid":"0x1","name":"Blade Runner","initial_release_date":"1982-06-25T00:00:00Z"}]}"#,
    );
    let client = Dqlx::new(executor, ClientConfig::default().with_read_only(true));

    let response = client
        .execute(
            query(eq("name", "Blade Runner"))
                .name("bladerunner")
                .fields("uid name initial_release_date"),
        )
        .await
        .unwrap();

    let films: Vec<Film> = response.decode().unwrap();
    assert_eq!(
        films,
        vec![Film {
            uid: "0x1".to_string(),
            name: "Blade Runner".to_string(),
            initial_release_date: Utc.with_ymd_and_hms(1982, 6, 25, 0, 0, 0).unwrap(),
        }]
    );

    let sent = client.executor().queries.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].query,
        "query Bladerunner($0:string) { bladerunner(func: eq(name,$0)) { uid name initial_release_date } }"
    );
    assert_eq!(sent[0].variables["$0"], "Blade Runner");
    assert!(sent[0].options.read_only);
    assert!(!sent[0].options.commit_now);
}

#[derive(Deserialize, Debug, PartialEq)]
struct Named {
    name: String,
}

#[tokio::test]
async fn test_execute_several_blocks() {
    let executor = RecordingExecutor::answering(
        r#"{"films":[{"name":"Alien"}],"people":[{"name":"Ridley"}]}"#,
    );
    let client = Dqlx::new(executor, ClientConfig::default());

    let response = client
        .execute_queries(&[
            query_type("Film").name("films").fields("name"),
            query_type("Person").name("people").fields("name"),
        ])
        .await
        .unwrap();

    assert_eq!(response.operation_name(), &None);
    let people: Vec<Named> = response.block("people").unwrap();
    assert_eq!(people, vec![Named { name: "Ridley".to_string() }]);

    let all: BTreeMap<String, Vec<Named>> = response.decode().unwrap();
    assert_eq!(all.len(), 2);

    let missing = response.block::<Vec<Named>>("genres").unwrap_err();
    assert!(matches!(missing, ClientError::MissingBlock(name) if name == "genres"));
}

#[tokio::test]
async fn test_upsert_mutation() {
    let mut executor = RecordingExecutor::answering(r#"{"u":[]}"#);
    executor
        .response
        .uids
        .insert("deckard".to_string(), "0x2a".to_string());
    let client = Dqlx::new(executor, ClientConfig::default().with_read_only(true));

    let mutation = Mutation::new()
        .query(variable(eq("email", "deckard@tyrell.corp")).as_("u"))
        .condition(eq("len(u)", 0))
        .set(serde_json::json!({ "uid": "_:deckard", "email": "deckard@tyrell.corp" }))
        .unwrap();

    let response = client.mutate(mutation).await.unwrap();
    assert_eq!(response.uid("_:deckard"), Some("0x2a"));
    assert_eq!(response.uid("deckard"), Some("0x2a"));

    let sent = client.executor().mutations.lock().unwrap();
    let request = &sent[0];
    assert!(request.is_upsert());
    assert_eq!(
        request.query,
        "query Query($0:string) { u as var(func: eq(email,$0)) {  } }"
    );
    assert_eq!(request.condition, "@if(eq(len(u),0)) ");
    assert_eq!(
        request.set_json.as_deref(),
        Some(r#"{"email":"deckard@tyrell.corp","uid":"_:deckard"}"#)
    );
    assert!(request.options.commit_now);
    assert!(!request.options.read_only);
}

#[tokio::test]
async fn test_compile_errors_never_reach_the_executor() {
    let client = Dqlx::new(RecordingExecutor::default(), ClientConfig::default());

    let err = client
        .execute(query(has("name")).order_asc(count("friend")))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Compile(_)));
    assert!(client.executor().queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_transport_errors_are_wrapped() {
    let client = Dqlx::new(RecordingExecutor::failing(), ClientConfig::default());

    let err = client.execute(query(has("name"))).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.to_string(), "transport error: connection refused");
}

#[tokio::test]
async fn test_single_variable_block_decodes_whole_document() {
    let executor = RecordingExecutor::answering(r#"{"u":[{"name":"Rachael"}]}"#);
    let client = Dqlx::new(executor, ClientConfig::default());

    let response = client
        .execute(variable(has("name")).as_("u").fields("name"))
        .await
        .unwrap();

    assert_eq!(response.operation_name(), &None);
    let all: BTreeMap<String, Vec<Named>> = response.decode().unwrap();
    assert_eq!(all["u"], vec![Named { name: "Rachael".to_string() }]);
}

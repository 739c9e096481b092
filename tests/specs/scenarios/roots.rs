// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Root resolution specs

use crate::prelude::*;

/// Serves `{ "answer": 42 }` for every key except `missing`
fn picky_server(realm: &Realm) -> MemoryChannel {
    let (client, server) = MemoryChannel::pair();
    let answer = realm.from_json(&json!({"answer": 42}));
    let resolver = resolver_fn(move |realm: Realm, key: Option<String>| {
        let answer = answer.clone();
        async move {
            match key.as_deref() {
                Some("missing") => Err(realm.new_error("Error", "root 'missing' was withdrawn")),
                _ => Ok(answer),
            }
        }
    });
    listen(server, realm.clone(), resolver).unwrap();
    client
}

#[tokio::test]
async fn rejected_roots_fail_the_commit() {
    let realm = Realm::new();
    let client = picky_server(&realm);

    let error = run(&import_named(client, "missing").get("answer")).await.unwrap_err();

    let remote = error.remote().expect("a reconstructed error");
    assert_eq!(remote.message, "root 'missing' was withdrawn");
}

#[tokio::test]
async fn accepted_roots_run_the_chain() {
    let realm = Realm::new();
    let client = picky_server(&realm);

    let answer = run(&import_named(client, "anything").get("answer")).await.unwrap();

    assert_eq!(answer, Some(json!(42)));
}

#[tokio::test]
async fn a_table_serves_several_roots_on_one_channel() {
    let realm = Realm::new();
    let (client, server) = MemoryChannel::pair();
    let table = RootTable::new()
        .with_default(realm.from_json(&json!("default")))
        .with("users", realm.from_json(&json!(["ada", "grace"])))
        .with("settings", realm.from_json(&json!({"theme": "dark"})));
    listen(server, realm, table).unwrap();

    assert_eq!(run(&import(client.clone())).await.unwrap(), Some(json!("default")));
    assert_eq!(
        run(&import_named(client.clone(), "users").get(1)).await.unwrap(),
        Some(json!("grace"))
    );
    assert_eq!(
        run(&import_named(client.clone(), "settings").get("theme")).await.unwrap(),
        Some(json!("dark"))
    );
    let unknown = run(&import_named(client, "nope")).await.unwrap_err();
    assert_eq!(unknown.remote().map(|e| e.kind.clone()), Some(ErrorKind::ReferenceError));
}

#[tokio::test]
async fn omitted_returns_still_run_the_chain() {
    let client = serve_json(json!({"box": {}}));
    let root = import(client);

    let omitted = commit_with(&root.get("box").set("filled", true).get("filled"), CommitOptions { omit_return: true })
        .unwrap()
        .await
        .unwrap();

    assert_eq!(omitted, None);
    assert_eq!(run(&root.get("box").get("filled")).await.unwrap(), Some(json!(true)));
}

#[tokio::test]
async fn unencodable_results_are_reported() {
    let realm = Realm::new();
    let root = realm.new_object();
    put(&root, "fn", realm.new_function("f", |_realm, _this, _args| Ok(Value::Undefined)));
    let client = serve(&realm, Value::Object(root));

    let error = run(&import(client.clone()).get("fn")).await.unwrap_err();
    let omitted = commit_with(&import(client).get("fn"), CommitOptions { omit_return: true })
        .unwrap()
        .await;

    assert!(error.remote().is_some());
    assert_eq!(omitted.unwrap(), None);
}

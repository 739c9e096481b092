// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure round-trip specs

use crate::prelude::*;

fn thrower(realm: &Realm) -> Value {
    let root = realm.new_object();
    let fail = realm.new_function("fail", |realm, _this, args| {
        let kind = args.first().and_then(Value::as_str).unwrap_or("Error").to_string();
        let error = realm.new_error(&kind, "it broke");
        if let Some(object) = error.as_object() {
            put(object, "limit", 5);
            put(object, "detail", "quota");
        }
        Err(error)
    });
    let throw_value = realm.new_function("throwValue", |_realm, _this, args| {
        Err(args.into_iter().next().unwrap_or(Value::Undefined))
    });
    put(&root, "fail", fail);
    put(&root, "throwValue", throw_value);
    Value::Object(root)
}

#[tokio::test]
async fn builtin_errors_keep_their_kind() {
    let realm = Realm::new();
    let client = serve(&realm, thrower(&realm));

    let error = run(&import(client).call("fail", vec![json!("RangeError")]))
        .await
        .unwrap_err();

    let remote = error.remote().expect("a reconstructed error");
    assert_eq!(remote.kind, ErrorKind::RangeError);
    assert_eq!(remote.name, "RangeError");
    assert_eq!(remote.message, "it broke");
}

#[tokio::test]
async fn custom_fields_survive_the_trip() {
    let realm = Realm::new();
    let client = serve(&realm, thrower(&realm));

    let error = run(&import(client).call("fail", vec![json!("QuotaError")]))
        .await
        .unwrap_err();

    let remote = error.remote().expect("a reconstructed error");
    assert_eq!(remote.kind, ErrorKind::Error);
    assert_eq!(remote.name, "QuotaError");
    assert_eq!(remote.message, "it broke");
    assert_eq!(remote.field("limit"), Some(&json!(5)));
    assert_eq!(remote.field("detail"), Some(&json!("quota")));
}

#[tokio::test]
async fn non_error_throws_arrive_as_sent() {
    let realm = Realm::new();
    let client = serve(&realm, thrower(&realm));

    let error = run(&import(client).call("throwValue", vec![json!({"code": 7})]))
        .await
        .unwrap_err();

    assert!(matches!(error, CommitError::Thrown(ref value) if value == &json!({"code": 7})));
}

#[tokio::test]
async fn reading_through_undefined_is_a_type_error() {
    let client = serve_json(json!({}));

    let error = run(&import(client).get("missing").get("deeper")).await.unwrap_err();

    let remote = error.remote().expect("a reconstructed error");
    assert_eq!(remote.kind, ErrorKind::TypeError);
    assert!(remote.message.contains("reading 'deeper'"), "{}", remote.message);
}

#[tokio::test]
async fn a_failed_commit_leaves_the_channel_usable() {
    let client = serve_json(json!({"ok": 1}));
    let root = import(client);

    assert!(run(&root.get("nope").get("x")).await.is_err());
    assert_eq!(run(&root.get("ok")).await.unwrap(), Some(json!(1)));
}

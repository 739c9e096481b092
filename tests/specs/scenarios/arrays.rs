// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Array specs
//!
//! Drive the realm's `Array` intrinsic from the client side.

use crate::prelude::*;

fn global_array(realm: &Realm) -> Value {
    realm
        .get(&Value::Object(realm.global()), &PropertyKey::from("Array"))
        .unwrap()
}

#[tokio::test]
async fn constructor_apply_builds_an_array() {
    let realm = Realm::new();
    let client = serve(&realm, global_array(&realm));

    let array = run(&import(client).apply(vec![json!("a"), json!("b")])).await.unwrap();

    assert_eq!(array, Some(json!(["a", "b"])));
}

#[tokio::test]
async fn push_is_bound_to_the_constructed_array() {
    let realm = Realm::new();
    let client = serve(&realm, global_array(&realm));

    let chain = import(client)
        .apply(vec![json!("a"), json!("b")])
        .get("push")
        .apply(vec![json!("c")]);

    assert_eq!(run(&chain).await.unwrap(), Some(json!(3)));
}

#[tokio::test]
async fn contents_reflect_every_step_in_order() {
    let realm = Realm::new();
    let client = serve(&realm, global_array(&realm));

    let chain = import(client)
        .apply(vec![json!("a"), json!("b")])
        .set(2, "c")
        .call("join", vec![json!("-")]);

    assert_eq!(run(&chain).await.unwrap(), Some(json!("a-b-c")));
}

#[tokio::test]
async fn global_methods_are_reachable_by_name() {
    let realm = Realm::new();
    let client = serve(&realm, Value::Object(realm.global()));
    let array = import(client).get("Array");

    let built = run(&array.call("of", vec![json!(1), json!(2), json!(3)]).call("slice", vec![json!(1)]))
        .await
        .unwrap();
    let is_array = run(&array.call("isArray", vec![json!([])])).await.unwrap();

    assert_eq!(built, Some(json!([2, 3])));
    assert_eq!(is_array, Some(json!(true)));
}

#[tokio::test]
async fn construct_with_a_bad_length_is_a_range_error() {
    let realm = Realm::new();
    let client = serve(&realm, global_array(&realm));

    let error = run(&import(client).construct(vec![json!(-1)])).await.unwrap_err();

    assert_eq!(error.remote().map(|e| e.kind.clone()), Some(ErrorKind::RangeError));
}

#[tokio::test]
async fn pushing_onto_the_longest_array_fails_the_commit() {
    let realm = Realm::new();
    let client = serve(&realm, global_array(&realm));
    let chain = import(client)
        .construct(vec![json!(u32::MAX)])
        .get("push")
        .apply(vec![json!(1)]);

    let settled = tokio::time::timeout(std::time::Duration::from_secs(5), run(&chain))
        .await
        .expect("the commit settles");

    let error = settled.unwrap_err();
    assert_eq!(error.remote().map(|e| e.kind.clone()), Some(ErrorKind::TypeError));
}

#[tokio::test]
async fn returning_a_huge_sparse_array_fails_the_commit() {
    let realm = Realm::new();
    let client = serve(&realm, global_array(&realm));

    let settled = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        run(&import(client).construct(vec![json!(u32::MAX)])),
    )
    .await
    .expect("the commit settles");

    let error = settled.unwrap_err();
    assert_eq!(error.remote().map(|e| e.kind.clone()), Some(ErrorKind::RangeError));
}

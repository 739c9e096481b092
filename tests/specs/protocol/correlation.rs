// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit correlation specs
//!
//! Concurrent commits on one channel each settle with their own result,
//! whatever order the results come back in.

use crate::prelude::*;
use futures::future::join_all;
use futures::FutureExt;
use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

/// A root with `echo(delay_ms, value)`, which answers after a delay
fn delayed_echo(realm: &Realm) -> Value {
    let root = realm.new_object();
    let echo = realm.new_async_function("echo", |_realm, _this, args| {
        async move {
            let delay = args.first().and_then(Value::as_number).unwrap_or_default();
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            Ok(args.get(1).cloned().unwrap_or(Value::Undefined))
        }
        .boxed()
    });
    put(&root, "echo", echo);
    Value::Object(root)
}

#[tokio::test]
async fn every_commit_gets_a_distinct_id() {
    let realm = Realm::new();
    let client = serve(&realm, delayed_echo(&realm));
    let root = import(client);

    let pending: Vec<_> = (0..20)
        .map(|i| commit(&root.call("echo", vec![json!(0), json!(i)])).unwrap())
        .collect();
    let ids: HashSet<String> = pending.iter().map(|p| p.commit_id().to_string()).collect();

    assert_eq!(ids.len(), 20);
    join_all(pending).await;
}

#[tokio::test]
async fn late_results_do_not_block_early_ones() {
    let realm = Realm::new();
    let client = serve(&realm, delayed_echo(&realm));
    let root = import(client);

    let slow = commit(&root.call("echo", vec![json!(200), json!("slow")])).unwrap();
    let fast = commit(&root.call("echo", vec![json!(0), json!("fast")])).unwrap();

    let first = futures::future::select(slow, fast).await;
    match first {
        futures::future::Either::Right((fast, slow)) => {
            assert_eq!(fast.unwrap(), Some(json!("fast")));
            assert_eq!(slow.await.unwrap(), Some(json!("slow")));
        }
        futures::future::Either::Left(_) => panic!("slow commit settled first"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn results_reach_their_own_commit(delays in prop::collection::vec(0..20u64, 1..12)) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let results = runtime.block_on(async {
            let realm = Realm::new();
            let client = serve(&realm, delayed_echo(&realm));
            let root = import(client);
            let pending: Vec<_> = delays
                .iter()
                .enumerate()
                .map(|(i, delay)| commit(&root.call("echo", vec![json!(delay), json!(i)])).unwrap())
                .collect();
            join_all(pending).await
        });

        for (i, result) in results.into_iter().enumerate() {
            prop_assert_eq!(result.unwrap(), Some(json!(i)));
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared-channel specs
//!
//! Channels may carry traffic that is not ours; it must pass through
//! without disturbing commits in flight.

use crate::prelude::*;
use fp_core::{Body, Envelope, ResultData};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn foreign_messages_do_not_disturb_pending_commits() {
    let (client, server) = MemoryChannel::pair();
    let realm = Realm::new();
    let root = realm.new_object();
    let pause = realm.new_async_function("pause", |_realm, _this, _args| {
        use futures::FutureExt;
        async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(Value::from("done"))
        }
        .boxed()
    });
    put(&root, "pause", pause);
    export(server.clone(), realm, Value::Object(root)).unwrap();

    let pending = commit(&import(client).call("pause", vec![])).unwrap();
    server.send(json!("just a string")).unwrap();
    server.send(json!({"unrelated": {"type": "result", "commitId": pending.commit_id()}})).unwrap();
    server.send(json!({"data": 42})).unwrap();

    assert_eq!(pending.await.unwrap(), Some(json!("done")));
}

#[tokio::test]
async fn stray_results_for_unknown_commits_are_dropped() {
    let (client, server) = MemoryChannel::pair();
    export(server.clone(), Realm::new(), Value::from(1)).unwrap();
    let stray = Envelope::default()
        .wrap(&Body::Result(ResultData::success("nobody-asked", Some(json!(0)))))
        .unwrap();

    server.send(stray).unwrap();

    assert_eq!(run(&import(client)).await.unwrap(), Some(json!(1)));
}

#[tokio::test]
async fn a_loopback_channel_serves_itself() {
    let channel = MemoryChannel::loopback();
    let realm = Realm::new();
    let root = realm.from_json(&json!({"x": "self"}));
    export(channel.clone(), realm, root).unwrap();

    assert_eq!(run(&import(channel).get("x")).await.unwrap(), Some(json!("self")));
}

#[tokio::test]
async fn existing_handlers_still_see_every_message() {
    let (client, server) = MemoryChannel::pair();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client.set_handler(Some(Arc::new(move |message: Json| sink.lock().unwrap().push(message))));
    export(server.clone(), Realm::new(), Value::from(3)).unwrap();

    assert_eq!(run(&import(client)).await.unwrap(), Some(json!(3)));
    for _ in 0..100 {
        if !seen.lock().unwrap().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert_eq!(seen.lock().unwrap().len(), 1);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::resolver::RootTable;
use fp_adapters::FakeChannel;
use fp_core::{CommitData, Operation, Outcome, PropertyKey, ResultData, Thrown};
use serde_json::json;
use std::sync::Mutex as StdMutex;
use tracing_subscriber::fmt::MakeWriter;

fn commit_message(id: &str, operations: Vec<Operation>, root_key: Option<&str>) -> Json {
    Envelope::default()
        .wrap(&Body::Commit(CommitData {
            commit_id: id.to_string(),
            operations,
            root_key: root_key.map(str::to_string),
            omit_return: None,
        }))
        .unwrap()
}

fn get(k: &str) -> Operation {
    Operation::Get {
        property: PropertyKey::from(k),
    }
}

/// Wait until the listener has posted `count` results
async fn results(channel: &FakeChannel, count: usize) -> Vec<ResultData> {
    for _ in 0..1000 {
        let sent = channel.sent();
        if sent.len() >= count {
            return sent
                .iter()
                .map(|message| match Envelope::default().open(message) {
                    Some(Body::Result(result)) => result,
                    other => panic!("expected a result, got {other:?}"),
                })
                .collect();
        }
        tokio::task::yield_now().await;
    }
    panic!("listener posted {} of {} results", channel.sent().len(), count);
}

fn serve(channel: &FakeChannel, realm: &Realm, root: serde_json::Value) -> Listener {
    serve_value(channel, realm, realm.from_json(&root))
}

fn serve_value(channel: &FakeChannel, realm: &Realm, root: Value) -> Listener {
    listen_with(
        channel.clone(),
        Executor::new(realm.clone(), FixedRoot(root)),
        Envelope::default(),
        ErrorCodec::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn commits_are_answered_on_the_same_channel() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    serve(&channel, &realm, json!({"x": 1}));

    channel.deliver(commit_message("c-1", vec![get("x")], None));

    let results = results(&channel, 1).await;
    assert_eq!(results[0], ResultData::success("c-1", Some(json!(1))));
}

#[tokio::test]
async fn each_commit_gets_exactly_one_result() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    serve(&channel, &realm, json!({"a": "A", "b": "B"}));

    channel.deliver(commit_message("first", vec![get("a")], None));
    channel.deliver(commit_message("second", vec![get("b")], None));

    let mut results = results(&channel, 2).await;
    results.sort_by(|l, r| l.commit_id.cmp(&r.commit_id));
    assert_eq!(results[0], ResultData::success("first", Some(json!("A"))));
    assert_eq!(results[1], ResultData::success("second", Some(json!("B"))));
}

#[tokio::test]
async fn named_roots_go_through_the_resolver() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    let table = RootTable::new().with("config", realm.from_json(&json!({"debug": true})));
    listen_with(
        channel.clone(),
        Executor::new(realm.clone(), table),
        Envelope::default(),
        ErrorCodec::default(),
    )
    .unwrap();

    channel.deliver(commit_message("ok", vec![get("debug")], Some("config")));
    channel.deliver(commit_message("bad", vec![], Some("missing")));

    let results = results(&channel, 2).await;
    let ok = results.iter().find(|r| r.commit_id == "ok").unwrap();
    let bad = results.iter().find(|r| r.commit_id == "bad").unwrap();
    assert_eq!(ok.return_value, Some(json!(true)));
    assert_eq!(bad.result, Outcome::Failure);
}

#[tokio::test]
async fn unrelated_traffic_is_ignored() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    serve(&channel, &realm, json!({}));

    channel.deliver(json!({"someone": "else"}));
    channel.deliver(Envelope::default().wrap(&Body::Result(ResultData::success("x", None))).unwrap());
    let mut mystery = serde_json::Map::new();
    mystery.insert(Envelope::default().namespace().to_string(), json!({"type": "mystery"}));
    channel.deliver(Json::Object(mystery));
    channel.deliver(commit_message("real", vec![], None));

    let results = results(&channel, 1).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].commit_id, "real");
}

#[tokio::test]
async fn second_listener_on_a_channel_is_rejected() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    serve(&channel, &realm, json!({}));

    let again = export(channel.clone(), realm, Value::Null);

    assert_eq!(again.err(), Some(ServerError::AlreadyListening(channel.id())));
}

#[test]
fn listening_requires_a_runtime() {
    let channel = FakeChannel::new();

    let result = export(channel, Realm::new(), Value::Null);

    assert_eq!(result.err(), Some(ServerError::NoRuntime));
}

#[tokio::test]
async fn existing_handler_keeps_receiving() {
    let channel = FakeChannel::new();
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    channel.set_handler(Some(Arc::new(move |m: Json| sink.lock().unwrap().push(m))));
    let realm = Realm::new();
    serve(&channel, &realm, json!({}));

    channel.deliver(commit_message("c", vec![], None));
    results(&channel, 1).await;
    for _ in 0..100 {
        if !seen.lock().unwrap().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn listener_exposes_its_channel_and_realm() {
    let channel = FakeChannel::new();
    let realm = Realm::new();

    let listener = serve(&channel, &realm, json!({}));

    assert_eq!(listener.channel_id(), channel.id());
    assert!(listener.executor().realm().global().ptr_eq(&realm.global()));
}

#[tokio::test]
async fn a_panicking_replay_still_answers() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    let root = realm.new_object();
    let explode = realm.new_function("explode", |_realm, _this, _args| panic!("host bug"));
    root.define_own_property(PropertyKey::from("explode"), fp_realm::PropertyDescriptor::data(explode));
    serve_value(&channel, &realm, Value::Object(root));

    channel.deliver(commit_message(
        "boom",
        vec![get("explode"), Operation::Apply { arg_array: vec![] }],
        None,
    ));
    channel.deliver(commit_message("after", vec![], None));

    let results = results(&channel, 2).await;
    let boom = results.iter().find(|r| r.commit_id == "boom").unwrap();
    assert_eq!(boom.result, Outcome::Failure);
    let Thrown::Error(error) = ErrorCodec::default().deserialize(boom.thrown.clone().unwrap()) else {
        panic!("expected an error payload");
    };
    assert_eq!(error.message, "replay aborted unexpectedly");
    assert!(results.iter().any(|r| r.commit_id == "after" && r.result == Outcome::Success));
}

#[tokio::test]
async fn failures_use_the_listener_error_codec() {
    let channel = FakeChannel::new();
    let realm = Realm::new();
    let envelope = Envelope::new("custom-ns");
    listen_with(
        channel.clone(),
        Executor::new(realm.clone(), FixedRoot(Value::Undefined)),
        envelope.clone(),
        ErrorCodec::new("custom-ns_error"),
    )
    .unwrap();

    let message = envelope
        .wrap(&Body::Commit(CommitData {
            commit_id: "c".to_string(),
            operations: vec![get("x")],
            root_key: None,
            omit_return: None,
        }))
        .unwrap();
    channel.deliver(message);

    let mut reply = None;
    for _ in 0..1000 {
        if let Some(sent) = channel.sent().first() {
            reply = envelope.open(sent);
            break;
        }
        tokio::task::yield_now().await;
    }
    let Some(Body::Result(result)) = reply else {
        panic!("expected a result under the custom namespace");
    };
    let thrown = result.thrown.unwrap();
    assert!(thrown.get("custom-ns_error").is_some(), "{thrown}");
    assert!(matches!(ErrorCodec::new("custom-ns_error").deserialize(thrown), Thrown::Error(_)));
}

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<StdMutex<Vec<u8>>>,
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn replay_is_traced_per_commit() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(async {
                let channel = FakeChannel::new();
                let realm = Realm::new();
                serve(&channel, &realm, json!({"x": {"y": 2}}));
                channel.deliver(commit_message("traced-1", vec![get("x"), get("y")], None));
                channel.deliver(commit_message("traced-2", vec![get("nope"), get("deeper")], None));
                results(&channel, 2).await;
            })
    });

    let output = String::from_utf8_lossy(&logs.logs.lock().unwrap()).to_string();
    assert!(output.contains("commit"), "Should log span name. Logs:\n{}", output);
    assert!(output.contains("traced-1"), "Should log commit id. Logs:\n{}", output);
    assert!(output.contains("replay step"), "Should log steps. Logs:\n{}", output);
    assert!(output.contains("completed"), "Should log completion. Logs:\n{}", output);
    assert!(output.contains("elapsed_ms"), "Should log timing. Logs:\n{}", output);
    assert!(output.contains("failed"), "Should log failures. Logs:\n{}", output);
}

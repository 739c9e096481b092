// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn records_sent_messages() {
    let channel = FakeChannel::new();

    channel.send(json!(1)).unwrap();
    channel.send(json!(2)).unwrap();

    assert_eq!(channel.sent(), vec![json!(1), json!(2)]);
    assert_eq!(channel.take_sent().len(), 2);
    assert!(channel.sent().is_empty());
}

#[test]
fn failing_sends_report_closed() {
    let channel = FakeChannel::new();
    channel.fail_sends(true);

    assert_eq!(channel.send(json!(1)), Err(ChannelError::Closed));
    assert!(channel.sent().is_empty());
}

#[test]
fn deliver_reports_missing_handler() {
    let channel = FakeChannel::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    assert!(!channel.deliver(json!("nobody")));

    let sink = Arc::clone(&received);
    channel.set_handler(Some(Arc::new(move |m: Json| sink.lock().unwrap().push(m))));
    assert!(channel.deliver(json!("someone")));
    assert_eq!(*received.lock().unwrap(), vec![json!("someone")]);
}

#[test]
fn clones_share_state() {
    let channel = FakeChannel::new();
    let clone = channel.clone();

    clone.send(json!(true)).unwrap();

    assert_eq!(channel.sent(), vec![json!(true)]);
    assert_eq!(channel.id(), clone.id());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immediate helper specs
//!
//! One-shot introspection that commits a single operation and decodes
//! the answer.

use crate::prelude::*;

#[tokio::test]
async fn introspection_answers_directly() {
    let client = serve_json(json!({"x": 1, "y": {"z": 2}}));
    let root = import(client);

    assert!(immediate::has(&root, "x").await.unwrap());
    assert!(!immediate::has(&root, "w").await.unwrap());
    assert!(immediate::has(&root, "hasOwnProperty").await.unwrap());
    assert_eq!(immediate::own_keys(&root).await.unwrap(), vec!["x", "y"]);
    assert_eq!(immediate::get(&root.get("y"), "z").await.unwrap(), Some(json!(2)));
    assert_eq!(immediate::get(&root, "nothing").await.unwrap(), None);
}

#[tokio::test]
async fn descriptors_describe_data_properties() {
    let client = serve_json(json!({"x": 1}));
    let root = import(client);

    let descriptor = immediate::get_own_property_descriptor(&root, "x").await.unwrap().unwrap();
    let missing = immediate::get_own_property_descriptor(&root, "y").await.unwrap();

    assert_eq!(descriptor.value, Some(json!(1)));
    assert_eq!(descriptor.writable, Some(true));
    assert_eq!(descriptor.enumerable, Some(true));
    assert_eq!(descriptor.configurable, Some(true));
    assert!(missing.is_none());
}

#[tokio::test]
async fn extensibility_follows_prevent_extensions() {
    let client = serve_json(json!({"open": {}, "closed": {}}));
    let root = import(client);

    run(&root.get("closed").prevent_extensions()).await.unwrap();

    assert!(immediate::is_extensible(&root.get("open")).await.unwrap());
    assert!(!immediate::is_extensible(&root.get("closed")).await.unwrap());
    assert!(run(&root.get("closed").set("late", 1)).await.is_err());
}

#[tokio::test]
async fn defined_properties_follow_their_attributes() {
    let client = serve_json(json!({"target": {}}));
    let target = import(client).get("target");
    let attributes = PropertyAttributes {
        value: Some(json!("fixed")),
        writable: Some(false),
        enumerable: Some(false),
        configurable: Some(false),
        ..Default::default()
    };

    run(&target.define_property("k", attributes)).await.unwrap();

    assert_eq!(immediate::get(&target, "k").await.unwrap(), Some(json!("fixed")));
    assert!(immediate::own_keys(&target).await.unwrap().contains(&"k".to_string()));
    assert_eq!(run(&target).await.unwrap(), Some(json!({})));
    assert!(run(&target.set("k", "changed")).await.is_err());
    assert!(run(&target.delete_property("k")).await.is_err());
}

#[tokio::test]
async fn prototypes_can_be_read_and_replaced() {
    let client = serve_json(json!({"base": {"inherited": "yes"}, "child": {}}));
    let root = import(client);

    run(&root.get("child").set_prototype_of(json!({"inherited": "from json"}))).await.unwrap();

    assert_eq!(immediate::get(&root.get("child"), "inherited").await.unwrap(), Some(json!("from json")));
    assert!(!immediate::own_keys(&root.get("child")).await.unwrap().contains(&"inherited".to_string()));
    assert_eq!(run(&root.get("child").get_prototype_of()).await.unwrap(), Some(json!({"inherited": "from json"})));
}

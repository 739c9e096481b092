// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chain replay specs
//!
//! A committed chain must behave exactly like running its operations
//! directly against the root.

use crate::prelude::*;
use proptest::prelude::*;

#[tokio::test]
async fn get_on_a_plain_root_returns_the_property() {
    let client = serve_json(json!({"x": 1}));

    assert_eq!(run(&import(client).get("x")).await.unwrap(), Some(json!(1)));
}

#[tokio::test]
async fn methods_are_called_on_their_owner() {
    let realm = Realm::new();
    let counter = realm.new_object();
    put(&counter, "count", 41);
    let bump = realm.new_function("bump", |realm, this, _args| {
        let key = PropertyKey::from("count");
        let next = realm.get(&this, &key)?.as_number().unwrap_or_default() + 1.0;
        realm.set(&this, &key, Value::from(next))?;
        Ok(Value::from(next))
    });
    put(&counter, "bump", bump);
    let client = serve(&realm, Value::Object(counter.clone()));

    let returned = run(&import(client.clone()).call("bump", vec![])).await.unwrap();

    assert_eq!(returned, Some(json!(42)));
    assert_eq!(run(&import(client).get("count")).await.unwrap(), Some(json!(42)));
}

#[tokio::test]
async fn mutations_do_not_move_the_chain() {
    let client = serve_json(json!({"a": {"c": "from a"}, "c": "from root"}));

    let chain = import(client).get("a").set("b", 2).get("c");

    assert_eq!(run(&chain).await.unwrap(), Some(json!("from a")));
}

#[tokio::test]
async fn mutations_are_visible_to_later_commits() {
    let client = serve_json(json!({"inner": {}}));
    let root = import(client);

    run(&root.get("inner").set("flag", true)).await.unwrap();
    run(&root.get("inner").delete_property("missing")).await.unwrap();

    assert_eq!(run(&root.get("inner")).await.unwrap(), Some(json!({"flag": true})));
}

#[tokio::test]
async fn handles_are_reusable_prefixes() {
    let client = serve_json(json!({"a": {"b": 1, "c": 2}}));
    let a = import(client).get("a");

    let b = run(&a.get("b")).await.unwrap();
    let c = run(&a.get("c")).await.unwrap();

    assert_eq!((b, c), (Some(json!(1)), Some(json!(2))));
    assert_eq!(a.len(), 1);
}

#[derive(Debug, Clone)]
enum Step {
    Get(&'static str),
    Set(&'static str, i32),
    Has(&'static str),
}

/// What the chain is pointing at while it is evaluated directly
#[derive(Debug, Clone)]
enum Cursor {
    Node(Vec<&'static str>),
    Bool(bool),
    Undefined,
}

fn node<'a>(root: &'a mut Json, path: &[&str]) -> &'a mut Json {
    path.iter().fold(root, |value, key| &mut value[*key])
}

/// Apply `steps` to `root` eagerly; `None` when a step throws
fn evaluate(mut root: Json, steps: &[Step]) -> Option<Option<Json>> {
    let mut cursor = Cursor::Node(Vec::new());
    for step in steps {
        match (step, cursor.clone()) {
            (_, Cursor::Undefined) => return None,
            (Step::Get(_), Cursor::Bool(_)) => cursor = Cursor::Undefined,
            (Step::Set(..) | Step::Has(_), Cursor::Bool(_)) => return None,
            (step, Cursor::Node(path)) => {
                let target = node(&mut root, &path);
                let Some(object) = target.as_object_mut() else {
                    match step {
                        Step::Get(_) => cursor = Cursor::Undefined,
                        Step::Set(..) | Step::Has(_) => return None,
                    }
                    continue;
                };
                match step {
                    Step::Get(key) if object.contains_key(*key) => {
                        let mut next = path;
                        next.push(*key);
                        cursor = Cursor::Node(next);
                    }
                    Step::Get(_) => cursor = Cursor::Undefined,
                    Step::Set(key, n) => {
                        object.insert(key.to_string(), json!(n));
                    }
                    Step::Has(key) => cursor = Cursor::Bool(object.contains_key(*key)),
                }
            }
        }
    }
    Some(match cursor {
        Cursor::Node(path) => Some(node(&mut root, &path).clone()),
        Cursor::Bool(b) => Some(json!(b)),
        Cursor::Undefined => None,
    })
}

fn chain(root: Handle, steps: &[Step]) -> Handle {
    steps.iter().fold(root, |handle, step| match step {
        Step::Get(key) => handle.get(*key),
        Step::Set(key, n) => handle.set(*key, *n),
        Step::Has(key) => handle.has(*key),
    })
}

fn key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "b", "c"])
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => key().prop_map(Step::Get),
        1 => (key(), -5..5i32).prop_map(|(k, n)| Step::Set(k, n)),
        1 => key().prop_map(Step::Has),
    ]
}

fn tree() -> impl Strategy<Value = Json> {
    let leaf = (-100..100i32).prop_map(|n| json!(n));
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop::collection::btree_map(key(), inner, 0..3)
            .prop_map(|map| Json::Object(map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()))
    })
}

fn root_tree() -> impl Strategy<Value = Json> {
    prop::collection::btree_map(key(), tree(), 0..3)
        .prop_map(|map| Json::Object(map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn replay_matches_direct_evaluation(root in root_tree(), steps in prop::collection::vec(step(), 0..6)) {
        let expected = evaluate(root.clone(), &steps);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let actual = runtime.block_on(async {
            let client = serve_json(root);
            run(&chain(import(client), &steps)).await
        });

        match expected {
            Some(value) => prop_assert_eq!(actual.ok(), Some(value)),
            None => prop_assert!(actual.is_err(), "expected a throw, got {:?}", actual),
        }
    }
}

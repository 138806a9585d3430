//! # Task Lifecycle Tests for Instance Contracts (qc-11)
//!
//! End-to-end runs of the task factory against an in-memory page.
//!
//! ## Test Categories
//!
//! 1. **Coin Scenario** - spawn, invoke, delete of a balance instance
//! 2. **Lifecycle Rules** - collisions, missing instances, deletion
//! 3. **Access Enforcement** - denied and granted invokes
//! 4. **Fingerprint Determinism** - stability and sensitivity (proptest)

use proptest::prelude::*;
use qc_11_instance_contracts::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// TEST HELPERS
// =============================================================================

const A0: &[u8] = b"A0";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Serialize, Deserialize)]
struct Balance {
    balance: i64,
}

#[derive(Deserialize)]
struct Delta {
    delta: i64,
}

/// Spawns `{balance: 100}` under `A0` whatever the argument; invoke applies a delta.
struct Coin;

impl Contract for Coin {
    fn spawn(&self, _: &SpawnContext<'_>) -> Result<(Payload, AccessControlId), ContractError> {
        let value = Payload::from_serializable(&Balance { balance: 100 })?;
        Ok((value, AccessControlId::new(A0.to_vec())))
    }

    fn invoke(&self, ctx: &InvokeContext<'_>) -> Result<Payload, ContractError> {
        let Delta { delta } = ctx
            .argument()
            .decode()
            .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        let Balance { balance } = ctx.current().value.decode()?;

        if balance + delta < 0 {
            return Err(ContractError::Rejected("insufficient balance".to_string()));
        }
        Ok(Payload::from_serializable(&Balance {
            balance: balance + delta,
        })?)
    }
}

/// Policy granting every rule to every identity.
struct AllowAll;

impl AccessControl for AllowAll {
    fn match_rule(&self, _: &Rule, _: &Identity) -> Result<(), AccessError> {
        Ok(())
    }
}

impl fmt::Display for AllowAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allow-all")
    }
}

/// Decodes `{"allow_all": true}`, falling back to rule policies otherwise.
struct PermissiveFactory;

impl AccessControlFactory for PermissiveFactory {
    fn decode(&self, payload: &Payload) -> Result<Box<dyn AccessControl>, AccessError> {
        if payload.as_value().get("allow_all") == Some(&Value::Bool(true)) {
            return Ok(Box::new(AllowAll));
        }
        RuleAccessControlFactory.decode(payload)
    }
}

fn i1() -> Identity {
    Identity::new(vec![0x11])
}

fn key(bytes: &[u8]) -> InstanceKey {
    InstanceKey::new(bytes.to_vec())
}

fn tx(id: &[u8], identity: Identity) -> TransactionContext {
    TransactionContext::new(key(id), identity)
}

fn policy_instance(value: Payload) -> Instance {
    Instance::new(key(A0), "arc", AccessControlId::new(A0.to_vec()), value)
}

fn coin_factory() -> TaskFactory {
    let mut factory = TaskFactory::new(TaskConfig::default())
        .with_access_control_factory(Box::new(PermissiveFactory));
    factory.register("coin", Arc::new(Coin));
    factory
}

fn allow_all_page() -> InMemoryPage {
    let mut page = InMemoryPage::new();
    page.insert(policy_instance(Payload::new(json!({"allow_all": true}))));
    page
}

/// Page whose `A0` policy lets only `I1` spawn and invoke coins.
fn restricted_page() -> InMemoryPage {
    let policy = RuleAccessControl::new()
        .allow(Rule::compile("coin", Action::Spawn), &i1())
        .allow(Rule::compile("coin", Action::Invoke), &i1());
    let mut page = InMemoryPage::new();
    page.insert(policy_instance(policy.to_payload().unwrap()));
    page
}

// =============================================================================
// COIN SCENARIO
// =============================================================================

#[test]
fn test_coin_spawn_invoke_delete() {
    init_tracing();
    let factory = coin_factory();
    let mut page = allow_all_page();
    let k1 = key(b"k1");

    let spawn = factory
        .decode(br#"{"type":"spawn","contract_id":"coin"}"#)
        .unwrap();
    factory.consume(&spawn, &tx(b"k1", i1()), &mut page).unwrap();

    let spawned = page.read(&k1).unwrap();
    assert_eq!(spawned.key, k1);
    assert_eq!(spawned.contract_id, "coin");
    assert_eq!(spawned.access_control_id, AccessControlId::new(A0.to_vec()));
    assert!(!spawned.deleted);
    assert_eq!(spawned.value.as_value(), &json!({"balance": 100}));

    let invoke = factory
        .decode(br#"{"type":"invoke","key":"6b31","argument":{"delta":-30}}"#)
        .unwrap();
    factory.consume(&invoke, &tx(b"t2", i1()), &mut page).unwrap();

    let invoked = page.read(&k1).unwrap();
    assert_eq!(invoked.value.as_value(), &json!({"balance": 70}));
    assert_eq!(invoked.contract_id, spawned.contract_id);
    assert_eq!(invoked.access_control_id, spawned.access_control_id);
    assert!(!invoked.deleted);

    let delete = factory.decode(br#"{"type":"delete","key":"6b31"}"#).unwrap();
    factory.consume(&delete, &tx(b"t3", i1()), &mut page).unwrap();

    let deleted = page.read(&k1).unwrap();
    assert!(deleted.deleted);
    assert_eq!(deleted.value.as_value(), &json!({"balance": 70}));
    assert_eq!(deleted.key, k1);

    let stats = factory.stats();
    assert_eq!((stats.spawned, stats.invoked, stats.deleted), (1, 1, 1));
    assert_eq!(stats.failed, 0);
}

#[test]
fn test_coin_contract_rejection_keeps_balance() {
    let factory = coin_factory();
    let mut page = allow_all_page();

    factory
        .consume(&ClientTask::spawn("coin", Payload::null()), &tx(b"k1", i1()), &mut page)
        .unwrap();
    let snapshot = page.clone();

    let err = factory
        .consume(
            &ClientTask::invoke(key(b"k1"), Payload::new(json!({"delta": -500}))),
            &tx(b"t2", i1()),
            &mut page,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        TaskError::ContractExecutionFailed {
            source: ContractError::Rejected(_),
            ..
        }
    ));
    assert_eq!(page, snapshot);
}

// =============================================================================
// LIFECYCLE RULES
// =============================================================================

#[test]
fn test_spawn_collision_leaves_first_spawn_state() {
    let factory = coin_factory();
    let mut page = allow_all_page();
    let spawn = ClientTask::spawn("coin", Payload::null());

    factory.consume(&spawn, &tx(b"k1", i1()), &mut page).unwrap();
    let after_first = page.clone();

    let err = factory.consume(&spawn, &tx(b"k1", i1()), &mut page).unwrap_err();
    assert!(matches!(err, TaskError::AlreadyExists { .. }));
    assert_eq!(page, after_first);
}

#[test]
fn test_invoke_and_delete_require_existence() {
    let factory = coin_factory();
    let mut page = allow_all_page();
    let snapshot = page.clone();

    let err = factory
        .consume(
            &ClientTask::invoke(key(b"ghost"), Payload::new(json!({"delta": 1}))),
            &tx(b"t1", i1()),
            &mut page,
        )
        .unwrap_err();
    assert!(err.is_not_found());

    let err = factory
        .consume(&ClientTask::delete(key(b"ghost")), &tx(b"t2", i1()), &mut page)
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(page, snapshot);
}

#[test]
fn test_strict_config_rejects_deleted_instance() {
    let mut factory = TaskFactory::new(TaskConfig::strict())
        .with_access_control_factory(Box::new(PermissiveFactory));
    factory.register("coin", Arc::new(Coin));
    let mut page = allow_all_page();

    factory
        .consume(&ClientTask::spawn("coin", Payload::null()), &tx(b"k1", i1()), &mut page)
        .unwrap();
    factory
        .consume(&ClientTask::delete(key(b"k1")), &tx(b"t2", i1()), &mut page)
        .unwrap();

    let err = factory
        .consume(
            &ClientTask::invoke(key(b"k1"), Payload::new(json!({"delta": 1}))),
            &tx(b"t3", i1()),
            &mut page,
        )
        .unwrap_err();
    assert!(matches!(err, TaskError::InstanceDeleted { .. }));
}

// =============================================================================
// ACCESS ENFORCEMENT
// =============================================================================

#[test]
fn test_invoke_denied_for_unlisted_identity() {
    let factory = coin_factory();
    let mut page = restricted_page();

    factory
        .consume(&ClientTask::spawn("coin", Payload::null()), &tx(b"k1", i1()), &mut page)
        .unwrap();

    let intruder = Identity::new(vec![0x99]);
    let err = factory
        .consume(
            &ClientTask::invoke(key(b"k1"), Payload::new(json!({"delta": -100}))),
            &tx(b"t2", intruder),
            &mut page,
        )
        .unwrap_err();

    match &err {
        TaskError::AccessDenied { identity, rule, .. } => {
            assert_eq!(identity, "99");
            assert_eq!(rule.as_str(), "coin:invoke");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(page.read(&key(b"k1")).unwrap().value.as_value(), &json!({"balance": 100}));
    assert_eq!(factory.stats().access_denied, 1);
}

#[test]
fn test_invoke_granted_reflects_contract_output() {
    let factory = coin_factory();
    let mut page = restricted_page();

    factory
        .consume(&ClientTask::spawn("coin", Payload::null()), &tx(b"k1", i1()), &mut page)
        .unwrap();
    factory
        .consume(
            &ClientTask::invoke(key(b"k1"), Payload::new(json!({"delta": 5}))),
            &tx(b"t2", i1()),
            &mut page,
        )
        .unwrap();

    assert_eq!(page.read(&key(b"k1")).unwrap().value.as_value(), &json!({"balance": 105}));
}

#[test]
fn test_spawn_denied_for_unlisted_identity() {
    let factory = coin_factory();
    let mut page = restricted_page();
    let snapshot = page.clone();

    let err = factory
        .consume(
            &ClientTask::spawn("coin", Payload::null()),
            &tx(b"k1", Identity::new(vec![0x99])),
            &mut page,
        )
        .unwrap_err();

    assert!(err.is_access_denied());
    assert_eq!(page, snapshot);
}

// =============================================================================
// FINGERPRINT DETERMINISM
// =============================================================================

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

fn json_object() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec(("[a-z]{1,6}", json_leaf()), 0..8)
}

fn object_from(entries: impl IntoIterator<Item = (String, Value)>) -> Value {
    let mut map = Map::new();
    for (k, v) in entries {
        map.insert(k, v);
    }
    Value::Object(map)
}

proptest! {
    #[test]
    fn fingerprint_ignores_map_insertion_order(entries in json_object()) {
        let factory = TaskFactory::default();

        let forward = object_from(entries.clone());
        let backward = object_from(entries.into_iter().rev());
        // Reversed insertion keeps the last duplicate in the other map.
        prop_assume!(forward == backward);

        let a = ClientTask::spawn("coin", Payload::new(forward));
        let b = ClientTask::spawn("coin", Payload::new(backward));

        let mut first = Vec::new();
        let mut second = Vec::new();
        factory.fingerprint(&a, &mut first).unwrap();
        factory.fingerprint(&b, &mut second).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(factory.digest(&a).unwrap(), factory.digest(&b).unwrap());
    }

    #[test]
    fn fingerprint_covers_invoke_key(
        k1 in prop::collection::vec(any::<u8>(), 1..16),
        k2 in prop::collection::vec(any::<u8>(), 1..16),
        entries in json_object(),
    ) {
        prop_assume!(k1 != k2);
        let factory = TaskFactory::default();
        let argument = Payload::new(object_from(entries));

        let a = ClientTask::invoke(InstanceKey::new(k1), argument.clone());
        let b = ClientTask::invoke(InstanceKey::new(k2), argument);

        prop_assert_ne!(factory.digest(&a).unwrap(), factory.digest(&b).unwrap());
    }

    #[test]
    fn decoded_task_fingerprints_like_original(entries in json_object(), contract in "[a-z]{1,8}") {
        let factory = TaskFactory::default();
        let task = ClientTask::spawn(contract, Payload::new(object_from(entries)));

        let decoded = factory.decode(&factory.encode(&task).unwrap()).unwrap();
        prop_assert_eq!(factory.digest(&decoded).unwrap(), factory.digest(&task).unwrap());
    }
}

#[test]
fn test_spawn_fingerprint_independent_of_context() {
    let a = coin_factory();
    let b = TaskFactory::default();
    let task = ClientTask::spawn("coin", Payload::new(json!({"memo": "x"})));

    assert_eq!(a.digest(&task).unwrap(), b.digest(&task).unwrap());
}

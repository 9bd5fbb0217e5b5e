//! Chain builder behaviour against the real base contracts.
//!
//! Tests cover:
//! - Cycle detection over generated parent rings
//! - Protected overlay (descendant's version wins)
//! - Supers flattening across every ancestor
//! - Event arguments reaching constructors of controller chains only
//! - Kind contracts seeding the root of a chain

use atrium_chain::{ChainBuilder, base_contracts};
use atrium_core::test_utils::{CallLog, ProbeClass, detached};
use atrium_core::*;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

fn builder_with(probes: Vec<ProbeClass>) -> ChainBuilder {
    let mut table = base_contracts().unwrap();
    for probe in probes {
        table.define(probe.descriptor()).unwrap();
    }
    ChainBuilder::new(Arc::new(table), detached())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cycles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn self_parent_is_a_cycle() {
    let log = CallLog::new();
    let b = builder_with(vec![ProbeClass::new("t.Loop", &log).extends("t.Loop")]);
    let err = b
        .instantiate(&"t.Loop".into(), ModuleKind::None, None)
        .unwrap_err();
    assert!(matches!(err, AtriumError::CyclicInheritance(c) if c.as_str() == "t.Loop"));
    assert!(log.matching("create").is_empty());
}

proptest! {
    #[test]
    fn parent_rings_always_fail(len in 1usize..8, start in 0usize..8, kind in prop_oneof![
        Just(ModuleKind::None),
        Just(ModuleKind::Model),
        Just(ModuleKind::Page),
        Just(ModuleKind::Controller),
    ]) {
        let log = CallLog::new();
        let probes = (0..len)
            .map(|i| ProbeClass::new(format!("ring.C{i}"), &log).extends(format!("ring.C{}", (i + 1) % len)))
            .collect();
        let b = builder_with(probes);
        let start = ClassName::new(format!("ring.C{}", start % len));
        let result = b.instantiate(&start, kind, None);
        prop_assert!(matches!(result, Err(AtriumError::CyclicInheritance(_))));
        prop_assert!(matches!(b.inspect(&start), Err(AtriumError::CyclicInheritance(_))));
    }

    #[test]
    fn straight_lines_resolve_every_level(len in 1usize..8) {
        let log = CallLog::new();
        let probes = (0..len)
            .map(|i| {
                let probe = ProbeClass::new(format!("line.C{i}"), &log);
                if i + 1 < len { probe.extends(format!("line.C{}", i + 1)) } else { probe }
            })
            .collect();
        let b = builder_with(probes);
        let inst = b.instantiate(&"line.C0".into(), ModuleKind::None, None).unwrap();
        prop_assert_eq!(inst.lineage().len(), len);
        prop_assert_eq!(log.count("create"), len);
        prop_assert_eq!(b.inspect(&"line.C0".into()).unwrap().len(), len);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Protected scope and supers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn descendant_protected_overrides_ancestor() {
    let log = CallLog::new();
    let b = builder_with(vec![
        ProbeClass::new("t.A", &log).protected("foo", json!("from A")),
        ProbeClass::new("t.B", &log)
            .extends("t.A")
            .protected("foo", json!("from B")),
        ProbeClass::new("t.C", &log).extends("t.B"),
    ]);
    let inst = b.instantiate(&"t.C".into(), ModuleKind::None, None).unwrap();
    assert_eq!(inst.call("protected", json!("foo")).unwrap(), json!("from B"));
    // The base of C sees only what A contributed.
    let base = inst.base().unwrap();
    assert_eq!(base.class().as_str(), "t.B");
    assert_eq!(log.matching("create t.B"), vec!["create t.B sees [foo]"]);
}

#[test]
fn protected_never_reaches_the_public_surface() {
    let log = CallLog::new();
    let b = builder_with(vec![
        ProbeClass::new("t.A", &log).protected("secret", json!(1)),
        ProbeClass::new("t.B", &log).extends("t.A"),
    ]);
    let inst = b.instantiate(&"t.B".into(), ModuleKind::None, None).unwrap();
    assert!(!inst.responds_to("secret"));
    assert!(matches!(
        inst.call("secret", Value::Null),
        Err(AtriumError::CapabilityNotFound { .. })
    ));
}

#[test]
fn supers_flatten_every_ancestor() {
    let log = CallLog::new();
    let b = builder_with(vec![
        ProbeClass::new("t.A", &log)
            .public("x", json!("A.x"))
            .public("shared", json!("A")),
        ProbeClass::new("t.B", &log)
            .extends("t.A")
            .public("y", json!("B.y"))
            .public("shared", json!("B")),
        ProbeClass::new("t.C", &log).extends("t.B"),
    ]);
    let inst = b.instantiate(&"t.C".into(), ModuleKind::None, None).unwrap();
    let supers = inst.supers();
    assert_eq!(supers.call("x", Value::Null).unwrap(), json!("A.x"));
    assert_eq!(supers.call("y", Value::Null).unwrap(), json!("B.y"));
    assert_eq!(supers.call("shared", Value::Null).unwrap(), json!("B"));
    assert_eq!(inst.call("x", Value::Null).unwrap(), json!("A.x"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Kinds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn controller_chains_receive_event_arguments_at_every_level() {
    let log = CallLog::new();
    let b = builder_with(vec![
        ProbeClass::new("c.Base", &log),
        ProbeClass::new("c.Go", &log).extends("c.Base"),
    ]);
    let event = EventArgs::new("go", json!(1));
    b.instantiate(&"c.Go".into(), ModuleKind::Controller, Some(event.clone()))
        .unwrap();
    assert_eq!(
        log.matching("new"),
        vec!["new c.Base for c.Go on go 1", "new c.Go for c.Go on go 1"]
    );

    log.clear();
    b.instantiate(&"c.Go".into(), ModuleKind::None, Some(event))
        .unwrap();
    assert_eq!(
        log.matching("new"),
        vec!["new c.Base for c.Go", "new c.Go for c.Go"]
    );
}

#[test]
fn model_chain_is_rooted_at_the_model_contract() {
    let log = CallLog::new();
    let b = builder_with(vec![
        ProbeClass::new("m.Data", &log),
        ProbeClass::new("m.Hi", &log).extends("m.Data"),
    ]);
    let inst = b.instantiate(&"m.Hi".into(), ModuleKind::Model, None).unwrap();
    let lineage: Vec<&str> = inst.lineage().iter().map(|c| c.as_str()).collect();
    assert_eq!(lineage, vec!["m.Hi", "m.Data", kind::MODEL_BASE]);
    assert_eq!(
        log.matching("create"),
        vec![
            "create m.Data sees [getData,setData]",
            "create m.Hi sees [getData,setData]"
        ]
    );
    assert_eq!(inst.call("protected", json!("getData")).unwrap(), Value::Null);
}

#[test]
fn contract_requested_directly_has_no_base() {
    let b = builder_with(Vec::new());
    let inst = b
        .instantiate(&kind::CONTROLLER_BASE.into(), ModuleKind::Controller, None)
        .unwrap();
    assert!(inst.base().is_none());
}

#[test]
fn plain_kind_has_no_contract() {
    let log = CallLog::new();
    let b = builder_with(vec![ProbeClass::new("t.Solo", &log)]);
    let inst = b.instantiate(&"t.Solo".into(), ModuleKind::None, None).unwrap();
    assert_eq!(inst.lineage().len(), 1);
    assert!(inst.is_created());
}

//! The ten concrete scenarios of the evaluation core's contract: each test
//! below is named for what it checks, not its original scenario number.

#[path = "support/mod.rs"]
mod support;

use std::sync::atomic::Ordering;

use ripplegraph_engine::{ComputorOutput, EngineError, Schema};
use ripplegraph_schema::{compile, SchemaError};
use serde_json::json;
use support::{counted_schema, engine_at, increment_count, source_schema, temp_engine};

#[test]
fn linear_chain_lazy_pull() {
    let (level3, level3_calls) = counted_schema("level3", vec!["level2".into()], increment_count);
    let schemas = vec![
        source_schema("input1"),
        Schema::new("level1", vec!["input1".into()], increment_count),
        Schema::new("level2", vec!["level1".into()], increment_count),
        level3,
    ];
    let (mut engine, _dir) = temp_engine(schemas);

    engine.set("input1", json!({"count": 1})).unwrap();
    let result = engine.pull("level2", &[]).unwrap();

    assert_eq!(result, json!({"count": 3}));
    assert_eq!(level3_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn cached_pull_invokes_no_computors() {
    let (output1, calls) = counted_schema("output1", Vec::new(), |_, _, _| {
        Ok(ComputorOutput::Value(json!({"v": 1})))
    });
    let (mut engine, _dir) = temp_engine(vec![output1]);

    let first = engine.pull("output1", &[]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = engine.pull("output1", &[]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
}

#[test]
fn unchanged_propagates_up_to_date() {
    let (b, b_calls) = counted_schema("b", vec!["a".into()], |_inputs, previous, _| {
        if previous.is_none() {
            Ok(ComputorOutput::Value(json!({"marker": 1})))
        } else {
            Ok(ComputorOutput::Unchanged)
        }
    });
    let (c, c_calls) = counted_schema("c", vec!["b".into()], |_inputs, _previous, _| {
        Ok(ComputorOutput::Value(json!({"seen": true})))
    });
    let (mut engine, _dir) = temp_engine(vec![source_schema("a"), b, c]);

    engine.set("a", json!({"data": "old"})).unwrap();
    engine.pull("c", &[]).unwrap();
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 1);

    engine.set("a", json!({"data": "new"})).unwrap();
    let result = engine.pull("c", &[]).unwrap();

    assert_eq!(b_calls.load(Ordering::SeqCst), 2);
    assert_eq!(c_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result, json!({"seen": true}));

    for node in ["a", "b", "c"] {
        assert_eq!(
            engine.debug_get_freshness(node).unwrap(),
            ripplegraph_core::FreshnessState::UpToDate,
            "{node} should be up-to-date"
        );
    }
}

#[test]
fn diamond_with_one_unchanged_path_recomputes() {
    let (b, _b_calls) = counted_schema("b", vec!["a".into()], |inputs, _, _| {
        let v = inputs[0]["v"].as_i64().ok_or("missing v")?;
        Ok(ComputorOutput::Value(json!({"v": v * 2})))
    });
    let (c, _c_calls) = counted_schema("c", vec!["a".into()], |_inputs, previous, _| {
        if previous.is_none() {
            Ok(ComputorOutput::Value(json!({"marker": 1})))
        } else {
            Ok(ComputorOutput::Unchanged)
        }
    });
    let (d, d_calls) = counted_schema("d", vec!["b".into(), "c".into()], |inputs, _, _| {
        let b_v = inputs[0]["v"].as_i64().ok_or("missing b.v")?;
        let c_marker = inputs[1]["marker"].as_i64().ok_or("missing c.marker")?;
        Ok(ComputorOutput::Value(json!({"sum": b_v + c_marker})))
    });
    let (mut engine, _dir) = temp_engine(vec![source_schema("a"), b, c, d]);

    engine.set("a", json!({"v": 1})).unwrap();
    let first = engine.pull("d", &[]).unwrap();
    assert_eq!(first, json!({"sum": 3}));
    assert_eq!(d_calls.load(Ordering::SeqCst), 1);

    engine.set("a", json!({"v": 2})).unwrap();
    let second = engine.pull("d", &[]).unwrap();

    assert_eq!(second, json!({"sum": 5}));
    assert_eq!(d_calls.load(Ordering::SeqCst), 2);
}

fn never_invoked(
    _inputs: &[serde_json::Value],
    _previous: Option<&serde_json::Value>,
    _bindings: &[serde_json::Value],
) -> Result<ComputorOutput, Box<dyn std::error::Error + Send + Sync>> {
    Ok(ComputorOutput::Value(json!({})))
}

#[test]
fn cycle_rejected() {
    let schemas = vec![
        Schema::new("n1", vec!["n2".into()], never_invoked),
        Schema::new("n2", vec!["n1".into()], never_invoked),
    ];

    let err = compile(schemas).unwrap_err();
    assert!(matches!(err, SchemaError::Cycle { .. }), "expected a cycle error, got {err:?}");
}

#[test]
fn overlap_rejected() {
    let schemas = vec![
        Schema::new("node(x)", Vec::new(), never_invoked),
        Schema::new("node(y)", Vec::new(), never_invoked),
    ];

    let err = compile(schemas).unwrap_err();
    assert!(
        matches!(err, SchemaError::Overlap { .. }),
        "expected an overlap error, got {err:?}"
    );
}

#[test]
fn canonicalization_normalizes_pull_key() {
    let (derived, calls) = counted_schema("derived(x)", vec!["base".into()], |inputs, _, bindings| {
        Ok(ComputorOutput::Value(json!({
            "base_v": inputs[0]["v"],
            "x": bindings[0],
        })))
    });
    let (mut engine, _dir) = temp_engine(vec![source_schema("base"), derived]);

    engine.set("base", json!({"v": 5})).unwrap();
    let result = engine.pull(r#"derived ( "data"  )"#, &[]).unwrap();
    assert_eq!(result, json!({"base_v": 5, "x": "data"}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let again = engine.pull(r#"derived("data")"#, &[]).unwrap();
    assert_eq!(again, result);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn bindings_produce_distinct_instances() {
    let (derived, calls) = counted_schema("derived(x)", vec!["source".into()], |_inputs, _, bindings| {
        Ok(ComputorOutput::Value(json!({ "x": bindings[0] })))
    });
    let (mut engine, _dir) = temp_engine(vec![source_schema("source"), derived]);
    engine.set("source", json!({"v": 1})).unwrap();

    let first_binding = json!({"events": ["first"]});
    let second_binding = json!({"events": ["second"]});

    engine.pull("derived(x)", &[first_binding.clone()]).unwrap();
    engine.pull("derived(x)", &[second_binding]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    engine.pull("derived(x)", &[first_binding]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn schema_isolation_across_restart() {
    let dir = tempfile::TempDir::new().unwrap();

    let schema_a = || source_schema("shared");
    let mut engine1 = engine_at(dir.path(), vec![schema_a()]);
    engine1.set("shared", json!({"v": 1})).unwrap();
    assert_eq!(
        engine1.debug_get_freshness("shared").unwrap(),
        ripplegraph_core::FreshnessState::UpToDate
    );
    engine1.close().unwrap();

    // A different schema list (an extra, unrelated schema) hashes to a
    // different namespace even at the same store root.
    let mut engine2 = engine_at(
        dir.path(),
        vec![
            schema_a(),
            source_schema("unrelated"),
        ],
    );
    assert_eq!(
        engine2.debug_get_freshness("shared").unwrap(),
        ripplegraph_core::FreshnessState::Missing
    );
    engine2.set("unrelated", json!({"v": 9})).unwrap();
    engine2.invalidate("shared").unwrap();
    engine2.close().unwrap();

    let mut engine1_again = engine_at(dir.path(), vec![schema_a()]);
    assert_eq!(
        engine1_again.debug_get_freshness("shared").unwrap(),
        ripplegraph_core::FreshnessState::UpToDate
    );
}

#[test]
fn persistent_revdeps_after_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let schemas = || {
        let (c, c_calls) = counted_schema("c", vec!["b".into()], increment_count);
        (
            vec![
                source_schema("a"),
                Schema::new("b", vec!["a".into()], increment_count),
                c,
            ],
            c_calls,
        )
    };

    let (built, _first_c_calls) = schemas();
    let mut engine = engine_at(dir.path(), built);
    engine.set("a", json!({"count": 1})).unwrap();
    engine.pull("c", &[]).unwrap();
    engine.close().unwrap();

    let (reopened, c_calls) = schemas();
    let mut engine = engine_at(dir.path(), reopened);
    assert_eq!(
        engine.debug_get_freshness("c").unwrap(),
        ripplegraph_core::FreshnessState::UpToDate
    );

    engine.set("a", json!({"count": 2})).unwrap();
    assert_eq!(
        engine.debug_get_freshness("c").unwrap(),
        ripplegraph_core::FreshnessState::PotentiallyOutdated,
        "the cascade from the first engine's revdep index must still reach c"
    );

    let result = engine.pull("c", &[]).unwrap();
    assert_eq!(result, json!({"count": 4}));
    assert_eq!(c_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_schema_is_a_distinct_error() {
    let (mut engine, _dir) = temp_engine(vec![source_schema("known")]);
    let err = engine.pull("nope", &[]).unwrap_err();
    assert!(matches!(err, EngineError::UnknownSchema { .. }));
}

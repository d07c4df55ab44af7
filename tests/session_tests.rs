//! Integration tests for the runtime session: loading, running, fail-fast
//! halting, and error absorption at the task boundary.

mod common;

use common::*;
use indexmap::IndexMap;
use playlet::backend::BackendError;
use playlet::host::Host;
use playlet::playbook::{Play, TaskBlock};
use playlet::session::RuntimeSession;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn no_vars() -> IndexMap<String, Value> {
    IndexMap::new()
}

#[test]
fn test_two_task_scenario_end_to_end() {
    // First task succeeds with a change, second fails, a loaded third task
    // never runs.
    let mut session = RuntimeSession::new(Host::new("web01"));
    session
        .load_playbook(
            r#"
- name: Scenario
  tasks:
    - name: make a change
      command: echo changing
    - name: stop here
      fail:
        msg: broken on purpose
    - name: never reached
      command: echo unreachable code
"#,
            no_vars(),
        )
        .unwrap();

    let results = session.run_all(&no_vars()).unwrap();
    let host_results = results.get("web01").unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(host_results.len(), 2);
    assert_eq!(host_results[0]["result"]["changed"], json!(true));
    assert_eq!(host_results[1]["result"]["failed"], json!(true));
    assert_eq!(
        host_results[1]["invocation"]["taskname"],
        json!("stop here")
    );
}

#[test]
fn test_first_failure_at_k_yields_k_results() {
    // For every failure position, run_play returns exactly that many
    // results and the last one is the failed one.
    for k in 1..=4usize {
        let mut play = Play::new("param");
        for i in 1..=4usize {
            let action = if i == k { "fail" } else { "debug" };
            let args = if i == k {
                json!({})
            } else {
                json!({"msg": format!("task {}", i)})
            };
            play = play.with_task(playlet::playbook::Task::new(
                format!("t{}", i),
                action,
                args,
            ));
        }

        let session = RuntimeSession::new(Host::new("localhost"));
        let results = session.run_play(&play, &no_vars()).unwrap();

        assert_eq!(results.len(), k, "failure at task {}", k);
        assert_eq!(results[k - 1]["result"]["failed"], json!(true));
        for result in &results[..k - 1] {
            assert!(result["result"]["failed"].is_null());
        }
    }
}

#[test]
fn test_failure_halts_across_blocks() {
    // A failure in an earlier block must stop later blocks too.
    let play = Play::new("blocks")
        .with_block(TaskBlock::new(
            "first",
            vec![
                playlet::playbook::Task::new("ok", "debug", json!({"msg": "fine"})),
                playlet::playbook::Task::new("boom", "fail", json!({})),
            ],
        ))
        .with_block(TaskBlock::new(
            "second",
            vec![playlet::playbook::Task::new(
                "after",
                "debug",
                json!({"msg": "must not run"}),
            )],
        ));

    let session = RuntimeSession::new(Host::new("localhost"));
    let results = session.run_play(&play, &no_vars()).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["invocation"]["taskname"], json!("boom"));
}

#[test]
fn test_multiple_plays_concatenate_in_order() {
    let mut session = RuntimeSession::new(Host::new("db01"));
    session
        .load_playbook(
            r#"
- name: First
  tasks:
    - name: a
      debug:
        msg: one
- name: Second
  tasks:
    - name: b
      debug:
        msg: two
"#,
            no_vars(),
        )
        .unwrap();

    let results = session.run_all(&no_vars()).unwrap();
    let host_results = results.get("db01").unwrap();

    assert_eq!(host_results.len(), 2);
    assert_eq!(host_results[0]["invocation"]["taskname"], json!("a"));
    assert_eq!(host_results[1]["invocation"]["taskname"], json!("b"));
}

#[test]
fn test_failure_in_first_play_does_not_stop_second() {
    // Fail-fast is per play; remaining plays still run.
    let mut session = RuntimeSession::new(Host::new("localhost"));
    session
        .load_playbook(
            r#"
- name: Failing
  tasks:
    - name: boom
      fail: {}
- name: Following
  tasks:
    - name: after
      debug:
        msg: still runs
"#,
            no_vars(),
        )
        .unwrap();

    let results = session.run_all(&no_vars()).unwrap();
    let host_results = results.get("localhost").unwrap();

    assert_eq!(host_results.len(), 2);
    assert_eq!(host_results[0]["result"]["failed"], json!(true));
    assert_eq!(host_results[1]["invocation"]["taskname"], json!("after"));
}

#[test]
fn test_backend_error_becomes_failed_result() {
    let backend = ScriptedBackend::new(|task| {
        if task.name == "explodes" {
            Err(BackendError::Other("kaboom".to_string()))
        } else {
            Ok(ok_result(false))
        }
    });

    let session =
        RuntimeSession::new(Host::new("localhost")).with_backend(Box::new(backend));
    let play = Play::new("absorb")
        .with_task(task("fine", "anything"))
        .with_task(task("explodes", "anything"))
        .with_task(task("never", "anything"));

    let results = session.run_play(&play, &no_vars()).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["result"]["failed"], json!(true));
    assert_eq!(results[1]["invocation"]["error"], json!("kaboom"));
    assert_eq!(results[1]["invocation"]["modname"], json!("anything"));
}

#[test]
fn test_unknown_module_mentions_name_in_error() {
    let session = RuntimeSession::new(Host::new("localhost"));
    let play = Play::new("missing").with_task(task("nope", "definitely_not_a_module"));

    let results = session.run_play(&play, &no_vars()).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["result"]["failed"], json!(true));
    let error = results[0]["invocation"]["error"].as_str().unwrap();
    assert!(error.contains("definitely_not_a_module"));
}

#[test]
fn test_unreachable_is_normalized_to_failed() {
    let backend = ScriptedBackend::new(|_| Ok(unreachable_result()));
    let session =
        RuntimeSession::new(Host::new("unreachable-host")).with_backend(Box::new(backend));
    let play = Play::new("ping")
        .with_task(task("first", "ping"))
        .with_task(task("second", "ping"));

    let results = session.run_play(&play, &no_vars()).unwrap();

    // normalized to failed, and the play halts there
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["result"]["failed"], json!(true));
    assert_eq!(results[0]["result"]["unreachable"], json!(true));
}

#[test]
fn test_backend_missing_invocation_gets_empty_one() {
    let backend = ScriptedBackend::new(|_| {
        let mut raw = playlet::executor::RawResult::new();
        raw.insert("changed".to_string(), json!(false));
        Ok(raw)
    });
    let session =
        RuntimeSession::new(Host::new("localhost")).with_backend(Box::new(backend));
    let play = Play::new("bare").with_task(task("bare", "noop"));

    let results = session.run_play(&play, &no_vars()).unwrap();

    // the default formatter still finds an invocation to augment
    assert_eq!(results[0]["invocation"]["modname"], json!("noop"));
    assert_eq!(results[0]["invocation"]["taskname"], json!("bare"));
}

#[test]
fn test_reload_discards_old_plays() {
    let body_one = r#"
- name: Old
  tasks:
    - name: old task
      debug:
        msg: old
"#;
    let body_two = r#"
- name: New
  tasks:
    - name: new task
      debug:
        msg: new
"#;

    let mut session = RuntimeSession::new(Host::new("localhost"));
    session.load_playbook(body_one, no_vars()).unwrap();
    session.load_playbook(body_two, no_vars()).unwrap();

    let results = session.run_all(&no_vars()).unwrap();
    let host_results = results.get("localhost").unwrap();

    assert_eq!(host_results.len(), 1);
    assert_eq!(host_results[0]["invocation"]["taskname"], json!("new task"));
}

#[test]
fn test_results_are_json_serializable() {
    let mut session = RuntimeSession::new(Host::new("web01"));
    session
        .load_playbook(
            r#"
- name: Serialize
  tasks:
    - name: echo
      command: echo payload
"#,
            no_vars(),
        )
        .unwrap();

    let results = session.run_all(&no_vars()).unwrap();
    let serialized = serde_json::to_string(&results).unwrap();
    let round_trip: Value = serde_json::from_str(&serialized).unwrap();
    assert_eq!(
        round_trip["web01"][0]["result"]["stdout"],
        json!("payload")
    );
}

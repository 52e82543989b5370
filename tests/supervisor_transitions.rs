// tests/supervisor_transitions.rs

//! Role-transition behavior: kill policy, dead-primary resurrection, and
//! recovery from failing on-change commands.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use procwatch::engine::Supervisor;
use procwatch::registry::{ProcessRole, RoleRegistry};
use procwatch_test_utils::builders::ProfileBuilder;
use procwatch_test_utils::{init_tracing, pid_alive, wait_until};

async fn role_pid(registry: &RoleRegistry, role: ProcessRole) -> i32 {
    registry.lock().await.get(role).pid()
}

/// Poll the registry until `pred` holds for the role's pid; returns the pid
/// that satisfied it, or `None` on timeout.
async fn wait_role_pid(
    registry: &RoleRegistry,
    role: ProcessRole,
    timeout: Duration,
    pred: impl Fn(i32) -> bool,
) -> Option<i32> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let pid = role_pid(registry, role).await;
        if pred(pid) {
            return Some(pid);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn wait_for_line(path: &Path, needle: &str, timeout: Duration) -> bool {
    wait_until(timeout, || {
        fs::read_to_string(path)
            .map(|s| s.lines().any(|l| l.contains(needle)))
            .unwrap_or(false)
    })
    .await
}

/// Kill policy on: the primary is interrupted before the action starts.
#[tokio::test(flavor = "multi_thread")]
async fn kill_policy_terminates_the_primary_on_change() {
    init_tracing();

    let registry = Arc::new(RoleRegistry::new());
    let profile = ProfileBuilder::new("sleep 30")
        .on_change("sleep 30")
        .kill_primary(true)
        .work_dir("/tmp")
        .build();
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&registry), profile));

    supervisor.spawn_primary();
    let primary_pid = wait_role_pid(&registry, ProcessRole::Primary, Duration::from_secs(2), |p| {
        p != 0
    })
    .await
    .expect("primary should start");

    tokio::spawn(Arc::clone(&supervisor).handle_change());

    assert!(
        wait_until(Duration::from_secs(3), || !pid_alive(primary_pid)).await,
        "primary should be interrupted by the change"
    );
    assert!(
        wait_role_pid(&registry, ProcessRole::Action, Duration::from_secs(2), |p| p != 0)
            .await
            .is_some(),
        "action should be running"
    );

    supervisor.kill_role(ProcessRole::Action, 1).await.unwrap();
}

/// Kill policy off, primary alive: the primary keeps running, the action
/// runs to completion, and the primary is not restarted.
#[tokio::test(flavor = "multi_thread")]
async fn live_primary_survives_a_change_without_kill_policy() {
    init_tracing();

    let scratch = tempfile::tempdir().unwrap();
    let log = scratch.path().join("events.log");

    let registry = Arc::new(RoleRegistry::new());
    let profile = ProfileBuilder::new("sleep 30")
        .on_change(&format!("echo action >> {}", log.display()))
        .kill_primary(false)
        .work_dir("/tmp")
        .build();
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&registry), profile));

    supervisor.spawn_primary();
    let primary_pid = wait_role_pid(&registry, ProcessRole::Primary, Duration::from_secs(2), |p| {
        p != 0
    })
    .await
    .expect("primary should start");

    tokio::spawn(Arc::clone(&supervisor).handle_change());

    assert!(wait_for_line(&log, "action", Duration::from_secs(3)).await);
    assert!(pid_alive(primary_pid), "primary must not be touched");
    assert_eq!(
        role_pid(&registry, ProcessRole::Primary).await,
        primary_pid,
        "primary record must be unchanged (no restart)"
    );

    // The action exited naturally, so its record clears on its own.
    assert!(
        wait_role_pid(&registry, ProcessRole::Action, Duration::from_secs(2), |p| p == 0)
            .await
            .is_some()
    );

    supervisor.kill_role(ProcessRole::Primary, 1).await.unwrap();
}

/// Kill policy off, primary dead: the change resurrects the primary with
/// the original start command instead of running the action.
#[tokio::test(flavor = "multi_thread")]
async fn dead_primary_is_resurrected_with_the_start_command() {
    init_tracing();

    let scratch = tempfile::tempdir().unwrap();
    let log = scratch.path().join("events.log");

    let registry = Arc::new(RoleRegistry::new());
    let profile = ProfileBuilder::new(&format!("echo primary >> {}; sleep 30", log.display()))
        .on_change(&format!("echo action >> {}", log.display()))
        .kill_primary(false)
        .work_dir("/tmp")
        .build();
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&registry), profile));

    // No primary was ever started; the registry probe reports it dead.
    tokio::spawn(Arc::clone(&supervisor).handle_change());

    assert!(
        wait_for_line(&log, "primary", Duration::from_secs(3)).await,
        "the start command should run, not the action"
    );
    let contents = fs::read_to_string(&log).unwrap();
    assert!(!contents.contains("action"));
    assert_ne!(role_pid(&registry, ProcessRole::Primary).await, 0);
    assert_eq!(role_pid(&registry, ProcessRole::Action).await, 0);

    supervisor.kill_role(ProcessRole::Primary, 1).await.unwrap();
}

/// A failing on-change command is logged and recovered from; the next
/// change still dispatches normally.
#[tokio::test(flavor = "multi_thread")]
async fn failing_action_does_not_poison_the_supervisor() {
    init_tracing();

    let scratch = tempfile::tempdir().unwrap();
    let log = scratch.path().join("events.log");

    let registry = Arc::new(RoleRegistry::new());
    let profile = ProfileBuilder::new("sleep 30")
        .on_change("definitely_not_a_command_xyz")
        .kill_primary(true)
        .work_dir("/tmp")
        .build();
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&registry), profile));

    supervisor.spawn_primary();
    assert!(
        wait_role_pid(&registry, ProcessRole::Primary, Duration::from_secs(2), |p| p != 0)
            .await
            .is_some()
    );

    Arc::clone(&supervisor).handle_change().await;
    // The shell exits 127; the record clears once the wait observes it.
    assert!(
        wait_role_pid(&registry, ProcessRole::Action, Duration::from_secs(2), |p| p == 0)
            .await
            .is_some()
    );

    // The supervisor is still fully operational: drive a second transition
    // with a working action and check it runs.
    let working = ProfileBuilder::new("sleep 30")
        .on_change(&format!("echo recovered >> {}", log.display()))
        .kill_primary(true)
        .work_dir("/tmp")
        .build();
    let second = Arc::new(Supervisor::new(Arc::clone(&registry), working));
    Arc::clone(&second).handle_change().await;
    assert!(wait_for_line(&log, "recovered", Duration::from_secs(3)).await);
}

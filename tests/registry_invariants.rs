// tests/registry_invariants.rs

//! The registry invariant: at most one live process per role, and a kill
//! always leaves the role's pid at 0, whatever happened to the signal.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use procwatch::config::CommandSpec;
use procwatch::engine::Supervisor;
use procwatch::proc::CommandExecutor;
use procwatch::registry::{ProcessRecord, ProcessRole, RoleRegistry};
use procwatch_test_utils::builders::ProfileBuilder;
use procwatch_test_utils::{init_tracing, pid_alive, wait_until};

#[tokio::test]
async fn killing_an_empty_role_is_a_no_op() {
    init_tracing();

    let registry = RoleRegistry::new();
    let executor = CommandExecutor::new();

    let mut table = registry.lock().await;
    let result = executor.kill(&mut table, ProcessRole::Primary, 2).await;
    assert!(result.is_ok());
    assert_eq!(table.get(ProcessRole::Primary).pid(), 0);
}

#[tokio::test]
async fn kill_clears_the_record_even_for_an_already_dead_process() {
    init_tracing();

    // Run a process to completion so its pid is certainly stale.
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let dead_pid = child.id() as i32;
    child.wait().unwrap();

    let registry = RoleRegistry::new();
    let executor = CommandExecutor::new();

    let mut table = registry.lock().await;
    table.set(ProcessRole::Action, ProcessRecord::live(dead_pid));

    let result = executor.kill(&mut table, ProcessRole::Action, 2).await;
    assert!(result.is_ok(), "a gone process is not a kill failure");
    assert_eq!(table.get(ProcessRole::Action).pid(), 0);
}

#[tokio::test]
async fn kill_terminates_a_live_process_group_and_clears_the_record() {
    init_tracing();

    let registry = RoleRegistry::new();
    let executor = CommandExecutor::new();
    let spec = CommandSpec::new("sleep 30", "/tmp", false);

    let pid = {
        let mut table = registry.lock().await;
        let child = executor
            .start(&mut table, &spec, ProcessRole::Primary)
            .unwrap();
        child.id() as i32
    };
    assert!(pid_alive(pid));

    {
        let mut table = registry.lock().await;
        executor
            .kill(&mut table, ProcessRole::Primary, 2)
            .await
            .unwrap();
        assert_eq!(table.get(ProcessRole::Primary).pid(), 0);
    }

    assert!(
        wait_until(Duration::from_secs(2), || !pid_alive(pid)).await,
        "interrupted process should die"
    );
}

/// Fire several change transitions at once; the registry lock serializes
/// them, so at any instant at most one action process is alive.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_transitions_keep_at_most_one_live_action() {
    init_tracing();

    let scratch = tempfile::tempdir().unwrap();
    let log = scratch.path().join("pids.log");
    let cmd = format!("echo $$ >> {}; sleep 30", log.display());

    let registry = Arc::new(RoleRegistry::new());
    let profile = ProfileBuilder::new("")
        .on_change(&cmd)
        .kill_primary(true)
        .work_dir("/tmp")
        .build();
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&registry), profile));

    let mut handles = Vec::new();
    for _ in 0..4 {
        handles.push(tokio::spawn(Arc::clone(&supervisor).handle_change()));
    }
    // Let every transition run its kill-then-start sequence.
    assert!(
        wait_until(Duration::from_secs(5), || {
            fs::read_to_string(&log)
                .map(|s| s.lines().count() >= 4)
                .unwrap_or(false)
        })
        .await,
        "all four actions should have started"
    );
    tokio::time::sleep(Duration::from_millis(500)).await;

    let pids: Vec<i32> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|l| l.trim().parse().unwrap())
        .collect();
    let alive: Vec<i32> = pids.iter().copied().filter(|p| pid_alive(*p)).collect();
    assert!(
        alive.len() <= 1,
        "more than one action alive at once: {alive:?}"
    );

    let recorded = registry.lock().await.get(ProcessRole::Action).pid();
    assert!(pids.contains(&recorded), "registry pid should be one of the started actions");

    // Cleanup; the kill must also clear the record.
    supervisor.kill_role(ProcessRole::Action, 1).await.unwrap();
    assert_eq!(registry.lock().await.get(ProcessRole::Action).pid(), 0);
}

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alsabridge::supervisor::{BridgeCommand, BridgeEvent, BridgeSupervisor, RetrySchedule};
use tempfile::TempDir;
use tokio::time::timeout;

/// Write an executable stub bridge script and return its path
fn write_stub(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();

    path
}

fn command_for(program: &Path) -> BridgeCommand {
    BridgeCommand {
        program: program.to_string_lossy().into_owned(),
        jack_name: "Stub capture".to_string(),
        hw: "hw:9,0".to_string(),
    }
}

/// Tight schedule so failure tests finish quickly
fn fast_schedule() -> RetrySchedule {
    RetrySchedule::new(vec![Duration::from_millis(10)], Duration::from_millis(10))
}

/// Poll until the failure counter reaches `target` or the timeout hits
async fn wait_for_failures(supervisor: &BridgeSupervisor, target: u32) {
    timeout(Duration::from_secs(10), async {
        while supervisor.consecutive_failures() < target {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("failure counter never reached target");
}

#[tokio::test]
async fn test_events_arrive_in_output_order() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(
        &dir,
        "bridge",
        "echo 'delay = 42'\necho 'xrun detected'\nexec sleep 30",
    );

    let supervisor = BridgeSupervisor::new(command_for(&stub), RetrySchedule::default());
    let mut events = supervisor.subscribe();
    supervisor.activate();

    let first = timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, BridgeEvent::DelayChanged("42".to_string()));

    let second = timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, BridgeEvent::LogMessage("xrun detected".to_string()));

    supervisor.deactivate().await;
}

#[tokio::test]
async fn test_deactivate_stops_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(&dir, "bridge", "echo 'delay = 1'\nexec sleep 30");

    let supervisor = BridgeSupervisor::new(command_for(&stub), RetrySchedule::default());
    let mut events = supervisor.subscribe();
    supervisor.activate();

    // Wait for the first event so we know the bridge is up
    timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(supervisor.is_running().await);
    assert!(supervisor.is_active());

    supervisor.deactivate().await;
    assert!(!supervisor.is_running().await);
    assert!(!supervisor.is_active());
}

#[tokio::test]
async fn test_failure_counter_rises_and_deactivate_resets() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-bridge");

    let supervisor = BridgeSupervisor::new(command_for(&missing), fast_schedule());
    supervisor.activate();

    // Spawning keeps failing; the counter climbs
    wait_for_failures(&supervisor, 3).await;

    supervisor.deactivate().await;
    assert_eq!(supervisor.consecutive_failures(), 0);
}

#[tokio::test]
async fn test_reactivation_starts_with_zero_failures() {
    let dir = tempfile::tempdir().unwrap();
    // Lives one second, emits nothing; every cycle ends in a read failure
    let stub = write_stub(&dir, "bridge", "exec sleep 1");

    let supervisor = BridgeSupervisor::new(command_for(&stub), fast_schedule());
    supervisor.activate();
    wait_for_failures(&supervisor, 1).await;

    supervisor.deactivate().await;
    assert_eq!(supervisor.consecutive_failures(), 0);

    // Let any in-flight cycle settle before the next active period
    tokio::time::sleep(Duration::from_millis(150)).await;

    supervisor.activate();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(supervisor.consecutive_failures(), 0);

    supervisor.deactivate().await;
}

#[tokio::test]
async fn test_start_stop_is_running() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(&dir, "bridge", "exec sleep 30");

    // Never activated: the monitoring loop stays parked the whole time
    let supervisor = BridgeSupervisor::new(command_for(&stub), RetrySchedule::default());
    assert!(!supervisor.is_running().await);

    supervisor.start().await.unwrap();
    assert!(supervisor.is_running().await);

    // Idempotent while the child is alive
    supervisor.start().await.unwrap();
    assert!(supervisor.is_running().await);

    supervisor.stop().await;
    assert!(!supervisor.is_running().await);

    // Stopping again is a no-op
    supervisor.stop().await;
    assert!(!supervisor.is_running().await);
}

#[tokio::test]
async fn test_restart_leaves_a_live_child() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(&dir, "bridge", "exec sleep 30");

    let supervisor = BridgeSupervisor::new(command_for(&stub), RetrySchedule::default());
    supervisor.start().await.unwrap();
    assert!(supervisor.is_running().await);

    supervisor.restart().await.unwrap();
    assert!(supervisor.is_running().await);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_start_with_missing_program_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-bridge");

    let supervisor = BridgeSupervisor::new(command_for(&missing), RetrySchedule::default());
    assert!(supervisor.start().await.is_err());
    assert!(!supervisor.is_running().await);
}

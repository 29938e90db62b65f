//! Process-level tests for `antikeylogger daemon`
//!
//! The daemon and the control verbs run as separate processes in the same
//! temporary working directory; the config file is all they share.

#![cfg(unix)]

mod helpers;

use helpers::Workspace;
use std::thread;
use std::time::Duration;

const RUNNING: &str = "[daemon] enabled -> running inference";
const EXIT_CODE: &str = "[daemon] inference exit code: ";
const IDLE: &str = "[daemon] disabled -> idle";

#[test]
fn test_disabled_daemon_stays_idle() {
    let ws = Workspace::with_classifier(0).unwrap();
    assert!(ws.control(&["disable"]).status.success());

    let mut daemon = ws.spawn_daemon(&["--interval", "1"]).unwrap();
    assert!(ws.wait_for_log("[daemon] start", 1, Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(2500));

    daemon.signal(libc::SIGTERM).unwrap();
    let (status, _) = daemon.wait_timeout(Duration::from_secs(5)).unwrap().expect("daemon did not exit");
    assert!(status.success());

    let log = ws.read_log();
    assert!(log.starts_with("[daemon] start\n"), "log was {:?}", log);
    assert!(log.matches(IDLE).count() <= 1);
    assert!(!log.contains(RUNNING));
    assert!(!log.contains(EXIT_CODE));
    assert!(log.ends_with("[daemon] stopping\n"));
}

#[test]
fn test_enable_then_disable_drives_daemon() {
    let ws = Workspace::with_classifier(3).unwrap();

    let mut daemon = ws.spawn_daemon(&["--interval", "1"]).unwrap();
    assert!(ws.wait_for_log("[daemon] start", 1, Duration::from_secs(5)));

    assert!(ws.control(&["enable", "daemon-test"]).status.success());
    assert!(
        ws.wait_for_log(&format!("{}3", EXIT_CODE), 1, Duration::from_secs(6)),
        "no inference logged: {:?}",
        ws.read_log()
    );

    assert!(ws.control(&["disable"]).status.success());
    assert!(
        ws.wait_for_log(IDLE, 1, Duration::from_secs(6)),
        "no idle transition logged: {:?}",
        ws.read_log()
    );

    // A few idle polls must not repeat the transition line
    thread::sleep(Duration::from_millis(4500));
    daemon.signal(libc::SIGINT).unwrap();
    let (status, _) = daemon.wait_timeout(Duration::from_secs(5)).unwrap().expect("daemon did not exit");
    assert!(status.success());

    let log = ws.read_log();
    let running = log.find(RUNNING).unwrap();
    let exit_code = log.find(&format!("{}3", EXIT_CODE)).unwrap();
    let idle = log.find(IDLE).unwrap();
    assert!(running < exit_code && exit_code < idle, "log was {:?}", log);
    assert_eq!(log.matches(IDLE).count(), 1);
    assert!(log.ends_with("[daemon] stopping\n"));

    let capture = std::fs::read_to_string(ws.path().join("logs").join("last_inference_output.txt")).unwrap();
    assert!(capture.contains("stand-in classifier --onnx"));
}

#[test]
fn test_term_while_idle_exits_quickly() {
    let ws = Workspace::with_classifier(0).unwrap();

    let mut daemon = ws.spawn_daemon(&[]).unwrap();
    assert!(ws.wait_for_log("[daemon] start", 1, Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(300));

    daemon.signal(libc::SIGTERM).unwrap();
    let (status, elapsed) = daemon
        .wait_timeout(Duration::from_secs(5))
        .unwrap()
        .expect("daemon did not exit");

    assert!(status.success());
    assert!(elapsed < Duration::from_secs(2), "shutdown took {:?}", elapsed);
    assert!(ws.read_log().ends_with("[daemon] stopping\n"));
}

#[test]
fn test_term_during_interval_wait_exits_quickly() {
    let ws = Workspace::with_classifier(0).unwrap();

    let mut daemon = ws.spawn_daemon(&["--interval", "10"]).unwrap();
    assert!(ws.wait_for_log("[daemon] start", 1, Duration::from_secs(5)));
    assert!(ws.control(&["enable", "long-interval"]).status.success());
    assert!(
        ws.wait_for_log(&format!("{}0", EXIT_CODE), 1, Duration::from_secs(6)),
        "no inference logged: {:?}",
        ws.read_log()
    );

    daemon.signal(libc::SIGTERM).unwrap();
    let (status, elapsed) = daemon
        .wait_timeout(Duration::from_secs(5))
        .unwrap()
        .expect("daemon did not exit");

    assert!(status.success());
    assert!(elapsed < Duration::from_secs(2), "shutdown took {:?}", elapsed);

    let log = ws.read_log();
    assert_eq!(log.matches(RUNNING).count(), 1, "log was {:?}", log);
    assert!(log.ends_with("[daemon] stopping\n"));
}

#[test]
fn test_log_is_appended_across_runs() {
    let ws = Workspace::with_classifier(0).unwrap();

    for run in 1..=2 {
        let mut daemon = ws.spawn_daemon(&[]).unwrap();
        assert!(ws.wait_for_log("[daemon] start", run, Duration::from_secs(5)));
        daemon.signal(libc::SIGTERM).unwrap();
        daemon.wait_timeout(Duration::from_secs(5)).unwrap().expect("daemon did not exit");
    }

    let log = ws.read_log();
    assert_eq!(log.matches("[daemon] start").count(), 2);
    assert_eq!(log.matches("[daemon] stopping").count(), 2);
}

#[test]
fn test_custom_log_and_config_paths() {
    let ws = Workspace::with_classifier(0).unwrap();
    let other = Workspace::new().unwrap();
    let config = other.path().join("flag.json");
    let log = other.path().join("nested").join("custom.log");

    let mut daemon = ws
        .spawn_daemon(&[
            "--config",
            config.to_str().unwrap(),
            "--log",
            log.to_str().unwrap(),
        ])
        .unwrap();
    assert!(helpers::wait_for_file(&log, "[daemon] start", 1, Duration::from_secs(5)));
    daemon.signal(libc::SIGTERM).unwrap();
    daemon.wait_timeout(Duration::from_secs(5)).unwrap().expect("daemon did not exit");

    let contents = std::fs::read_to_string(&log).unwrap();
    assert_eq!(contents, "[daemon] start\n[daemon] stopping\n");
    assert!(!ws.log_path().exists());
}

#[test]
fn test_unopenable_log_exits_1_without_start() {
    let ws = Workspace::with_classifier(0).unwrap();
    std::fs::write(ws.path().join("logs"), "not a directory").unwrap();

    let output = ws.control(&["daemon", "--interval", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("daemon log"));
}

#![cfg(unix)]

mod support;

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ktest_core::config::ToolConfig;
use ktest_core::services::engines::KleeEngine;
use ktest_core::services::orchestrator::{EngineError, Orchestrator, UnitStatus};
use support::{record, Workspace};

#[test]
fn completed_unit_registers_record_files_in_name_order() {
    let ws = Workspace::new();
    let unit = ws.unit("add", &[record(&[("a", b"\x01")]), record(&[("a", b"\x02")])]);
    ws.extra_file("add", "info", b"engine statistics");
    ws.extra_file("add", "assembly.ll", b"; copy of the module");

    let config = ws.config();
    let engine = KleeEngine::from_config(&config);
    let session = Orchestrator::new(&engine, &config).execute(&[unit.clone()]).unwrap();

    let report = &session.units()[0];
    assert_eq!(report.unit, unit);
    assert_eq!(report.output_dir, ws.path().join("klee-out-0"));
    assert_eq!(report.status, UnitStatus::Completed { exit_code: Some(0) });
    let names: Vec<String> = session
        .record_files()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["test000001.ktest", "test000002.ktest"]);
    assert!(session.record_files().all(|p| p.is_file()));

    let reports = session.close();
    assert_eq!(reports.len(), 1);
    assert!(ws.output_dirs().is_empty());
}

#[test]
fn dropping_the_session_removes_output_dirs() {
    let ws = Workspace::new();
    let a = ws.unit("a", &[record(&[("x", b"\x01")])]);
    let b = ws.unit("b", &[record(&[("x", b"\x02")])]);
    let config = ws.config();
    let engine = KleeEngine::from_config(&config);

    {
        let session = Orchestrator::new(&engine, &config).execute(&[a, b]).unwrap();
        assert_eq!(session.units().len(), 2);
        assert_eq!(ws.output_dirs().len(), 2);
    }
    assert!(ws.output_dirs().is_empty());
}

#[test]
fn timed_out_unit_is_killed_and_contributes_no_records() {
    let ws = Workspace::new();
    let slow = ws.unit("hang", &[record(&[("x", b"\x07")])]);
    let fast = ws.unit("fast", &[record(&[("x", b"\x08")])]);
    let config = ws.config().with_timeout(Duration::from_millis(300));
    let engine = KleeEngine::from_config(&config);

    let started = Instant::now();
    let session = Orchestrator::new(&engine, &config).execute(&[slow.clone(), fast]).unwrap();
    assert!(started.elapsed() < Duration::from_secs(20), "engine was not killed");

    assert_eq!(session.units()[0].unit, slow);
    assert_eq!(session.units()[0].status, UnitStatus::TimedOut);
    assert!(session.units()[0].record_files.is_empty());
    assert!(matches!(session.units()[1].status, UnitStatus::Completed { .. }));
    assert_eq!(session.record_files().count(), 1);

    drop(session);
    assert!(ws.output_dirs().is_empty(), "partial output of the timed-out unit must be removed");
}

#[test]
fn timeout_also_kills_processes_started_by_the_engine() {
    let ws = Workspace::new();
    let unit = ws.unit("linger", &[]);
    let config = ws.config().with_timeout(Duration::from_millis(300));
    let engine = KleeEngine::from_config(&config);

    let session = Orchestrator::new(&engine, &config).execute(&[unit]).unwrap();
    assert_eq!(session.units()[0].status, UnitStatus::TimedOut);
    drop(session);

    std::thread::sleep(Duration::from_secs(2));
    assert!(!ws.path().join("klee-out-0.late").exists(), "helper outlived the timeout");
}

#[test]
fn engine_failure_without_output_dir_is_not_fatal() {
    let ws = Workspace::new();
    let crash = ws.unit("crash", &[]);
    let config = ws.config();
    let engine = KleeEngine::from_config(&config);

    let session = Orchestrator::new(&engine, &config).execute(&[crash]).unwrap();
    assert_eq!(session.units()[0].status, UnitStatus::Completed { exit_code: Some(3) });
    assert_eq!(session.record_files().count(), 0);
}

#[test]
fn stale_output_dir_is_replaced() {
    let ws = Workspace::new();
    let unit = ws.unit("add", &[record(&[("x", b"\x01")])]);
    let stale = ws.path().join("klee-out-0");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("test999999.ktest"), record(&[("old", b"\x09")]).to_bytes()).unwrap();

    let config = ws.config();
    let engine = KleeEngine::from_config(&config);
    let session = Orchestrator::new(&engine, &config).execute(&[unit]).unwrap();
    let files: Vec<PathBuf> = session.record_files().map(PathBuf::from).collect();
    assert_eq!(files, vec![stale.join("test000001.ktest")]);
}

#[test]
fn missing_engine_aborts_before_touching_the_filesystem() {
    let ws = Workspace::new();
    let unit = ws.unit("add", &[record(&[("x", b"\x01")])]);
    let config = ToolConfig {
        engine: ws.path().join("no-such-engine"),
        ..ws.config()
    };
    let engine = KleeEngine::from_config(&config);

    let err = Orchestrator::new(&engine, &config).execute(&[unit]).unwrap_err();
    assert!(matches!(err, EngineError::MissingExecutable { .. }));
    assert!(ws.output_dirs().is_empty());
}

// Check loops + reporter: reports are written as JSON lines, cancellation stops everything

#![recursion_limit = "256"]

mod common;

use common::{FakeDaemon, info_json};
use docker_agent::checks::{ImagesCheck, SystemCheck};
use docker_agent::docker_repo::{IMAGES_PATH, INFO_PATH};
use docker_agent::worker::{REPORT_CHANNEL_CAPACITY, spawn_check, spawn_reporter};
use serde_json::{Value, json};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}

#[tokio::test(start_paused = true)]
async fn check_loop_reports_until_cancelled() {
    let daemon = Arc::new(FakeDaemon::new().with(INFO_PATH, info_json()));
    let out = SharedBuf::default();
    let (tx, rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
    let reporter = spawn_reporter(rx, out.clone());
    let cancel = CancellationToken::new();

    let handle = spawn_check(
        Arc::new(SystemCheck::new(daemon.clone(), Duration::from_secs(10))),
        tx,
        cancel.clone(),
    );
    tokio::time::sleep(Duration::from_secs(25)).await;
    cancel.cancel();
    handle.await.unwrap();
    let written = reporter.await.unwrap();

    assert_eq!(written, 3);
    assert_eq!(daemon.calls(), 3);
    let lines = out.lines();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert_eq!(line["check"], json!("system"));
        assert_eq!(line["snapshot"]["system"].as_array().unwrap().len(), 1);
        assert!(line["timestamp"].is_u64());
    }
}

#[tokio::test(start_paused = true)]
async fn failed_runs_are_skipped_and_retried_next_tick() {
    let daemon = Arc::new(FakeDaemon::new().failing(IMAGES_PATH));
    let out = SharedBuf::default();
    let (tx, rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
    let reporter = spawn_reporter(rx, out.clone());
    let cancel = CancellationToken::new();

    let handle = spawn_check(
        Arc::new(ImagesCheck::new(daemon.clone(), Duration::from_secs(10))),
        tx,
        cancel.clone(),
    );
    tokio::time::sleep(Duration::from_secs(15)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(reporter.await.unwrap(), 0);
    assert_eq!(daemon.calls(), 2);
    assert!(out.lines().is_empty());
}

#[tokio::test]
async fn disabled_check_is_never_scheduled() {
    let daemon = Arc::new(FakeDaemon::new().with(INFO_PATH, info_json()));
    let (tx, rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
    let reporter = spawn_reporter(rx, SharedBuf::default());

    let handle = spawn_check(
        Arc::new(SystemCheck::new(daemon.clone(), Duration::ZERO)),
        tx,
        CancellationToken::new(),
    );
    handle.await.unwrap();

    assert_eq!(reporter.await.unwrap(), 0);
    assert_eq!(daemon.calls(), 0);
}

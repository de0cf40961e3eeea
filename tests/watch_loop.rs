//! Scheduler loop against the embedded in-memory engine.

use std::sync::Arc;
use std::time::Duration;

use surreal_query::watch::{watch, WatchOptions, WatchSummary};
use surreal_query_connection::ConnectionConfig;
use surreal_query_storage::FilesystemStorage;
use surreal_query_task::{FetchType, QueryTask, RunContext};
use surreal_query_trigger::{PollingTrigger, TriggerEvent};
use tempfile::TempDir;
use tokio::sync::broadcast;

fn trigger(query: &str) -> PollingTrigger {
    let config = ConnectionConfig::with_endpoint("mem://", "test_ns", "test_db");
    let task = QueryTask::new(config, query).fetch_type(FetchType::Fetch);
    PollingTrigger::new("watch-test", task).with_interval(Duration::from_millis(20))
}

fn context(dir: &TempDir) -> RunContext {
    RunContext::with_storage(Arc::new(FilesystemStorage::new(dir.path())))
}

#[tokio::test]
async fn test_stops_after_max_events() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut events: Vec<TriggerEvent> = Vec::new();

    let summary = watch(
        &trigger("SELECT * FROM [{ a: 1 }, { a: 2 }]"),
        &context(&dir),
        WatchOptions {
            max_events: Some(3),
            fail_fast: false,
        },
        shutdown_rx,
        |event| {
            events.push(event.clone());
            Ok(())
        },
    )
    .await?;

    assert_eq!(
        summary,
        WatchSummary {
            ticks: 3,
            events: 3,
            failures: 0
        }
    );
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|event| event.output.size == 2));
    assert!(events.iter().all(|event| event.trigger_id == "watch-test"));
    Ok(())
}

#[tokio::test]
async fn test_empty_ticks_emit_nothing_until_shutdown() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let _ = shutdown_tx.send(());
    });

    let mut emitted = 0;
    let summary = watch(
        &trigger("SELECT * FROM t"),
        &context(&dir),
        WatchOptions::default(),
        shutdown_rx,
        |_| {
            emitted += 1;
            Ok(())
        },
    )
    .await?;

    assert!(summary.ticks >= 1);
    assert_eq!(summary.events, 0);
    assert_eq!(summary.failures, 0);
    assert_eq!(emitted, 0);
    Ok(())
}

#[tokio::test]
async fn test_failed_ticks_are_counted_and_polling_continues() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let _ = shutdown_tx.send(());
    });

    let summary = watch(
        &trigger("SELEC broken"),
        &context(&dir),
        WatchOptions::default(),
        shutdown_rx,
        |_| Ok(()),
    )
    .await?;

    assert!(summary.ticks >= 2, "expected several ticks, got {summary:?}");
    assert_eq!(summary.failures, summary.ticks);
    assert_eq!(summary.events, 0);
    Ok(())
}

#[tokio::test]
async fn test_fail_fast_returns_first_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let err = watch(
        &trigger("SELEC broken"),
        &context(&dir),
        WatchOptions {
            max_events: None,
            fail_fast: true,
        },
        shutdown_rx,
        |_| Ok(()),
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("watch-test"), "{message}");
    assert!(message.contains("tick 1"), "{message}");
    Ok(())
}

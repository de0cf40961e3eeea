//! Scheduler loop for `surreal-query watch`.

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use surreal_query_task::RunContext;
use surreal_query_trigger::{PollingTrigger, TriggerEvent};

/// How the loop reacts to events and failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Stop once this many events have been emitted
    pub max_events: Option<u64>,
    /// Return the first tick error instead of logging it
    pub fail_fast: bool,
}

/// What happened while watching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub ticks: u64,
    pub events: u64,
    pub failures: u64,
}

/// Evaluate `trigger` every interval until shutdown, `max_events` or, with
/// `fail_fast`, the first failed tick.
///
/// Ticks run one after another. A tick that outlasts the interval delays
/// the next one rather than overlapping it.
pub async fn watch<F>(
    trigger: &PollingTrigger,
    ctx: &RunContext,
    options: WatchOptions,
    mut shutdown: broadcast::Receiver<()>,
    mut emit: F,
) -> anyhow::Result<WatchSummary>
where
    F: FnMut(&TriggerEvent) -> anyhow::Result<()>,
{
    if trigger.may_overlap() {
        warn!(
            "Connection timeout {:?} is not shorter than the interval {:?}; slow ticks will delay the schedule",
            trigger.task.connection.connection_timeout,
            trigger.interval()
        );
    }

    let mut summary = WatchSummary::default();
    let mut interval_timer = tokio::time::interval(trigger.interval());
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Watching trigger '{}' every {:?}",
        trigger.id,
        trigger.interval()
    );

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("Received shutdown signal");
                break;
            }
            _ = interval_timer.tick() => {
                summary.ticks += 1;
                debug!("Tick {} for trigger '{}'", summary.ticks, trigger.id);

                match trigger.evaluate(ctx).await {
                    Ok(Some(event)) => {
                        emit(&event)?;
                        summary.events += 1;
                        if options.max_events.is_some_and(|max| summary.events >= max) {
                            info!("Reached {} events, stopping", summary.events);
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) if options.fail_fast => {
                        return Err(anyhow::Error::new(e)
                            .context(format!("Trigger '{}' failed on tick {}", trigger.id, summary.ticks)));
                    }
                    Err(e) => {
                        summary.failures += 1;
                        error!("Trigger '{}' failed on tick {}: {}", trigger.id, summary.ticks, e);
                    }
                }
            }
        }
    }

    Ok(summary)
}

/// Shutdown channel fired on Ctrl+C.
pub fn setup_shutdown_handler() -> broadcast::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt signal (Ctrl+C)");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                // Keep the sender alive so the watch loop is not stopped
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    shutdown_rx
}

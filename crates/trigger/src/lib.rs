//! Polling trigger for surreal-query.
//!
//! A [`PollingTrigger`] runs its query once per tick. A tick whose query
//! returns no rows ends quietly; any other tick yields a [`TriggerEvent`]
//! carrying the full query output. Errors are returned to the caller, which
//! owns the schedule and decides whether to keep polling.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surreal_query_task::{QueryOutput, QueryTask, Result, RunContext};
use tracing::{debug, info};
use uuid::Uuid;

/// Default time between two ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// A query evaluated on a fixed interval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingTrigger {
    /// Identifies the trigger in emitted events
    pub id: String,

    #[serde(flatten)]
    pub task: QueryTask,

    #[serde(
        default = "default_interval",
        deserialize_with = "surreal_query_connection::duration::deserialize"
    )]
    pub interval: Duration,
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

/// Emitted when a tick's query returned at least one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    pub id: Uuid,
    pub trigger_id: String,
    pub emitted_at: DateTime<Utc>,
    pub output: QueryOutput,
}

impl PollingTrigger {
    pub fn new(id: impl Into<String>, task: QueryTask) -> Self {
        Self {
            id: id.into(),
            task,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one tick.
    ///
    /// Returns `Ok(None)` when the query matched nothing.
    pub async fn evaluate(&self, ctx: &RunContext) -> Result<Option<TriggerEvent>> {
        let output = self.task.run(ctx).await?;

        if output.is_empty() {
            debug!("Trigger '{}' matched no rows", self.id);
            return Ok(None);
        }

        let event = TriggerEvent {
            id: Uuid::new_v4(),
            trigger_id: self.id.clone(),
            emitted_at: Utc::now(),
            output,
        };
        info!(
            "Trigger '{}' emitted event {} with {} rows",
            self.id, event.id, event.output.size
        );
        Ok(Some(event))
    }

    /// Whether a tick could still be running when the next one starts.
    ///
    /// The connection timeout alone may exceed the interval; callers that
    /// schedule ticks concurrently should guard against overlap.
    pub fn may_overlap(&self) -> bool {
        self.task.connection.connection_timeout >= self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surreal_query_task::FetchType;

    #[test]
    fn test_deserialize_trigger() {
        let trigger: PollingTrigger = serde_yaml::from_str(
            r#"
id: new-orders
host: localhost
namespace: shop
database: main
query: SELECT * FROM order WHERE status = $status
parameters:
  status: pending
fetchType: FETCH
interval: 5m
"#,
        )
        .unwrap();

        assert_eq!(trigger.id, "new-orders");
        assert_eq!(trigger.interval(), Duration::from_secs(300));
        assert_eq!(trigger.task.fetch_type, FetchType::Fetch);
        assert_eq!(trigger.task.connection.namespace, "shop");
        assert_eq!(trigger.task.parameters["status"], "pending");
    }

    #[test]
    fn test_interval_defaults_to_one_minute() {
        let trigger: PollingTrigger = serde_yaml::from_str(
            r#"
id: t
host: localhost
namespace: ns
database: db
query: SELECT * FROM t
"#,
        )
        .unwrap();
        assert_eq!(trigger.interval(), DEFAULT_INTERVAL);
        assert!(trigger.may_overlap());
        assert!(!trigger
            .with_interval(Duration::from_secs(600))
            .may_overlap());
    }
}

//! Event bus decorator that appends published events to a JSONL log.
//!
//! Persistence is best-effort: the line is written before dispatch so an
//! audit trail exists even if a handler fails, but a write failure is logged
//! and never blocks publication. The log is NOT transactional with the
//! database commit; callers needing at-least-once delivery must persist
//! events themselves.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use futures_util::future::BoxFuture;
use serde_json::json;
use tracing::error;

use super::bus::{DomainEvent, EventBus, EventPublisher};

/// [`EventBus`] wrapper that records every published event to disk.
pub struct PersistentEventBus {
    inner: EventBus,
    log_path: PathBuf,
    // Serializes appends so concurrent publishers cannot interleave lines.
    write_guard: Mutex<()>,
}

impl PersistentEventBus {
    /// Wrap `inner`, appending events to the file at `log_path`.
    pub fn new(inner: EventBus, log_path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            log_path: log_path.into(),
            write_guard: Mutex::new(()),
        }
    }

    /// Path of the event log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn log_event(&self, event: &dyn DomainEvent) {
        let line = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event.name(),
            "payload": event.payload(),
        });
        let _guard = self.write_guard.lock().unwrap_or_else(|e| e.into_inner());
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(cause) = result {
            error!(
                event = event.name(),
                path = %self.log_path.display(),
                error = %cause,
                "failed to persist event"
            );
        }
    }
}

impl EventPublisher for PersistentEventBus {
    fn publish(&self, event: &dyn DomainEvent) {
        self.log_event(event);
        self.inner.publish(event);
    }

    fn publish_async<'a>(&'a self, event: &'a dyn DomainEvent) -> BoxFuture<'a, ()> {
        self.log_event(event);
        Box::pin(self.inner.publish_async(event))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::events::domain::ArticleCreated;

    fn created_event() -> ArticleCreated {
        ArticleCreated {
            article_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            slug: "how-to-train-your-dragon".to_owned(),
        }
    }

    #[tokio::test]
    async fn published_events_are_appended_as_jsonl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.log");
        let bus = PersistentEventBus::new(EventBus::new(), &path);

        bus.publish(&created_event());
        bus.publish_async(&created_event()).await;

        let contents = std::fs::read_to_string(&path).expect("log readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let entry: serde_json::Value = serde_json::from_str(line).expect("valid JSON");
            assert_eq!(entry["event"], "ArticleCreated");
            assert_eq!(entry["payload"]["slug"], "how-to-train-your-dragon");
            assert!(entry["timestamp"].is_string());
        }
    }

    #[test]
    fn handlers_still_run_after_logging() {
        let dir = tempfile::tempdir().expect("tempdir");
        let calls = Arc::new(AtomicUsize::new(0));
        let mut inner = EventBus::new();
        let counter = Arc::clone(&calls);
        inner.subscribe::<ArticleCreated, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let bus = PersistentEventBus::new(inner, dir.path().join("events.log"));

        bus.publish(&created_event());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unwritable_log_path_does_not_block_publication() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut inner = EventBus::new();
        let counter = Arc::clone(&calls);
        inner.subscribe::<ArticleCreated, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        // Directory path cannot be opened for appending.
        let dir = tempfile::tempdir().expect("tempdir");
        let bus = PersistentEventBus::new(inner, dir.path());

        bus.publish(&created_event());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

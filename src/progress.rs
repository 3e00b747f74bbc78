//! Progress events for long-running audit runs.
//!
//! Events flow through a bounded mpsc channel. Sends are non-blocking and
//! failure-tolerant: a slow or departed consumer never stalls the audit.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Orchestrator state machine:
/// `preparing → checking(category) → calculating → done`, with `cancelled`
/// reachable from any non-terminal state. `Done` and `Cancelled` are
/// terminal sentinels — nothing follows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Preparing,
    Checking,
    Calculating,
    Done,
    Cancelled,
}

/// A progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditProgress {
    pub phase: ProgressPhase,
    /// Name of the check in flight, present while `Checking`.
    pub current_category: Option<String>,
    pub percent_complete: f32,
    /// Running issue count across all completed checks.
    pub issues_found: u64,
}

/// Sending half handed to the engine. A no-op sender is available for
/// callers that do not consume progress.
#[derive(Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<AuditProgress>>,
}

impl ProgressSender {
    /// Channel capacity: progress is lossy by design, a small buffer is
    /// plenty.
    const CAPACITY: usize = 64;

    /// Create a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::Receiver<AuditProgress>) {
        let (tx, rx) = mpsc::channel(Self::CAPACITY);
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Non-blocking, failure-tolerant send.
    pub fn send(&self, progress: AuditProgress) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(progress);
        }
    }

    pub fn preparing(&self) {
        self.send(AuditProgress {
            phase: ProgressPhase::Preparing,
            current_category: None,
            percent_complete: 0.0,
            issues_found: 0,
        });
    }

    pub fn checking(&self, category: &str, percent_complete: f32, issues_found: u64) {
        self.send(AuditProgress {
            phase: ProgressPhase::Checking,
            current_category: Some(category.to_string()),
            percent_complete,
            issues_found,
        });
    }

    pub fn calculating(&self, percent_complete: f32, issues_found: u64) {
        self.send(AuditProgress {
            phase: ProgressPhase::Calculating,
            current_category: None,
            percent_complete,
            issues_found,
        });
    }

    pub fn done(&self, issues_found: u64) {
        self.send(AuditProgress {
            phase: ProgressPhase::Done,
            current_category: None,
            percent_complete: 100.0,
            issues_found,
        });
    }

    pub fn cancelled(&self, issues_found: u64) {
        self.send(AuditProgress {
            phase: ProgressPhase::Cancelled,
            current_category: None,
            percent_complete: 0.0,
            issues_found,
        });
    }
}

/// Adapt the receiving half into an async stream for UI subscriptions.
pub fn progress_stream(rx: mpsc::Receiver<AuditProgress>) -> ReceiverStream<AuditProgress> {
    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_flow_in_order() {
        let (tx, mut rx) = ProgressSender::channel();
        tx.preparing();
        tx.checking("Internal Linking", 20.0, 3);
        tx.done(3);
        drop(tx);

        assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Preparing);
        let checking = rx.recv().await.unwrap();
        assert_eq!(checking.phase, ProgressPhase::Checking);
        assert_eq!(checking.current_category.as_deref(), Some("Internal Linking"));
        assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Done);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_disabled_sender_is_silent() {
        let tx = ProgressSender::disabled();
        // Must not panic or block.
        tx.preparing();
        tx.done(0);
    }

    #[test]
    fn test_full_buffer_drops_rather_than_blocks() {
        let (tx, _rx) = ProgressSender::channel();
        for _ in 0..200 {
            tx.checking("Cost of Retrieval", 50.0, 0);
        }
        // Send returned 200 times without awaiting: lossy by design.
    }
}

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

pub const DEFAULT_FEEDBACK_DURATION: Duration = Duration::from_millis(2000);

/// Sent by the clear timer when a message's lifetime is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackExpiry {
    pub id: u64,
}

/// Holds the single visible feedback message and the timer that clears it.
///
/// The timer does not touch the presenter itself; it posts a [`FeedbackExpiry`]
/// to the owner, which hands it back through [`FeedbackPresenter::expire`].
pub struct FeedbackPresenter {
    duration: Duration,
    expiry_tx: mpsc::Sender<FeedbackExpiry>,
    message: Option<String>,
    current_id: u64,
    pending_clear: Option<JoinHandle<()>>,
}

impl FeedbackPresenter {
    pub fn new(duration: Duration, expiry_tx: mpsc::Sender<FeedbackExpiry>) -> Self {
        Self {
            duration,
            expiry_tx,
            message: None,
            current_id: 0,
            pending_clear: None,
        }
    }

    /// Show a message now and schedule it to clear, replacing any earlier one
    pub fn show(&mut self, message: impl Into<String>) {
        self.cancel_pending();

        self.current_id += 1;
        self.message = Some(message.into());

        let id = self.current_id;
        let duration = self.duration;
        let tx = self.expiry_tx.clone();
        self.pending_clear = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(FeedbackExpiry { id }).await;
        }));
    }

    /// Clear the message if the expiry belongs to it. Returns true if cleared.
    pub fn expire(&mut self, expiry: FeedbackExpiry) -> bool {
        if expiry.id != self.current_id || self.message.is_none() {
            return false;
        }
        self.message = None;
        self.pending_clear = None;
        true
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
    }
}

impl Drop for FeedbackPresenter {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};

    fn presenter() -> (FeedbackPresenter, mpsc::Receiver<FeedbackExpiry>) {
        let (tx, rx) = mpsc::channel(8);
        (FeedbackPresenter::new(DEFAULT_FEEDBACK_DURATION, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_clears_after_duration() {
        let (mut feedback, mut rx) = presenter();
        let started = Instant::now();

        feedback.show("Word accepted!");
        assert_eq!(feedback.message(), Some("Word accepted!"));

        let expiry = rx.recv().await.unwrap();
        assert!(started.elapsed() >= DEFAULT_FEEDBACK_DURATION);
        assert!(feedback.expire(expiry));
        assert_eq!(feedback.message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_message_cancels_earlier_clear() {
        let (mut feedback, mut rx) = presenter();

        feedback.show("Invalid letters");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        feedback.show("Word accepted!");

        // The first timer would have fired 500ms from now
        let early = timeout(Duration::from_millis(1000), rx.recv()).await;
        assert!(early.is_err(), "earlier clear timer should have been cancelled");
        assert_eq!(feedback.message(), Some("Word accepted!"));

        let expiry = rx.recv().await.unwrap();
        assert!(feedback.expire(expiry));
        assert_eq!(feedback.message(), None);
    }

    #[tokio::test]
    async fn test_stale_expiry_is_ignored() {
        let (mut feedback, _rx) = presenter();

        feedback.show("first");
        feedback.show("second");

        assert!(!feedback.expire(FeedbackExpiry { id: 1 }));
        assert_eq!(feedback.message(), Some("second"));
        assert!(feedback.expire(FeedbackExpiry { id: 2 }));
        assert!(!feedback.expire(FeedbackExpiry { id: 2 }));
    }
}

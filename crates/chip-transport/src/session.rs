//! C7 — reader session: platform tag-reader lifecycle. At most one session
//! may be active per process (spec.md §3/§5's single-session invariant).

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{instrument, warn};

use crate::apdu::Transport;
use crate::error::{Result, TransportError};

/// The platform-specific half of a reader session: starting the poll for an
/// ISO-14443 tag in the field and reporting what it sees. A real
/// implementation wraps CoreNFC/Android NFC/PC-SC; tests use
/// [`crate::fake::FakeTransport`] wrapped in a scripted backend.
#[async_trait]
pub trait ReaderBackend: Send + Sync {
    /// Starts polling for a tag. Called once per session.
    async fn begin(&self) -> Result<()>;

    /// Checks for a new development since the last call: a tag connected, a
    /// conflicting second tag, or nothing yet. Called repeatedly until a
    /// terminal outcome is returned.
    async fn poll_once(&self) -> Result<PollOutcome>;

    /// Tears down any platform polling state. Called exactly once, on every
    /// exit path (success, cancel, timeout, error).
    async fn invalidate(&self, reason: &str);
}

pub enum PollOutcome {
    Pending,
    TagConnected(Arc<dyn Transport>),
    MultipleTagsDetected,
    CardRemoved,
}

/// What a reader session concludes with.
pub enum SessionEvent {
    TagReady(Arc<dyn Transport>),
    UserCancelled,
    Timeout,
    Error(TransportError),
}

const WATCHDOG: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the single-active-session invariant for one reader device. A real
/// deployment constructs exactly one of these per process (the reader
/// hardware is single-access by physics); tests construct a fresh one per
/// case so sessions from different tests never contend on shared state.
#[derive(Default)]
pub struct SessionManager {
    active: AtomicBool,
}

impl SessionManager {
    pub fn new() -> Self {
        Self { active: AtomicBool::new(false) }
    }

    /// Opens a new session against `backend`. Fails with
    /// [`TransportError::SessionAlreadyActive`] if another session opened
    /// through this manager is still live.
    pub fn open_session(self: &Arc<Self>, backend: Arc<dyn ReaderBackend>) -> Result<ReaderSession> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TransportError::SessionAlreadyActive);
        }
        Ok(ReaderSession { backend, manager: self.clone() })
    }
}

/// A single, at-most-one-active tag-reader session.
pub struct ReaderSession {
    backend: Arc<dyn ReaderBackend>,
    manager: Arc<SessionManager>,
}

impl ReaderSession {

    /// Runs the session to completion: starts polling, then waits for a tag,
    /// a user cancel, or the 60-second watchdog, whichever comes first. The
    /// backend is always invalidated before returning, so no session can
    /// leak a dangling platform handle.
    #[instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: oneshot::Receiver<()>) -> SessionEvent {
        if let Err(e) = self.backend.begin().await {
            self.backend.invalidate("begin failed").await;
            return SessionEvent::Error(e);
        }

        let event = tokio::select! {
            biased;
            _ = cancel => SessionEvent::UserCancelled,
            result = tokio::time::timeout(WATCHDOG, self.poll_until_terminal()) => {
                match result {
                    Ok(event) => event,
                    Err(_elapsed) => SessionEvent::Timeout,
                }
            }
        };

        let reason = match &event {
            SessionEvent::TagReady(_) => "success",
            SessionEvent::UserCancelled => "user cancelled",
            SessionEvent::Timeout => "watchdog timeout",
            SessionEvent::Error(_) => "error",
        };
        self.backend.invalidate(reason).await;
        event
    }

    async fn poll_until_terminal(&self) -> SessionEvent {
        loop {
            match self.backend.poll_once().await {
                Ok(PollOutcome::Pending) => sleep(POLL_INTERVAL).await,
                Ok(PollOutcome::TagConnected(transport)) => return SessionEvent::TagReady(transport),
                Ok(PollOutcome::MultipleTagsDetected) => {
                    warn!("multiple tags in the field, use one tag at a time");
                    return SessionEvent::Error(TransportError::MultipleTags);
                }
                Ok(PollOutcome::CardRemoved) => return SessionEvent::Error(TransportError::NotConnected),
                Err(e) => return SessionEvent::Error(e),
            }
        }
    }
}

impl Drop for ReaderSession {
    fn drop(&mut self) {
        self.manager.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;
    use std::sync::Mutex;

    struct ScriptedBackend {
        outcomes: Mutex<Vec<PollOutcome>>,
    }

    #[async_trait]
    impl ReaderBackend for ScriptedBackend {
        async fn begin(&self) -> Result<()> {
            Ok(())
        }

        async fn poll_once(&self) -> Result<PollOutcome> {
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Ok(PollOutcome::Pending)
            } else {
                Ok(outcomes.remove(0))
            }
        }

        async fn invalidate(&self, _reason: &str) {}
    }

    #[tokio::test]
    async fn single_session_invariant_then_reopen_after_close() {
        let manager = Arc::new(SessionManager::new());
        let backend = Arc::new(ScriptedBackend { outcomes: Mutex::new(vec![]) });
        let session = manager.open_session(backend.clone()).unwrap();
        assert!(manager.open_session(backend.clone()).is_err());
        drop(session);
        assert!(manager.open_session(backend).is_ok());
    }

    #[tokio::test]
    async fn reports_tag_ready_on_connect() {
        let manager = Arc::new(SessionManager::new());
        let fake: Arc<dyn Transport> = Arc::new(FakeTransport::new(vec![]));
        let backend = Arc::new(ScriptedBackend {
            outcomes: Mutex::new(vec![PollOutcome::TagConnected(fake)]),
        });
        let session = manager.open_session(backend).unwrap();
        let (_tx, rx) = oneshot::channel();
        match session.run(rx).await {
            SessionEvent::TagReady(_) => {}
            _ => panic!("expected TagReady"),
        }
    }

    #[tokio::test]
    async fn user_cancel_short_circuits_the_poll_loop() {
        let manager = Arc::new(SessionManager::new());
        let backend = Arc::new(ScriptedBackend { outcomes: Mutex::new(vec![]) });
        let session = manager.open_session(backend).unwrap();
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();
        match session.run(rx).await {
            SessionEvent::UserCancelled => {}
            _ => panic!("expected UserCancelled"),
        }
    }
}

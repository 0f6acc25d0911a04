//! Per-session operation queue.
//!
//! Every mutating call against a session (action, phase advance, AI turn)
//! goes through [`SessionHandle::enqueue`], which serializes operations in
//! arrival order behind a [`tokio::sync::Mutex`]. The mutex is fair, so
//! operations run first-in first-out and never interleave.
//!
//! After each operation the handle publishes a fresh snapshot on a
//! [`tokio::sync::watch`] channel. Readers call
//! [`SessionHandle::latest_snapshot`] without queueing; what they see is
//! the state after the last completed operation.

use std::sync::Arc;

use kingdom_types::{ActionOutcome, GameProgress, SessionId, SessionSnapshot};
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::placeholders::ActionParams;
use crate::session::{GameSession, SessionError};

/// Shared state behind a [`SessionHandle`].
#[derive(Debug)]
struct Inner {
    /// Session id, readable without locking.
    id: SessionId,

    /// The session itself. Only touched inside `enqueue`.
    session: Mutex<GameSession>,

    /// Snapshot published after every operation.
    snapshots: watch::Sender<SessionSnapshot>,
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    /// Wrap a session and publish its initial snapshot.
    pub fn new(session: GameSession) -> Self {
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            inner: Arc::new(Inner {
                id: session.id(),
                session: Mutex::new(session),
                snapshots,
            }),
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Run `op` with exclusive access to the session.
    ///
    /// Operations run one at a time in the order they were enqueued. The
    /// post-operation snapshot is published whether or not `op` succeeded.
    pub async fn enqueue<T>(
        &self,
        op: impl FnOnce(&mut GameSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut session = self.inner.session.lock().await;
        let result = op(&mut session);
        self.inner.snapshots.send_replace(session.snapshot());
        debug!(session_id = %self.inner.id, ok = result.is_ok(), "Operation completed");
        result
    }

    /// Perform an action for the active player.
    pub async fn perform_action(
        &self,
        action_id: &str,
        params: ActionParams,
    ) -> Result<ActionOutcome, SessionError> {
        self.enqueue(|session| session.perform_action(action_id, &params))
            .await
    }

    /// Advance the session by one step.
    pub async fn advance(&self) -> Result<GameProgress, SessionError> {
        self.enqueue(GameSession::advance).await
    }

    /// Skip the rest of the current phase.
    pub async fn end_phase(&self) -> Result<GameProgress, SessionError> {
        self.enqueue(GameSession::end_phase).await
    }

    /// The snapshot published by the last completed operation.
    ///
    /// Does not wait for in-flight operations.
    pub fn latest_snapshot(&self) -> SessionSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }
}

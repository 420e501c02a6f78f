//! Session registry.
//!
//! Maps each user to their running game. A user has an entry exactly while
//! their game routine runs: [`SessionRegistry::begin`] hands out a
//! [`RegistryGuard`] whose drop removes the entry on every exit path,
//! including panics and task aborts.
//!
//! The map sits behind a synchronous mutex that is never held across an
//! `.await`, so no caller can observe a half-applied update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use akigame_core::error::GameError;
use akigame_core::transport::{ChannelId, UserId};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::domain::state::SessionStatus;

/// Shared reference to a running session.
///
/// The session itself is owned by its game task; the handle is how commands
/// from other tasks observe or cancel it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Unique session identifier.
    pub session_id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Channel the game runs in.
    pub channel_id: ChannelId,
    /// When the game was started.
    pub started_at: DateTime<Utc>,
    cancel: CancellationToken,
    status: Arc<Mutex<SessionStatus>>,
}

impl SessionHandle {
    fn new(user_id: UserId, channel_id: ChannelId, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            channel_id,
            started_at,
            cancel: CancellationToken::new(),
            status: Arc::new(Mutex::new(SessionStatus::default())),
        }
    }

    /// Cancels the session. The outstanding wait (or the next one) resolves
    /// as cancelled; an oracle call already in flight is allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`SessionHandle::cancel`] was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that every wait of this session derives from.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current status snapshot.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn update_status(&self, update: impl FnOnce(&mut SessionStatus)) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut status);
    }
}

/// Process-wide table of running sessions, keyed by user.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<UserId, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<UserId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AlreadyPlaying` if the user already has one; the
    /// existing session is left untouched.
    pub fn begin(
        self: &Arc<Self>,
        user_id: UserId,
        channel_id: ChannelId,
        started_at: DateTime<Utc>,
    ) -> Result<RegistryGuard, GameError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(&user_id) {
            return Err(GameError::AlreadyPlaying(user_id));
        }
        let handle = SessionHandle::new(user_id, channel_id, started_at);
        sessions.insert(user_id, handle.clone());
        debug!(%user_id, session_id = %handle.session_id, "session registered");
        Ok(RegistryGuard {
            registry: Arc::clone(self),
            handle,
        })
    }

    /// Removes the entry for `user_id`, if any.
    pub fn end(&self, user_id: UserId) -> Option<SessionHandle> {
        self.sessions().remove(&user_id)
    }

    /// Returns the live session for `user_id`.
    #[must_use]
    pub fn get(&self, user_id: UserId) -> Option<SessionHandle> {
        self.sessions().get(&user_id).cloned()
    }

    /// Cancels the session of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotPlaying` if the user has no session.
    pub fn cancel(&self, user_id: UserId) -> Result<SessionHandle, GameError> {
        let handle = self.get(user_id).ok_or(GameError::NotPlaying(user_id))?;
        handle.cancel();
        Ok(handle)
    }

    /// Whether `user_id` has a running session.
    #[must_use]
    pub fn contains(&self, user_id: UserId) -> bool {
        self.sessions().contains_key(&user_id)
    }

    /// Number of running sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Whether no session is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    fn end_session(&self, user_id: UserId, session_id: Uuid) {
        let mut sessions = self.sessions();
        // A newer session for the same user must survive the old guard.
        if sessions
            .get(&user_id)
            .is_some_and(|h| h.session_id == session_id)
        {
            sessions.remove(&user_id);
            debug!(%user_id, %session_id, "session unregistered");
        }
    }
}

/// Keeps a registry entry alive; removes it when dropped.
#[derive(Debug)]
pub struct RegistryGuard {
    registry: Arc<SessionRegistry>,
    handle: SessionHandle,
}

impl RegistryGuard {
    /// The registered session.
    #[must_use]
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        self.registry
            .end_session(self.handle.user_id, self.handle.session_id);
    }
}

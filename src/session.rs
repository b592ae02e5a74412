//! Practice sessions keyed by session identifier
//!
//! Each session sits behind its own async mutex so concurrent requests for
//! one session are serialized, while different sessions never contend.
//! Sessions idle for longer than the configured TTL are evicted.

use std::fmt;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mini_moka::sync::{Cache, ConcurrentCacheExt};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::dialogue::{ColorPicker, DialogueState, Event, Transition, transition};
use crate::{Error, Result};

/// Identifier of the shared session used by clients that send none
pub const DEFAULT_SESSION_ID: &str = "default";

/// Longest accepted client-supplied session identifier
const MAX_SESSION_ID_LEN: usize = 128;

/// Opaque session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The shared fallback session
    #[must_use]
    pub fn shared() -> Self {
        Self(DEFAULT_SESSION_ID.to_string())
    }

    /// Validate a client-supplied identifier
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty, overlong, or non-printable ids
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_SESSION_ID_LEN {
            return Err(Error::Validation(format!(
                "session id must be 1-{MAX_SESSION_ID_LEN} characters"
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::Validation(
                "session id must be printable ASCII".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user's practice dialogue
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    dialogue: DialogueState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub dialogue: DialogueState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            dialogue: DialogueState::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub const fn dialogue(&self) -> &DialogueState {
        &self.dialogue
    }

    /// Run `event` through the dialogue and commit the resulting state
    ///
    /// On error the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveColor`] for help or retry without a color
    pub fn apply(&mut self, event: Event, picker: &dyn ColorPicker) -> Result<Transition> {
        let event_name = event.name();
        let outcome = transition(&self.dialogue, event, picker)?;

        tracing::debug!(
            session = %self.id,
            event = event_name,
            from = ?self.dialogue.phase,
            to = ?outcome.state.phase,
            "dialogue transition"
        );

        self.dialogue.clone_from(&outcome.state);
        self.updated_at = Utc::now();
        Ok(outcome)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            dialogue: self.dialogue.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Handle to a session shared between requests
pub type SharedSession = Arc<Mutex<Session>>;

/// Registry of live sessions with idle eviction
///
/// The cache itself is unbounded so it never declines an insert; the
/// session limit is enforced here before a new session is created.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<SessionId, SharedSession>,
    max_sessions: u64,
    create_lock: Arc<std::sync::Mutex<()>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("max_sessions", &self.max_sessions)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store admitting at most `max_sessions`, evicting sessions
    /// untouched for `idle_ttl`
    #[must_use]
    pub fn new(max_sessions: u64, idle_ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_idle(idle_ttl).build();

        Self {
            cache,
            max_sessions,
            create_lock: Arc::new(std::sync::Mutex::new(())),
        }
    }

    /// Look up a live session
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<SharedSession> {
        self.cache.get(id)
    }

    /// Look up a session, creating an empty one for unknown ids
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionLimit`] when `id` is unknown and the store
    /// already holds `max_sessions` live sessions
    pub fn get_or_create(&self, id: &SessionId) -> Result<SharedSession> {
        if let Some(session) = self.cache.get(id) {
            return Ok(session);
        }

        let _guard = self
            .create_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another request may have created it while we waited
        if let Some(session) = self.cache.get(id) {
            return Ok(session);
        }

        // Apply pending inserts and expirations so the count is exact
        self.cache.sync();
        if self.cache.entry_count() >= self.max_sessions {
            tracing::warn!(
                session = %id,
                max_sessions = self.max_sessions,
                "session limit reached, refusing new session"
            );
            return Err(Error::SessionLimit(self.max_sessions));
        }

        tracing::info!(session = %id, "session created");
        let session = Arc::new(Mutex::new(Session::new(id.clone())));
        self.cache.insert(id.clone(), session.clone());
        Ok(session)
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.sync();
        self.cache.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop a session
    pub fn remove(&self, id: &SessionId) {
        self.cache.invalidate(id);
    }
}

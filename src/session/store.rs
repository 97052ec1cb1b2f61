//! In-memory session store with origin-scoped addressing
//!
//! Sessions are keyed by the caller-chosen collection identifier, but every
//! access requires the requesting origin to match the session's creation
//! origin. A mismatch is indistinguishable from "not found" so a page can
//! never probe for another origin's sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::tx::{Fragment, Transaction};
use crate::types::{Result, WicketError};

/// Sweep for expired sessions at most this often
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Reconstructed,
    Closed,
}

/// One in-flight signing negotiation
#[derive(Debug)]
pub struct SigningSession {
    pub collection_id: String,
    pub origin: String,
    pub transaction: Transaction,
    pub pending: Vec<Fragment>,
    pub state: SessionState,
    pub created_at: u64,
    pub expires_at: u64,

    /// Running total of data bytes in `pending`, checked against the
    /// declared `data_size` at append time
    pub pending_data_bytes: u64,
}

impl SigningSession {
    fn new(collection_id: String, origin: String, transaction: Transaction, ttl_secs: u64) -> Self {
        let now = unix_now();
        Self {
            collection_id,
            origin,
            transaction,
            pending: Vec::new(),
            state: SessionState::Open,
            created_at: now,
            expires_at: now + ttl_secs,
            pending_data_bytes: 0,
        }
    }

    pub fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Session store keyed by collection id, origin-checked on every access
pub struct SessionStore {
    sessions: DashMap<String, SigningSession>,
    ttl: Duration,
    max_per_origin: usize,
    max_data_size: u64,
    last_sweep: AtomicU64,
}

impl SessionStore {
    pub fn new(ttl_secs: u64, max_per_origin: usize, max_data_size: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
            max_per_origin,
            max_data_size,
            last_sweep: AtomicU64::new(0),
        }
    }

    /// Create a new session.
    ///
    /// Collection identifiers are caller-generated and untrusted: a
    /// collision with any existing session is an error, never an overwrite.
    pub fn create(&self, collection_id: &str, origin: &str, transaction: Transaction) -> Result<()> {
        self.maybe_sweep();

        if transaction.data_size > self.max_data_size {
            return Err(WicketError::Session(format!(
                "Declared data size {} exceeds maximum {}",
                transaction.data_size, self.max_data_size
            )));
        }

        let open_for_origin = self
            .sessions
            .iter()
            .filter(|s| s.origin == origin)
            .count();
        if open_for_origin >= self.max_per_origin {
            return Err(WicketError::Session(
                "Too many open signing sessions for origin".to_string(),
            ));
        }

        match self.sessions.entry(collection_id.to_string()) {
            Entry::Occupied(_) => Err(WicketError::Session(
                "Collection identifier already in use".to_string(),
            )),
            Entry::Vacant(slot) => {
                debug!(origin = %origin, collection_id = %collection_id, "Opened signing session");
                slot.insert(SigningSession::new(
                    collection_id.to_string(),
                    origin.to_string(),
                    transaction,
                    self.ttl.as_secs(),
                ));
                Ok(())
            }
        }
    }

    /// Run `f` against the open session for (collection_id, origin).
    ///
    /// Returns `None` when the session is missing, expired, or owned by a
    /// different origin — the three cases are indistinguishable to callers.
    /// The closure runs under the entry's exclusive lock, so per-session
    /// mutation is serialized.
    pub fn with_open_session<R>(
        &self,
        collection_id: &str,
        origin: &str,
        f: impl FnOnce(&mut SigningSession) -> Result<R>,
    ) -> Option<Result<R>> {
        let mut session = self.sessions.get_mut(collection_id)?;
        if session.origin != origin || session.state != SessionState::Open {
            return None;
        }
        if session.is_expired() {
            drop(session);
            self.remove(collection_id);
            return None;
        }
        Some(f(&mut session))
    }

    /// Remove and return the session for (collection_id, origin).
    ///
    /// Same `None` semantics as [`with_open_session`](Self::with_open_session).
    pub fn take(&self, collection_id: &str, origin: &str) -> Option<SigningSession> {
        let (_, session) = self
            .sessions
            .remove_if(collection_id, |_, s| s.origin == origin)?;
        if session.is_expired() {
            return None;
        }
        Some(session)
    }

    /// Delete unconditionally
    pub fn remove(&self, collection_id: &str) {
        if self.sessions.remove(collection_id).is_some() {
            debug!(collection_id = %collection_id, "Removed signing session");
        }
    }

    /// Purge every session belonging to an origin (used on disconnect)
    pub fn remove_origin(&self, origin: &str) {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.origin != origin);
        let removed = before - self.sessions.len();
        if removed > 0 {
            info!(origin = %origin, count = removed, "Purged sessions for origin");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sweep expired sessions at most once per interval
    fn maybe_sweep(&self) {
        let now = unix_now();
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now - last < SWEEP_INTERVAL_SECS {
            return;
        }

        if self
            .last_sweep
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            self.sweep();
        }
    }

    /// Force removal of expired sessions
    pub fn sweep(&self) {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired());
        let removed = before - self.sessions.len();
        if removed > 0 {
            info!(count = removed, "Swept expired signing sessions");
        }
    }
}

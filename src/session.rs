//! Session transcript storage
//!
//! Sessions map an opaque identifier to an ordered transcript of
//! `User: ...` / `AI: ...` lines. The orchestrator depends on the
//! [`SessionStore`] trait so a persistent backend can replace the in-memory
//! one without touching request handling.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default cap on transcript lines per session
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Storage for bounded session transcripts
///
/// Implementations must apply `append` atomically: the read, the push, and
/// the front truncation happen in one critical section.
pub trait SessionStore: Send + Sync {
    /// Transcript for `id`, empty when the session is unknown
    fn get(&self, id: &str) -> Vec<String>;

    /// Append lines, creating the session if needed, then drop the oldest
    /// lines beyond the cap
    fn append(&self, id: &str, lines: Vec<String>);

    /// Empty a known session; returns `false` and creates nothing for
    /// unknown ids
    fn clear(&self, id: &str) -> bool;

    /// Whether a session with this id exists
    fn exists(&self, id: &str) -> bool;
}

/// Process-lifetime session store behind a single lock
///
/// # Examples
///
/// ```
/// use codeproxy::session::{MemorySessionStore, SessionStore};
///
/// let store = MemorySessionStore::new(4);
/// store.append("s1", vec!["User: a".into(), "AI: b".into()]);
/// store.append("s1", vec!["User: c".into(), "AI: d".into()]);
/// store.append("s1", vec!["User: e".into(), "AI: f".into()]);
/// assert_eq!(store.get("s1"), vec!["User: c", "AI: d", "User: e", "AI: f"]);
/// assert!(store.get("unknown").is_empty());
/// ```
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<String>>>,
    max_entries: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl MemorySessionStore {
    /// Create an empty store capping each transcript at `max_entries` lines
    pub fn new(max_entries: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Per-session line cap
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of known sessions
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no session has been created yet
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a transcript half-written
    // (every mutation is a single Vec operation), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<String>>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<String>>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Vec<String> {
        self.read().get(id).cloned().unwrap_or_default()
    }

    fn append(&self, id: &str, lines: Vec<String>) {
        let mut sessions = self.write();
        let transcript = sessions.entry(id.to_string()).or_default();
        transcript.extend(lines);
        if transcript.len() > self.max_entries {
            let overflow = transcript.len() - self.max_entries;
            transcript.drain(..overflow);
        }
        tracing::trace!(session_id = id, lines = transcript.len(), "Session updated");
    }

    fn clear(&self, id: &str) -> bool {
        match self.write().get_mut(id) {
            Some(transcript) => {
                transcript.clear();
                true
            }
            None => false,
        }
    }

    fn exists(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }
}

//! Cookie-keyed session store.
//!
//! Each browser gets one [`SessionEntry`]: the [`SessionState`] it renders and
//! the [`ProgressTracker`] the OCR loop writes to. Ids only need to be unique
//! within one server process.
//!
//! The store is bounded. Sessions idle for longer than the idle timeout are
//! dropped, and creating a session beyond the cap evicts the least recently
//! used one. A session a request still holds is never evicted.

use crate::progress::ProgressTracker;
use crate::session::SessionState;
use axum::http::{header, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "file2txt_session";

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Default idle time after which a session is dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(2 * 60 * 60);

/// State of one browser session.
#[derive(Debug, Default)]
pub struct SessionEntry {
    state: Mutex<SessionState>,
    pub progress: ProgressTracker,
}

impl SessionEntry {
    /// Lock the session state, recovering from a poisoned lock.
    pub fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug)]
struct Slot {
    entry: Arc<SessionEntry>,
    last_access: Instant,
}

impl Slot {
    /// A handler still holds the entry.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.entry) > 1
    }
}

/// All live sessions. Cloning shares the same map.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Slot>>>,
    counter: Arc<AtomicU64>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `max_sessions` (at least one) sessions, each
    /// dropped after `idle_timeout` without a request.
    pub fn with_limits(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            counter: Arc::default(),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    /// Find the session named by the request's cookie, or create one.
    ///
    /// The returned headers carry `Set-Cookie` when a session was created.
    pub fn resolve(&self, headers: &HeaderMap) -> (Arc<SessionEntry>, HeaderMap) {
        let now = Instant::now();
        let mut sessions = self.lock();
        self.drop_idle(&mut sessions, now);

        if let Some(slot) = session_id(headers).and_then(|id| sessions.get_mut(id)) {
            slot.last_access = now;
            return (Arc::clone(&slot.entry), HeaderMap::new());
        }

        self.make_room(&mut sessions);
        let id = self.next_id();
        debug!("New session {} ({} live)", id, sessions.len() + 1);
        let entry = Arc::new(SessionEntry::default());
        sessions.insert(
            id.clone(),
            Slot {
                entry: Arc::clone(&entry),
                last_access: now,
            },
        );

        let mut out = HeaderMap::new();
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            out.insert(header::SET_COOKIE, value);
        }
        (entry, out)
    }

    /// Find the session named by the request's cookie without creating one.
    pub fn lookup(&self, headers: &HeaderMap) -> Option<Arc<SessionEntry>> {
        let now = Instant::now();
        let mut sessions = self.lock();
        self.drop_idle(&mut sessions, now);

        let slot = sessions.get_mut(session_id(headers)?)?;
        slot.last_access = now;
        Some(Arc::clone(&slot.entry))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn drop_idle(&self, sessions: &mut HashMap<String, Slot>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, slot| {
            slot.in_use() || now.duration_since(slot.last_access) < self.idle_timeout
        });
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!("Dropped {} idle sessions", dropped);
        }
    }

    /// Evict least recently used sessions until one more fits.
    fn make_room(&self, sessions: &mut HashMap<String, Slot>) {
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(_, slot)| !slot.in_use())
                .min_by_key(|(_, slot)| slot.last_access)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    debug!("Evicting session {}", id);
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    fn next_id(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        format!("{:x}{:x}{:04x}", nanos, std::process::id(), seq)
    }
}

/// Value of the session cookie in `headers`, if any.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

//! Per-user volatile conversational state with idle-timeout reset and
//! periodic eviction.
//!
//! Expiry is checked lazily on every access; a background sweep (driven by
//! the gateway) removes entries entirely. Both use the same threshold.

use crate::actions::ActionId;
use crate::menu::MenuId;
use inmo_core::traits::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// State of one running guided action. Exists only while the action runs;
/// holding step and data together makes "step set iff action set" structural.
#[derive(Debug, Clone)]
pub struct ActionState {
    pub action: ActionId,
    pub step: u32,
    /// Values accumulated so far, under canonical keys.
    pub data: HashMap<String, String>,
    /// File tokens collected by multi-file steps.
    pub files: Vec<String>,
}

impl ActionState {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            step: 1,
            data: HashMap::new(),
            files: Vec::new(),
        }
    }
}

/// Volatile conversational state for one user.
#[derive(Debug, Clone)]
pub struct Session {
    pub current_menu: MenuId,
    pub action: Option<ActionState>,
    pub last_activity: Instant,
    /// Stack of visited menus (most recent last).
    pub history: Vec<MenuId>,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            current_menu: MenuId::Main,
            action: None,
            last_activity: now,
            history: Vec::new(),
        }
    }

    /// In-place reset to the post-timeout baseline.
    fn reset(&mut self) {
        self.current_menu = MenuId::Main;
        self.action = None;
        self.history.clear();
    }
}

/// Keyed store of sessions. All mutation for one inbound event happens inside
/// a single `with_session` closure while the map lock is held; the closure is
/// synchronous, so the lock never spans an external call.
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
    idle_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            idle_timeout,
            clock,
        }
    }

    /// Run `f` against the user's session, creating it on first contact and
    /// resetting it in place if it idled past the timeout. Every call
    /// refreshes `last_activity`.
    pub async fn with_session<R>(&self, user_id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        let now = self.clock.now();
        let mut map = self.inner.lock().await;
        let session = map
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(now));

        if now.duration_since(session.last_activity) > self.idle_timeout {
            debug!("session for {user_id} idled out, resetting");
            session.reset();
        }
        session.last_activity = now;

        f(session)
    }

    /// Sweep out entries idle past the timeout. Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, s| now.duration_since(s.last_activity) <= self.idle_timeout);
        before - map.len()
    }

    /// Read-only copy, for tests and the status surface.
    pub async fn snapshot(&self, user_id: &str) -> Option<Session> {
        self.inner.lock().await.get(user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use inmo_core::traits::Clock;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Manually advanced clock for timeout tests.
    pub struct FakeClock {
        now: Mutex<Instant>,
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        pub fn advance(&self, d: Duration) {
            *self.now.lock().unwrap() += d;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::FakeClock;
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30 * 60);

    fn store_with_clock() -> (SessionStore, Arc<FakeClock>) {
        let clock = Arc::new(FakeClock::new());
        let store = SessionStore::new(TIMEOUT, clock.clone());
        (store, clock)
    }

    #[tokio::test]
    async fn test_creates_on_first_access() {
        let (store, _clock) = store_with_clock();
        let menu = store.with_session("591700", |s| s.current_menu).await;
        assert_eq!(menu, MenuId::Main);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_idle_session_resets_on_access() {
        let (store, clock) = store_with_clock();
        store
            .with_session("591700", |s| {
                s.current_menu = MenuId::Clientes;
                s.action = Some(ActionState::new(ActionId::AddClient));
                s.history.push(MenuId::Main);
            })
            .await;

        clock.advance(TIMEOUT + Duration::from_secs(1));

        store
            .with_session("591700", |s| {
                assert_eq!(s.current_menu, MenuId::Main);
                assert!(s.action.is_none());
                assert!(s.history.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn test_activity_refresh_prevents_reset() {
        let (store, clock) = store_with_clock();
        store
            .with_session("591700", |s| s.current_menu = MenuId::Propiedades)
            .await;

        // Touch the session just under the timeout, twice.
        for _ in 0..2 {
            clock.advance(TIMEOUT - Duration::from_secs(60));
            store.with_session("591700", |_| ()).await;
        }

        let snap = store.snapshot("591700").await.unwrap();
        assert_eq!(snap.current_menu, MenuId::Propiedades);
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_idle() {
        let (store, clock) = store_with_clock();
        store.with_session("viejo", |_| ()).await;
        clock.advance(TIMEOUT + Duration::from_secs(1));
        store.with_session("nuevo", |_| ()).await;

        let evicted = store.evict_idle().await;
        assert_eq!(evicted, 1);
        assert!(store.snapshot("viejo").await.is_none());
        assert!(store.snapshot("nuevo").await.is_some());
    }
}

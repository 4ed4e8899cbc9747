//! The merged user collection: remote users from the API plus users created
//! locally and persisted in the key-value store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::client::UserSource;
use crate::store::{KeyValueStore, LOCAL_USERS_KEY};
use crate::types::{NewUser, User};

pub const FETCH_USERS_FAILED: &str = "Failed to fetch users. Please try again later.";

/// Shared handle to the user collection. Clones point at the same state.
///
/// Local users are restored synchronously in [`UserRepository::new`], so
/// any reader observes them before the remote fetch has even started. The
/// loading flag only tracks the remote fetch.
pub struct UserRepository<S, K> {
    inner: Arc<Inner<S, K>>,
}

struct Inner<S, K> {
    source: S,
    store: K,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    remote: Vec<User>,
    local: Vec<User>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    closed: bool,
    local_revision: u64,
}

impl State {
    fn next_id(&self) -> i64 {
        let ids = || self.remote.iter().chain(self.local.iter()).map(|u| u.id);
        let max_id = ids().fold(0, i64::max);

        max_id.checked_add(1).unwrap_or_else(|| {
            // Some record already holds the largest id; take the lowest free one.
            let taken: HashSet<i64> = ids().collect();
            let id = (1..=i64::MAX).find(|id| !taken.contains(id)).unwrap_or(max_id);
            warn!(max_id, id, "user ids exhausted, reusing a free id");
            id
        })
    }
}

impl<S, K> Clone for UserRepository<S, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: UserSource, K: KeyValueStore> UserRepository<S, K> {
    pub fn new(source: S, store: K) -> Self {
        let local = load_local_users(&store);

        Self {
            inner: Arc::new(Inner {
                source,
                store,
                state: Mutex::new(State {
                    local,
                    ..State::default()
                }),
            }),
        }
    }

    /// Restore local users, then fetch remote users.
    ///
    /// Fetch failures are recorded in [`UserRepository::error`], never returned.
    pub async fn initialize(source: S, store: K) -> Self {
        let repository = Self::new(source, store);
        repository.refresh().await;
        repository
    }

    /// Fetch the remote collection. If another refresh starts or the handle is
    /// shut down while this one is in flight, its result is discarded.
    pub async fn refresh(&self) {
        let generation = {
            let mut state = self.state();
            if state.closed {
                return;
            }
            state.generation += 1;
            state.loading = true;
            state.generation
        };

        let result = self.inner.source.fetch_users().await;

        let mut state = self.state();
        if state.closed || state.generation != generation {
            debug!(generation, "discarding stale user fetch");
            return;
        }

        match result {
            Ok(users) => {
                info!(count = users.len(), "loaded remote users");
                state.remote = users;
                state.error = None;
            }
            Err(e) => {
                warn!(error = %e, "remote user fetch failed");
                state.error = Some(FETCH_USERS_FAILED.to_string());
            }
        }
        state.loading = false;
    }

    /// Create a local user with the next free id and persist every local user.
    ///
    /// The id is one more than the largest id currently known, so a remote
    /// fetch still in flight is not taken into account.
    pub fn add(&self, candidate: NewUser) -> User {
        let (user, local) = {
            let mut state = self.state();
            let user = candidate.with_id(state.next_id());
            state.local.push(user.clone());
            state.local_revision += 1;
            (user, state.local.clone())
        };

        self.persist(&local);
        user
    }

    fn persist(&self, local: &[User]) {
        let saved = serde_json::to_string(local)
            .map_err(Into::into)
            .and_then(|json| self.inner.store.set(LOCAL_USERS_KEY, &json));

        if let Err(e) = saved {
            warn!(error = %e, "failed to persist local users");
        }
    }

    /// Stop accepting fetch results. Any fetch in flight is left to finish
    /// and its result dropped.
    pub fn shutdown(&self) {
        let mut state = self.state();
        state.closed = true;
        state.generation += 1;
        state.loading = false;
    }

    /// Local users first, then remote users.
    pub fn users(&self) -> Vec<User> {
        let state = self.state();
        state
            .local
            .iter()
            .chain(state.remote.iter())
            .cloned()
            .collect()
    }

    pub fn remote_users(&self) -> Vec<User> {
        self.state().remote.clone()
    }

    pub fn local_users(&self) -> Vec<User> {
        self.state().local.clone()
    }

    pub fn find_local(&self, id: i64) -> Option<User> {
        self.state().local.iter().find(|u| u.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Bumped on every change to the local users.
    pub fn local_revision(&self) -> u64 {
        self.state().local_revision
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_local_users<K: KeyValueStore>(store: &K) -> Vec<User> {
    let stored = match store.get(LOCAL_USERS_KEY) {
        Ok(Some(stored)) => stored,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "could not read stored users");
            return Vec::new();
        }
    };

    match serde_json::from_str(&stored) {
        Ok(users) => users,
        Err(e) => {
            error!(error = %e, "error parsing stored users");
            Vec::new()
        }
    }
}

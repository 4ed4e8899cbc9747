//! Single-user resolution for the detail view.

use tracing::debug;

use crate::client::UserSource;
use crate::error::{DirectoryError, Result};
use crate::repository::UserRepository;
use crate::store::KeyValueStore;
use crate::types::User;

pub const LOAD_USER_FAILED: &str = "Failed to load user details. Please try again.";

/// Resolve `id` against local users first, then the remote source.
///
/// Local matching reads the leading integer of `id`, so `"3.5"` and `"3abc"`
/// both select local user 3. An id without one goes straight to the remote
/// source, which decides whether it exists.
pub async fn find_user<S, K>(repository: &UserRepository<S, K>, id: &str) -> Result<User>
where
    S: UserSource,
    K: KeyValueStore,
{
    let id = id.trim();
    if id.is_empty() {
        return Err(DirectoryError::InvalidId(id.to_string()));
    }

    if let Some(user) = leading_int(id).and_then(|n| repository.find_local(n)) {
        debug!(id, "resolved local user");
        return Ok(user);
    }

    repository.source().fetch_user(id).await
}

/// The optionally signed run of digits at the start of `s`.
fn leading_int(s: &str) -> Option<i64> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }

    let sign = s.len() - unsigned.len();
    s[..sign + digits].parse().ok()
}

/// Outcome of a lookup as the detail view shows it.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Found(User),
    /// Every failure, not-found included, carries the same message.
    Failed(&'static str),
}

/// Caches the last resolution and re-runs it only when the id or the set of
/// local users has changed since.
#[derive(Default)]
pub struct UserLookup {
    key: Option<(String, u64)>,
    state: Option<LookupState>,
}

impl UserLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<S, K>(&mut self, repository: &UserRepository<S, K>, id: &str) -> &LookupState
    where
        S: UserSource,
        K: KeyValueStore,
    {
        let key = (id.to_string(), repository.local_revision());

        let state = match self.state.take() {
            Some(state) if self.key.as_ref() == Some(&key) => state,
            _ => match find_user(repository, id).await {
                Ok(user) => LookupState::Found(user),
                Err(e) => {
                    debug!(error = %e, id, "user lookup failed");
                    LookupState::Failed(LOAD_USER_FAILED)
                }
            },
        };

        self.key = Some(key);
        self.state.insert(state)
    }
}

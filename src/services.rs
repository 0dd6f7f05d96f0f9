//! Collaborator contracts consumed by the formatter.
//!
//! The formatter depends on two external services, both passed in at
//! construction time rather than looked up ambiently:
//!
//! - [`Sequencer`]: hands out per-subscriber monotonic sequence numbers
//! - [`UserDirectory`]: resolves user ids to directory records for byline
//!   enrichment
//!
//! In production these sit in front of the delivery system's datastore; the
//! in-memory implementations here back the CLI driver and the test suite.

use crate::models::{Subscriber, User};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Errors produced by sequencing collaborators.
pub type SequencerError = Box<dyn std::error::Error + Send + Sync>;

/// Hands out publish sequence numbers, monotonically increasing per
/// subscriber.
///
/// Failures propagate as-is; the formatter wraps them into its conversion
/// error without retrying.
pub trait Sequencer: Send + Sync {
    /// Generate the next sequence number for `subscriber`.
    fn generate_sequence_number(&self, subscriber: &Subscriber) -> Result<u64, SequencerError>;
}

/// Resolves user identifiers to directory records.
pub trait UserDirectory: Send + Sync {
    /// Look up a user by id, returning `None` when no such user exists.
    fn find_one(&self, id: &str) -> Option<User>;
}

/// In-memory [`Sequencer`] keeping one counter per subscriber.
///
/// Counters start at 1 and only ever move forward. Safe to share across
/// threads; the map is guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemorySequencer {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemorySequencer {
    /// Create a sequencer with no counters allocated yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sequencer for InMemorySequencer {
    fn generate_sequence_number(&self, subscriber: &Subscriber) -> Result<u64, SequencerError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| format!("sequencer lock poisoned: {e}"))?;
        let counter = counters.entry(subscriber.id.clone()).or_insert(0);
        *counter += 1;
        debug!(subscriber = %subscriber.id, seq = *counter, "Generated sequence number");
        Ok(*counter)
    }
}

/// In-memory [`UserDirectory`] backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, User>,
}

impl InMemoryUserDirectory {
    /// Build a directory from a list of user records.
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    /// An empty directory; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_one(&self, id: &str) -> Option<User> {
        self.users.get(id).cloned()
    }
}

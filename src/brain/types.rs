//! Data model for the learned-response store
//!
//! Field names follow the camelCase JSON layout of `baby_data.json` so that
//! existing data files keep loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// A taught message and the replies it can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    /// Lookup key, unique within the store
    pub message: String,
    /// Never empty while the trigger exists
    #[serde(default)]
    pub replies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Trigger {
    pub fn new(message: impl Into<String>, replies: Vec<String>, created_by: Option<String>) -> Self {
        Self {
            message: message.into(),
            replies,
            created_by,
            created_at: Some(Utc::now()),
        }
    }
}

/// Aggregate statistics, always derived from the live state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_conversations: usize,
    #[serde(default)]
    pub total_teachers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Identity → number of successful teach calls
pub type TeacherLedger = BTreeMap<String, u64>;

/// Full snapshot of the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainState {
    #[serde(default, alias = "triggers")]
    pub conversations: Vec<Trigger>,
    #[serde(default, alias = "teacherLedger")]
    pub teachers: TeacherLedger,
    #[serde(default)]
    pub stats: Stats,
}

impl BrainState {
    /// Empty state stamped with its creation time
    pub fn fresh() -> Self {
        let mut state = Self::default();
        state.stats.created_at = Some(Utc::now());
        state
    }

    /// Find a trigger by exact message
    pub fn get(&self, message: &str) -> Option<&Trigger> {
        self.conversations.iter().find(|t| t.message == message)
    }

    pub(crate) fn position(&self, message: &str) -> Option<usize> {
        self.conversations.iter().position(|t| t.message == message)
    }

    /// Number of replies stored for a trigger, 0 when unknown
    pub fn reply_count(&self, message: &str) -> usize {
        self.get(message).map(|t| t.replies.len()).unwrap_or(0)
    }

    /// Recompute stats from the current triggers and ledger
    pub fn refresh_stats(&mut self) {
        self.stats.total_conversations = self.conversations.len();
        self.stats.total_teachers = self.teachers.len();
        let now = Utc::now();
        // Stores created before the init timestamp existed get one on first write
        self.stats.created_at.get_or_insert(now);
        self.stats.updated_at = Some(now);
    }

    /// Drop records that break the store invariants.
    ///
    /// Hand-edited files can carry triggers with no replies or the same
    /// message twice; the first record for a message wins.
    pub fn normalize(&mut self) {
        let before = self.conversations.len();
        let mut seen = HashSet::new();
        self.conversations
            .retain(|t| !t.replies.is_empty() && seen.insert(t.message.clone()));

        let dropped = before - self.conversations.len();
        if dropped > 0 {
            warn!("Dropped {} invalid trigger record(s) while loading", dropped);
        }
        self.stats.total_conversations = self.conversations.len();
        self.stats.total_teachers = self.teachers.len();
    }
}

/// One or more replies supplied in a single teach call.
///
/// Always holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOrMany(Vec<String>);

impl OneOrMany {
    pub fn one(reply: impl Into<String>) -> Self {
        Self(vec![reply.into()])
    }

    /// Returns `None` when `replies` is empty
    pub fn many(replies: Vec<String>) -> Option<Self> {
        if replies.is_empty() {
            None
        } else {
            Some(Self(replies))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

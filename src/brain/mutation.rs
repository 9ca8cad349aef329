//! Teach, edit and remove operations on a [`BrainState`] snapshot
//!
//! Each function applies one logical change and refreshes the derived stats.
//! Persisting the result is the caller's job.

use thiserror::Error;
use tracing::debug;

use super::types::{BrainState, OneOrMany, Trigger};

/// Edit or indexed-remove target does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("Conversation not found")]
    Trigger,
    #[error("Conversation or index not found")]
    TriggerOrIndex,
}

/// Result of a teach call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taught {
    pub trigger: String,
    pub teacher: Option<String>,
    /// The teacher's updated count, 0 without a teacher
    pub teachs: u64,
    pub reply_count: usize,
}

/// What a remove call did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    /// Whole-trigger removal; `existed` is false for a no-op
    Trigger { existed: bool },
    /// One reply removed; `trigger_deleted` when it was the last one
    Reply { index: usize, trigger_deleted: bool },
}

/// Create the trigger or append to its replies, and credit the teacher
pub fn teach(
    state: &mut BrainState,
    trigger: &str,
    replies: OneOrMany,
    teacher: Option<&str>,
) -> Taught {
    let reply_count = match state.position(trigger) {
        Some(idx) => {
            let existing = &mut state.conversations[idx];
            existing.replies.extend(replies.into_vec());
            existing.replies.len()
        }
        None => {
            let created = Trigger::new(trigger, replies.into_vec(), teacher.map(str::to_string));
            let count = created.replies.len();
            state.conversations.push(created);
            count
        }
    };

    let teachs = match teacher {
        Some(id) => {
            let count = state.teachers.entry(id.to_string()).or_insert(0);
            *count += 1;
            *count
        }
        None => 0,
    };

    state.refresh_stats();
    debug!("Taught '{}' ({} replies)", trigger, reply_count);

    Taught {
        trigger: trigger.to_string(),
        teacher: teacher.map(str::to_string),
        teachs,
        reply_count,
    }
}

/// Replace every reply of an existing trigger with `replacement`
pub fn edit(state: &mut BrainState, trigger: &str, replacement: &str) -> Result<(), NotFound> {
    let idx = state.position(trigger).ok_or(NotFound::Trigger)?;
    state.conversations[idx].replies = vec![replacement.to_string()];
    state.refresh_stats();
    Ok(())
}

/// Delete a whole trigger. Removing an unknown trigger is not an error.
pub fn remove_trigger(state: &mut BrainState, trigger: &str) -> Removed {
    let before = state.conversations.len();
    state.conversations.retain(|t| t.message != trigger);
    let existed = state.conversations.len() != before;
    state.refresh_stats();
    Removed::Trigger { existed }
}

/// Remove one reply by position.
///
/// `index` is the raw caller-supplied value; anything that is not a valid
/// position in the reply list counts as not found.
pub fn remove_reply(state: &mut BrainState, trigger: &str, index: &str) -> Result<Removed, NotFound> {
    let idx = state.position(trigger).ok_or(NotFound::TriggerOrIndex)?;
    let pos = parse_index(index)
        .filter(|&i| i < state.conversations[idx].replies.len())
        .ok_or(NotFound::TriggerOrIndex)?;

    let replies = &mut state.conversations[idx].replies;
    replies.remove(pos);
    let trigger_deleted = replies.is_empty();
    if trigger_deleted {
        state.conversations.remove(idx);
    }

    state.refresh_stats();
    Ok(Removed::Reply {
        index: pos,
        trigger_deleted,
    })
}

/// Canonical decimal only: no sign, whitespace or leading zeros
fn parse_index(index: &str) -> Option<usize> {
    let canonical = !index.is_empty()
        && index.bytes().all(|b| b.is_ascii_digit())
        && (index == "0" || !index.starts_with('0'));
    if canonical {
        index.parse().ok()
    } else {
        None
    }
}

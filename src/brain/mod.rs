//! Learned-response engine
//!
//! [`Brain`] is the single entry point: it takes a [`Request`], runs it
//! against the store through the matcher or the mutation functions, and
//! returns a [`Response`]. Mutations are serialized behind one write lock
//! and each one persists the full state before reporting success.

pub mod matcher;
pub mod mutation;
pub mod request;
pub mod store;
pub mod types;

pub use request::{ListTarget, RawRequest, Request, Response, TeacherList};
pub use store::{JsonFileStore, MemoryStore, StateStore, StoreError};
pub use types::{BrainState, OneOrMany, Stats, TeacherLedger, Trigger};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, info};

use mutation::Removed;

/// Replies used when nothing was taught for the input
pub const DEFAULT_REPLIES: &[&str] = &[
    "I'm still learning! Can you teach me how to respond to that?",
    "That's interesting! Tell me more.",
    "I don't understand that yet. Can you explain?",
    "Wow, that's new to me!",
    "Can you teach me what to say when someone says that?",
];

pub const WELCOME_MESSAGE: &str = "Welcome to Baby API";

#[derive(Debug, Error)]
pub enum BrainError {
    /// The mutation was computed but could not be persisted
    #[error("Failed to save data: {0}")]
    Persistence(#[from] StoreError),
}

/// Liveness view with store counts
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub timestamp: DateTime<Utc>,
    pub conversations: usize,
    pub teachers: usize,
}

/// Service summary for the root endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub version: &'static str,
    pub stats: Stats,
}

pub struct Brain {
    store: Arc<dyn StateStore>,
    write_lock: tokio::sync::Mutex<()>,
    rng: Mutex<StdRng>,
}

impl Brain {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    /// Deterministic reply selection, for tests
    pub fn with_seed(store: Arc<dyn StateStore>, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: Arc<dyn StateStore>, rng: StdRng) -> Self {
        Self {
            store,
            write_lock: tokio::sync::Mutex::new(()),
            rng: Mutex::new(rng),
        }
    }

    /// Dispatch one request
    pub async fn handle(&self, request: Request) -> Result<Response, BrainError> {
        match request {
            Request::Remove { trigger, index } => self.remove(&trigger, index.as_deref()).await,
            Request::List(target) => Ok(self.list(&target)),
            Request::Edit { trigger, replacement } => self.edit(&trigger, &replacement).await,
            Request::Teach {
                trigger,
                replies,
                teacher,
            } => self.teach(&trigger, replies, teacher.as_deref()).await,
            Request::Lookup { text, .. } => Ok(Response::Reply {
                reply: self.lookup(&text),
            }),
            Request::Welcome => Ok(Response::Welcome {
                message: WELCOME_MESSAGE.to_string(),
                stats: self.stats(),
            }),
        }
    }

    /// Reply for `text`, falling back to a random default
    pub fn lookup(&self, text: &str) -> String {
        let state = self.store.load();
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        matcher::match_reply(text, &state.conversations, &mut *rng).unwrap_or_else(|| {
            DEFAULT_REPLIES
                .choose(&mut *rng)
                .copied()
                .unwrap_or(DEFAULT_REPLIES[0])
                .to_string()
        })
    }

    pub fn list(&self, target: &ListTarget) -> Response {
        let state = self.store.load();
        match target {
            ListTarget::All => Response::ListAll {
                length: state.conversations.len(),
                teacher: TeacherList {
                    teacher_list: state
                        .teachers
                        .iter()
                        .map(|(id, count)| BTreeMap::from([(id.clone(), *count)]))
                        .collect(),
                },
            },
            ListTarget::Trigger(message) => Response::ListCount {
                data: state.reply_count(message),
            },
        }
    }

    pub async fn teach(
        &self,
        trigger: &str,
        replies: OneOrMany,
        teacher: Option<&str>,
    ) -> Result<Response, BrainError> {
        let taught = self
            .mutate(|state| mutation::teach(state, trigger, replies, teacher))
            .await?;

        info!(
            "Taught '{}' by {} ({} replies)",
            taught.trigger,
            taught.teacher.as_deref().unwrap_or("anonymous"),
            taught.reply_count
        );

        Ok(Response::Taught {
            message: format!("Successfully taught \"{}\"", taught.trigger),
            teacher: taught.teacher,
            teachs: taught.teachs,
            reply_count: taught.reply_count,
        })
    }

    pub async fn edit(&self, trigger: &str, replacement: &str) -> Result<Response, BrainError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.store.load();

        if let Err(not_found) = mutation::edit(&mut state, trigger, replacement) {
            return Ok(Response::message(not_found.to_string()));
        }
        self.persist(&state)?;

        info!("Edited '{}'", trigger);
        Ok(Response::message(format!(
            "Edited \"{}\" to \"{}\"",
            trigger, replacement
        )))
    }

    /// Remove a trigger, or one of its replies when `index` is given
    pub async fn remove(&self, trigger: &str, index: Option<&str>) -> Result<Response, BrainError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.store.load();

        let removed = match index {
            Some(index) => match mutation::remove_reply(&mut state, trigger, index) {
                Ok(removed) => removed,
                Err(not_found) => return Ok(Response::message(not_found.to_string())),
            },
            None => mutation::remove_trigger(&mut state, trigger),
        };
        self.persist(&state)?;

        let message = match removed {
            Removed::Reply {
                index,
                trigger_deleted,
            } => {
                info!(
                    "Removed reply {} from '{}'{}",
                    index,
                    trigger,
                    if trigger_deleted { " (trigger deleted)" } else { "" }
                );
                format!("Removed reply at index {} from \"{}\"", index, trigger)
            }
            Removed::Trigger { existed } => {
                info!("Removed '{}' (existed: {})", trigger, existed);
                format!("Removed \"{}\" from database", trigger)
            }
        };
        Ok(Response::message(message))
    }

    pub fn stats(&self) -> Stats {
        self.store.load().stats
    }

    pub fn health(&self) -> Health {
        let state = self.store.load();
        Health {
            timestamp: Utc::now(),
            conversations: state.conversations.len(),
            teachers: state.teachers.len(),
        }
    }

    pub fn info(&self) -> Info {
        Info {
            version: crate::VERSION,
            stats: self.stats(),
        }
    }

    /// Load, apply `f`, save, all under the write lock
    async fn mutate<T>(&self, f: impl FnOnce(&mut BrainState) -> T) -> Result<T, BrainError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.store.load();
        let out = f(&mut state);
        self.persist(&state)?;
        Ok(out)
    }

    fn persist(&self, state: &BrainState) -> Result<(), BrainError> {
        self.store.save(state).map_err(|e| {
            error!("Failed to save to {}: {}", self.store.describe(), e);
            BrainError::Persistence(e)
        })
    }
}

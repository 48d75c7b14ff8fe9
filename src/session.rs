//! # Chat sessions
//!
//! Per-chat wizard state: the last uploaded photo and the brand/item
//! selections made so far. Sessions are created lazily on first access,
//! overwritten when a new photo restarts the wizard, and never evicted
//! (the key space is bounded by active chats).

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use teloxide::types::ChatId;
use tokio::sync::Mutex;

/// Explicit wizard position for one chat.
///
/// A skipped item is the empty string; "not yet chosen" is encoded by the
/// variant itself, so the two are never confused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WizardState {
    /// No selection in progress (including "photo received, brand pending").
    #[default]
    Idle,
    /// Brand chosen, waiting for an item selection or skip.
    AwaitingItem { brand: String },
    /// Item chosen or skipped, waiting for a branch selection or skip.
    AwaitingBranch { brand: String, item: String },
}

/// Per-chat record: last uploaded photo plus wizard position.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub image: Option<Vec<u8>>,
    pub state: WizardState,
}

impl ChatSession {
    /// Restart the wizard for a new photo: all selections cleared, only
    /// the new image kept.
    pub fn reset_with_image(&mut self, image: Vec<u8>) {
        *self = ChatSession {
            image: Some(image),
            state: WizardState::Idle,
        };
    }
}

/// Process-wide mapping from chat id to its session.
///
/// Each session sits behind its own async mutex: transitions for one chat
/// are serialized (a double-tapped button cannot interleave two
/// read-modify-write passes) while distinct chats proceed concurrently.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<StdMutex<HashMap<ChatId, Arc<Mutex<ChatSession>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session handle for a chat, creating an empty session on
    /// first access. The outer map lock is held only for the lookup; the
    /// caller locks the returned handle for the duration of a transition.
    pub fn get_or_create(&self, chat_id: ChatId) -> Arc<Mutex<ChatSession>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(chat_id).or_default().clone()
    }
}

use serde::{Deserialize, Serialize};

/// The stored note record, serialized as JSON under `note:<token>`.
/// This shape is only ever written to the store; it is never sent to a
/// client, and `password_hash` in particular never leaves the lifecycle
/// handlers.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Note {
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub ttl_seconds: u64,
    #[serde(default)]
    pub burn_after_read: bool,
    #[serde(default)]
    pub is_markdown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_limit: Option<u32>,
}

/// Creation form. Checkboxes arrive as `Some("on")` when ticked and are
/// absent otherwise. Numeric fields stay strings so a malformed value
/// behaves like an absent one instead of failing deserialization.
#[derive(Debug, Deserialize, Default)]
pub struct CreateNote {
    #[serde(default)]
    pub content: String,
    pub ttl: Option<String>,
    pub burn_after_read: Option<String>,
    pub markdown: Option<String>,
    pub password: Option<String>,
    pub view_limit: Option<String>,
}

impl CreateNote {
    pub fn burn_after_read(&self) -> bool {
        self.burn_after_read.is_some()
    }

    pub fn markdown(&self) -> bool {
        self.markdown.is_some()
    }

    pub fn ttl_choice(&self) -> Option<u64> {
        self.ttl.as_deref().and_then(|ttl| ttl.parse().ok())
    }

    pub fn requested_view_limit(&self) -> Option<u32> {
        self.view_limit.as_deref().and_then(|limit| limit.parse().ok())
    }
}

#[derive(Debug)]
pub struct Created {
    pub token: String,
    pub ttl_seconds: u64,
}

/// Outcome of a successful lookup. Absence is `Error::Gone`, not a variant,
/// so the HTTP layer maps it to 410 alongside every other error.
#[derive(Debug, PartialEq)]
pub enum Resolved {
    NeedsPassword {
        remaining_seconds: u64,
    },
    Readable {
        content: String,
        is_markdown: bool,
        remaining_seconds: u64,
    },
}

/// Content-free creation event kept on the capped history list.
#[derive(Serialize, Deserialize, Debug)]
pub struct CreationEvent {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub token_mask: String,
    pub ttl_seconds: u64,
    pub burn_after_read: bool,
    pub password_protected: bool,
    pub markdown: bool,
}

#[derive(Serialize, Debug)]
pub struct HistoryEntry {
    pub created_at_display: String,
    pub token_mask: String,
    pub ttl_seconds: u64,
    pub burn_after_read: bool,
    pub password_protected: bool,
    pub markdown: bool,
}

#[derive(Serialize, Debug, Default)]
pub struct IndexStats {
    pub total_created: i64,
    pub recent: Vec<HistoryEntry>,
}

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::{
    config::{Config, MAX_CONTENT_CHARS, TTL_CHOICES},
    hasher, sanitize,
    store::{note_key, NoteStore},
    Error, Result,
};

use super::{Created, CreateNote, CreationEvent, HistoryEntry, IndexStats, Note, Resolved};

const CREATED_TOTAL_KEY: &str = "stats:created_total";
const HISTORY_KEY: &str = "history:creations";
const HISTORY_CAP: usize = 200;
const HISTORY_DISPLAY: usize = 12;

// 192 bits of CSPRNG entropy, well past the point where guessing a token
// within any TTL window is feasible.
const TOKEN_BYTES: usize = 24;

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub async fn create(args: CreateNote, store: &dyn NoteStore, config: &Config) -> Result<Created> {
    let content = args.content.trim();
    if content.is_empty() {
        return Err(Error::Validation("Note cannot be empty.".into()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(Error::Validation("Note is too long.".into()));
    }

    let ttl_seconds = args
        .ttl_choice()
        .filter(|ttl| TTL_CHOICES.contains(ttl))
        .unwrap_or(config.default_ttl_seconds);

    let password_hash = match args.password.as_deref() {
        None | Some("") => None,
        Some(password) => {
            if password.chars().count() < config.password_min_len {
                return Err(Error::Validation("Password too short.".into()));
            }
            Some(hasher::hash(password))
        }
    };

    let view_limit = if config.view_limit_enabled {
        args.requested_view_limit().filter(|limit| *limit > 0)
    } else {
        None
    };

    let note = Note {
        content: content.to_owned(),
        created_at: chrono::Utc::now(),
        ttl_seconds,
        burn_after_read: args.burn_after_read(),
        is_markdown: args.markdown(),
        password_hash,
        view_limit,
    };

    let token = generate_token();
    store
        .put(&note_key(&token), &serde_json::to_string(&note)?, ttl_seconds)
        .await?;

    record_creation(store, &token, &note).await;

    Ok(Created { token, ttl_seconds })
}

/// Best-effort creation telemetry. A failure here never fails the create.
async fn record_creation(store: &dyn NoteStore, token: &str, note: &Note) {
    let event = CreationEvent {
        created_at: note.created_at,
        token_mask: format!("{}...{}", &token[..4], &token[token.len() - 4..]),
        ttl_seconds: note.ttl_seconds,
        burn_after_read: note.burn_after_read,
        password_protected: note.password_hash.is_some(),
        markdown: note.is_markdown,
    };

    let result = async {
        store.increment(CREATED_TOTAL_KEY).await?;
        if let Ok(payload) = serde_json::to_string(&event) {
            store.push_capped(HISTORY_KEY, &payload, HISTORY_CAP).await?;
        }
        Ok::<_, crate::store::Error>(())
    }
    .await;

    if let Err(err) = result {
        tracing::warn!("failed to record creation event: {err}");
    }
}

pub async fn resolve(token: &str, unlocked: &[String], store: &dyn NoteStore, config: &Config) -> Result<Resolved> {
    let note = load(token, store).await?;

    if note.password_hash.is_some() && !unlocked.iter().any(|t| t == token) {
        return Ok(Resolved::NeedsPassword {
            remaining_seconds: remaining_ttl(token, store).await,
        });
    }

    // Capture the remaining TTL before any deletion so an expiring-in-0
    // note can still show it.
    let remaining_seconds = remaining_ttl(token, store).await;

    let content = if note.is_markdown {
        sanitize::render_markdown(&note.content)
    } else {
        note.content.clone()
    };

    if note.burn_after_read {
        // Fail closed: if the burn fails, the content is not served.
        store.delete(&note_key(token)).await?;
    } else if config.view_limit_enabled {
        if let Some(limit) = note.view_limit {
            decrement_view_limit(token, &note, limit, remaining_seconds, store).await;
        }
    }

    Ok(Resolved::Readable {
        content,
        is_markdown: note.is_markdown,
        remaining_seconds,
    })
}

/// Decrement-and-rewrite for view-limited notes. The rewrite uses the
/// already-elapsed TTL so it never extends the original expiry. A failed
/// rewrite after the decrement counts as consumed: the note is deleted
/// rather than left with a stale count.
async fn decrement_view_limit(token: &str, note: &Note, limit: u32, remaining_seconds: u64, store: &dyn NoteStore) {
    let key = note_key(token);
    let left = limit.saturating_sub(1);

    if left == 0 || remaining_seconds == 0 {
        if let Err(err) = store.delete(&key).await {
            tracing::warn!("failed to delete exhausted note: {err}");
        }
        return;
    }

    let mut updated = note.clone();
    updated.view_limit = Some(left);

    let rewrite = match serde_json::to_string(&updated) {
        Ok(payload) => store.put(&key, &payload, remaining_seconds).await,
        Err(err) => {
            tracing::warn!("failed to serialize view-limited note: {err}");
            store.delete(&key).await
        }
    };
    if let Err(err) = rewrite {
        tracing::warn!("view-limit rewrite failed, deleting note: {err}");
        let _ = store.delete(&key).await;
    }
}

/// Checks run in order: existence, then a present password, then the
/// hash. A note without a stored hash rejects every unlock attempt.
pub async fn unlock(token: &str, password: Option<&str>, store: &dyn NoteStore) -> Result<()> {
    let note = load(token, store).await?;

    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Err(Error::Validation("Password required.".into()));
    };

    match note.password_hash.as_deref() {
        Some(record) if hasher::verify(record, password) => Ok(()),
        _ => Err(Error::AuthFailed),
    }
}

pub async fn delete(token: &str, store: &dyn NoteStore) -> Result<()> {
    store.delete(&note_key(token)).await?;
    Ok(())
}

/// Index page numbers: total created plus the recent content-free events.
/// Read-only and best-effort, defaults on any store failure.
pub async fn index_stats(store: &dyn NoteStore) -> IndexStats {
    let total_created = match store.get_counter(CREATED_TOTAL_KEY).await {
        Ok(total) => total,
        Err(err) => {
            tracing::warn!("failed to read creation counter: {err}");
            0
        }
    };

    let recent = store
        .list_recent(HISTORY_KEY, HISTORY_DISPLAY)
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|item| serde_json::from_str::<CreationEvent>(item).ok())
        .map(|event| HistoryEntry {
            created_at_display: event.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            token_mask: event.token_mask,
            ttl_seconds: event.ttl_seconds,
            burn_after_read: event.burn_after_read,
            password_protected: event.password_protected,
            markdown: event.markdown,
        })
        .collect();

    IndexStats { total_created, recent }
}

async fn load(token: &str, store: &dyn NoteStore) -> Result<Note> {
    let Some(raw) = store.get(&note_key(token)).await? else {
        return Err(Error::Gone);
    };
    // A malformed record is indistinguishable from an expired one.
    serde_json::from_str(&raw).map_err(|_| Error::Gone)
}

async fn remaining_ttl(token: &str, store: &dyn NoteStore) -> u64 {
    store
        .ttl_remaining(&note_key(token))
        .await
        .ok()
        .flatten()
        .unwrap_or(0)
}

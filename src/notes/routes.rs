use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use minijinja::context;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::{
    config::{Config, TTL_CHOICES},
    store::Store,
    views::Views,
    AppState, Error,
};

use super::{handlers, CreateNote, IndexStats, Resolved};

const UNLOCKED_TOKENS_KEY: &str = "unlocked_tokens";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/notes", post(create_note))
        .route("/s/:token", get(view_note))
        .route("/s/:token/unlock", post(unlock_note))
        .route("/s/:token/delete", post(delete_note))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn index(views: Views, State(store): State<Store>, State(config): State<&'static Config>) -> Response {
    let stats = handlers::index_stats(store.as_ref()).await;
    views.response("index.html", index_context(config, &stats, None))
}

async fn create_note(
    views: Views,
    State(store): State<Store>,
    State(config): State<&'static Config>,
    Form(args): Form<CreateNote>,
) -> Response {
    match handlers::create(args, store.as_ref(), config).await {
        Ok(created) => {
            let share_url = format!("{}/s/{}", config.external_host.trim_end_matches('/'), created.token);
            views.response(
                "share.html",
                context! { share_url, token => created.token, ttl => created.ttl_seconds },
            )
        }
        Err(Error::Validation(message)) => {
            let stats = handlers::index_stats(store.as_ref()).await;
            views.response_with_status(
                StatusCode::BAD_REQUEST,
                "index.html",
                index_context(config, &stats, Some(&message)),
            )
        }
        Err(err) => err.into_response(),
    }
}

async fn view_note(
    Path(token): Path<String>,
    views: Views,
    session: Session,
    State(store): State<Store>,
    State(config): State<&'static Config>,
) -> Response {
    let unlocked = unlocked_tokens(&session).await;
    match handlers::resolve(&token, &unlocked, store.as_ref(), config).await {
        Ok(Resolved::NeedsPassword { remaining_seconds }) => views.response(
            "view.html",
            context! { token, need_password => true, remaining_seconds },
        ),
        Ok(Resolved::Readable {
            content,
            is_markdown,
            remaining_seconds,
        }) => views.response(
            "view.html",
            context! {
                token,
                need_password => false,
                note => context! { content, markdown => is_markdown },
                remaining_seconds,
            },
        ),
        Err(Error::Gone) => gone(&views),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct UnlockForm {
    password: Option<String>,
}

async fn unlock_note(
    Path(token): Path<String>,
    views: Views,
    session: Session,
    State(store): State<Store>,
    Form(form): Form<UnlockForm>,
) -> Response {
    match handlers::unlock(&token, form.password.as_deref(), store.as_ref()).await {
        Ok(()) => {
            remember_unlocked(&session, &token).await;
            Redirect::to(&format!("/s/{token}")).into_response()
        }
        Err(Error::Gone) => gone(&views),
        Err(Error::Validation(message)) => views.response_with_status(
            StatusCode::BAD_REQUEST,
            "view.html",
            context! { token, need_password => true, error => message },
        ),
        Err(Error::AuthFailed) => views.response_with_status(
            StatusCode::FORBIDDEN,
            "view.html",
            context! { token, need_password => true, error => "Incorrect password." },
        ),
        Err(err) => err.into_response(),
    }
}

async fn delete_note(Path(token): Path<String>, State(store): State<Store>) -> Redirect {
    // Unconditional, best-effort. Anyone holding the link may burn the note.
    if let Err(err) = handlers::delete(&token, store.as_ref()).await {
        tracing::warn!("best-effort delete failed: {err}");
    }
    Redirect::to("/")
}

async fn healthz(State(store): State<Store>) -> Response {
    match store.ping().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(err) => {
            tracing::error!("store unreachable: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "store-unreachable" })),
            )
                .into_response()
        }
    }
}

fn gone(views: &Views) -> Response {
    views.response_with_status(StatusCode::GONE, "expired.html", context! {})
}

fn index_context(config: &Config, stats: &IndexStats, error: Option<&str>) -> minijinja::Value {
    let ttl_choices = TTL_CHOICES
        .iter()
        .map(|&ttl| {
            json!({
                "value": ttl,
                "label": ttl_label(ttl),
                "default": ttl == config.default_ttl_seconds,
            })
        })
        .collect::<Vec<_>>();

    context! {
        ttl_choices,
        default_ttl => config.default_ttl_seconds,
        total => stats.total_created,
        notes => stats.recent,
        error,
    }
}

fn ttl_label(ttl: u64) -> String {
    match ttl {
        300 => "5 minutes".into(),
        900 => "15 minutes".into(),
        3600 => "60 minutes".into(),
        other => format!("{other} seconds"),
    }
}

async fn unlocked_tokens(session: &Session) -> Vec<String> {
    session
        .get::<Vec<String>>(UNLOCKED_TOKENS_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn remember_unlocked(session: &Session, token: &str) {
    let mut unlocked = unlocked_tokens(session).await;
    if !unlocked.iter().any(|t| t == token) {
        unlocked.push(token.to_owned());
        if let Err(err) = session.insert(UNLOCKED_TOKENS_KEY, &unlocked).await {
            tracing::warn!("failed to persist unlocked tokens: {err}");
        }
    }
}

mod config;
mod errors;
mod hasher;
mod notes;
mod sanitize;
mod store;
mod views;

use std::sync::Arc;

use axum::Router;
use axum_macros::FromRef;
use minijinja::Environment;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, SessionManagerLayer,
};
use tracing_subscriber::prelude::*;

use config::Config;
pub use errors::{Error, Result};
use store::{RedisStore, Store};
use views::Views;

#[derive(FromRef, Clone)]
pub struct AppState {
    store: Store,
    views: Views,
    config: &'static Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    std::env::set_var("RUST_BACKTRACE", "1");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ephemeral_notes=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::config();

    let store: Store = Arc::new(RedisStore::connect(&config.redis_url).await?);

    let app = create_app(store, config);

    let listener = TcpListener::bind(&config.bind_addr).await.unwrap();

    tracing::info!("listening on http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();

    Ok(())
}

pub fn create_app(store: Store, config: &'static Config) -> Router {
    let session_layer = SessionManagerLayer::new(tower_sessions::MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    let mut env = Environment::new();
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Chainable);
    notes::add_templates(&mut env);
    let views = Views::new(env);

    let state = AppState { store, views, config };

    Router::new()
        .merge(notes::router(state))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

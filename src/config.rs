use std::sync::OnceLock;

use serde::Deserialize;

/// Allowed TTL choices, in seconds. Anything else falls back to the default.
pub const TTL_CHOICES: [u64; 3] = [300, 900, 3600];

pub const MAX_CONTENT_CHARS: usize = 20_000;

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base of generated share URLs, e.g. "https://notes.example.com".
    #[serde(default = "default_external_host")]
    pub external_host: String,

    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,

    #[serde(default = "default_password_min_len")]
    pub password_min_len: usize,

    #[serde(default)]
    pub view_limit_enabled: bool,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".into()
}

fn default_bind_addr() -> String {
    "127.0.0.1:4000".into()
}

fn default_external_host() -> String {
    "http://localhost:4000".into()
}

fn default_ttl_seconds() -> u64 {
    900
}

fn default_password_min_len() -> usize {
    6
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Self>().unwrap();

        config
    }

    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            redis_url: default_redis_url(),
            bind_addr: default_bind_addr(),
            external_host: default_external_host(),
            default_ttl_seconds: default_ttl_seconds(),
            password_min_len: default_password_min_len(),
            view_limit_enabled: false,
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[cfg(test)]
pub fn config_override<F>(config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| config(Config::from_env()))
}

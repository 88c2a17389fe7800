use std::fmt;
use std::str::FromStr;

/// Origins allowed by default: the local dev frontend and the two hosted
/// frontends.
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,\
https://data-collection-ruby.vercel.app,\
https://data-collection-v4gr.onrender.com";

/// Default maximum request body size (50 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Listener, CORS and limit settings for the API server.
///
/// `DATABASE_URL` is read separately at startup since only `main` needs it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Exact origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Grace period for closing the database pool after shutdown starts.
    pub shutdown_timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Read every setting from the environment, falling back to defaults.
    ///
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `HOST`                  | `0.0.0.0`                 |
    /// | `PORT`                  | `8000`                    |
    /// | `CORS_ORIGINS`          | [`DEFAULT_CORS_ORIGINS`]  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                      |
    /// | `MAX_BODY_BYTES`        | `52428800` (50 MiB)       |
    ///
    /// # Panics
    ///
    /// When a numeric variable is set but does not parse.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| parse_origins(DEFAULT_CORS_ORIGINS));

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 8000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            max_body_bytes: env_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }
}

/// Parse `key` from the environment, or return `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origins_cover_dev_and_hosted_frontends() {
        let origins = parse_origins(DEFAULT_CORS_ORIGINS);
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173",
                "https://data-collection-ruby.vercel.app",
                "https://data-collection-v4gr.onrender.com",
            ]
        );
    }

    #[test]
    fn blanks_and_trailing_slashes_are_dropped() {
        assert_eq!(
            parse_origins(" https://a.example/ , ,http://b.example"),
            vec!["https://a.example", "http://b.example"]
        );
    }
}

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

/// Which backend holds the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    File { path: PathBuf },
    Redis { url: String, prefix: String },
    Sqlite { path: PathBuf },
    Memory,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = var_or("TALLY_HOST", "0.0.0.0");
        let port = var_or("TALLY_PORT", "3000")
            .parse()
            .context("TALLY_PORT must be a port number")?;
        let store = parse_backend(&var_or("TALLY_STORE", "file"), |key, default| {
            var_or(key, default)
        })?;
        let static_dir = env::var("TALLY_STATIC_DIR").ok().map(PathBuf::from);

        Ok(Self {
            host,
            port,
            store,
            static_dir,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

/// Resolve the backend name plus its own settings. `lookup` returns the
/// value for a key or the given default.
fn parse_backend<F>(name: &str, lookup: F) -> Result<StoreBackend>
where
    F: Fn(&str, &str) -> String,
{
    let backend = match name.trim().to_ascii_lowercase().as_str() {
        "file" | "json" => StoreBackend::File {
            path: lookup("TALLY_DATA_FILE", "data/leaderboard.json").into(),
        },
        "redis" => StoreBackend::Redis {
            url: lookup("TALLY_REDIS_URL", "redis://127.0.0.1:6379"),
            prefix: lookup("TALLY_REDIS_PREFIX", ""),
        },
        "sqlite" => StoreBackend::Sqlite {
            path: lookup("TALLY_SQLITE_PATH", "tally.db").into(),
        },
        "memory" => StoreBackend::Memory,
        other => bail!("unknown TALLY_STORE '{other}' (expected file, redis, sqlite or memory)"),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(_key: &str, default: &str) -> String {
        default.to_string()
    }

    #[test]
    fn backend_defaults() {
        assert_eq!(
            parse_backend("file", defaults).unwrap(),
            StoreBackend::File {
                path: "data/leaderboard.json".into()
            }
        );
        assert_eq!(
            parse_backend(" Redis ", defaults).unwrap(),
            StoreBackend::Redis {
                url: "redis://127.0.0.1:6379".into(),
                prefix: String::new()
            }
        );
        assert_eq!(parse_backend("memory", defaults).unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn backend_settings_are_looked_up() {
        let lookup = |key: &str, default: &str| match key {
            "TALLY_SQLITE_PATH" => "/var/lib/tally/tally.db".to_string(),
            _ => default.to_string(),
        };
        assert_eq!(
            parse_backend("sqlite", lookup).unwrap(),
            StoreBackend::Sqlite {
                path: "/var/lib/tally/tally.db".into()
            }
        );
    }

    #[test]
    fn unknown_backend_is_an_error() {
        assert!(parse_backend("postgres", defaults).is_err());
    }
}

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Process-wide configuration, read once at startup.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub game: GameConfig,
}

/// Where and how the HTTP server listens.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface to bind, e.g. "127.0.0.1"
    pub host: String,

    /// TCP port to listen on
    pub port: u16,

    /// Worker threads handling requests
    pub workers: usize,
}

/// Game configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameConfig {
    /// Side length of the square board
    pub board_size: usize,
}

/// Reads an environment variable and parses it, falling back to `default`
/// when the variable is absent.
fn parsed_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("{name} does not hold a usable value"))
}

impl AppConfig {
    /// Reads the configuration from the environment. The defaults describe
    /// a local development server with a standard 3x3 board.
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_var("SERVER_PORT", "8081")?,
            workers: parsed_var("SERVER_WORKERS", "4")?,
        };

        let board_size: usize = parsed_var("BOARD_SIZE", "3")?;
        if board_size == 0 {
            bail!("BOARD_SIZE must be at least 1");
        }

        Ok(Self {
            server,
            game: GameConfig { board_size },
        })
    }
}

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::RESET_STEP;
use crate::view::ActiveColor;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_GRID_SIZE: usize = 10;
pub const MAX_GRID_SIZE: usize = 100;

/// Settings for the `website` binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    pub grid_size: usize,
    /// Snapshot file for the cell table; in-memory only when unset.
    pub data_file: Option<PathBuf>,
    pub active_color: ActiveColor,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: DEFAULT_ADDR.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            data_file: None,
            active_color: ActiveColor::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `GRID_ADDR`, `GRID_SIZE`, `GRID_DATA_FILE` and `GRID_COLOR`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();
        ServerConfig {
            addr: lookup("GRID_ADDR").unwrap_or(defaults.addr),
            grid_size: grid_size(parse_or("GRID_SIZE", lookup("GRID_SIZE"), defaults.grid_size)),
            data_file: lookup("GRID_DATA_FILE")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            active_color: parse_or("GRID_COLOR", lookup("GRID_COLOR"), defaults.active_color),
        }
    }

    /// Applies positional arguments `[grid_size] [data_file]` (after the program name).
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(size) = args.get(1) {
            self.grid_size = grid_size(parse_or("grid_size", Some(size.clone()), self.grid_size));
        }
        if let Some(path) = args.get(2) {
            self.data_file = Some(PathBuf::from(path));
        }
        self
    }
}

/// Settings for the terminal client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub grid_size: usize,
    pub reset_step: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_URL.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            reset_step: RESET_STEP,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `GRID_URL`, `GRID_SIZE` and `GRID_RESET_STEP_MS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ClientConfig::default();
        let step_ms = parse_or(
            "GRID_RESET_STEP_MS",
            lookup("GRID_RESET_STEP_MS"),
            defaults.reset_step.as_millis() as u64,
        );
        ClientConfig {
            base_url: lookup("GRID_URL").unwrap_or(defaults.base_url),
            grid_size: grid_size(parse_or("GRID_SIZE", lookup("GRID_SIZE"), defaults.grid_size)),
            reset_step: Duration::from_millis(step_ms),
        }
    }

    /// Applies the positional argument `[url]`.
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(url) = args.get(1) {
            self.base_url = url.clone();
        }
        self
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}", name, raw);
            default
        }),
    }
}

fn grid_size(size: usize) -> usize {
    size.clamp(1, MAX_GRID_SIZE)
}

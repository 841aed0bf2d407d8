use std::env;
use std::path::PathBuf;

/// Decimal places used when reports leave the service.
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    pub display_decimals: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 7070,
            database_path: PathBuf::from("data/rentwise.db"),
            migrations_path: PathBuf::from("migrations"),
            display_decimals: DEFAULT_DISPLAY_DECIMALS,
        }
    }
}

impl Config {
    /// Reads `RENTWISE_*` variables, loading a `.env` file first if present.
    /// Unset or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("RENTWISE_HOST").unwrap_or(defaults.host),
            port: lookup("RENTWISE_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: lookup("RENTWISE_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or(defaults.database_path),
            migrations_path: lookup("RENTWISE_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.migrations_path),
            display_decimals: lookup("RENTWISE_DISPLAY_DECIMALS")
                .and_then(|v| v.parse().ok())
                .filter(|dp| *dp <= 10)
                .unwrap_or(defaults.display_decimals),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

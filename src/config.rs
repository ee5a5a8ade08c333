use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reward: RewardConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Days before an issued claim expires.
    #[serde(default = "default_claim_expiry_days")]
    pub claim_expiry_days: i64,
    /// Daily pool size for prizes without a per-day cap.
    #[serde(default = "default_daily_allocation")]
    pub default_daily_allocation: i32,
    /// Privacy retention for fingerprints (roughly 3 months).
    #[serde(default = "default_fingerprint_retention_days")]
    pub fingerprint_retention_days: i64,
    /// Internal retries of draw + claim issuance on an allocation conflict.
    #[serde(default = "default_draw_max_attempts")]
    pub draw_max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Seconds between advisory cleanup sweeps.
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,
}

fn default_claim_expiry_days() -> i64 {
    7
}
fn default_daily_allocation() -> i32 {
    100
}
fn default_fingerprint_retention_days() -> i64 {
    90
}
fn default_draw_max_attempts() -> u32 {
    3
}
fn default_cleanup_interval_secs() -> u64 {
    3600
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            claim_expiry_days: default_claim_expiry_days(),
            default_daily_allocation: default_daily_allocation(),
            fingerprint_retention_days: default_fingerprint_retention_days(),
            draw_max_attempts: default_draw_max_attempts(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No file: build from environment variables and defaults.
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = env::var("DATABASE_URL")
                    .map_err(|_| "DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    reward: RewardConfig::default(),
                    cleanup: CleanupConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment overrides apply even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("REWARD_CLAIM_EXPIRY_DAYS")
            && let Ok(n) = v.parse()
        {
            config.reward.claim_expiry_days = n;
        }
        if let Ok(v) = env::var("REWARD_DEFAULT_DAILY_ALLOCATION")
            && let Ok(n) = v.parse()
        {
            config.reward.default_daily_allocation = n;
        }
        if let Ok(v) = env::var("REWARD_FINGERPRINT_RETENTION_DAYS")
            && let Ok(n) = v.parse()
        {
            config.reward.fingerprint_retention_days = n;
        }
        if let Ok(v) = env::var("REWARD_DRAW_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            config.reward.draw_max_attempts = n;
        }
        if let Ok(v) = env::var("CLEANUP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            config.cleanup.interval_secs = n;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_defaults() {
        let reward = RewardConfig::default();
        assert_eq!(reward.claim_expiry_days, 7);
        assert_eq!(reward.default_daily_allocation, 100);
        assert_eq!(reward.fingerprint_retention_days, 90);
        assert_eq!(reward.draw_max_attempts, 3);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [database]
            url = "postgres://localhost/tablespin"
            max_connections = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.reward.claim_expiry_days, 7);
        assert_eq!(cfg.cleanup.interval_secs, 3600);
    }
}

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::similarity::CompareOptions;

const DEFAULT_DB_PATH: &str = "./simcheck.db";
const DEFAULT_CONCURRENCY: usize = 8;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. The
/// scoring constants (shingle size, weights) are deliberately not here.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Maximum pairwise comparisons in flight per check
    pub concurrency: usize,
    /// Upper bound on one corpus comparison; `None` waits for every peer
    pub deadline: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a Config from any key lookup. `load` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let concurrency = match lookup("SIMCHECK_CONCURRENCY") {
            Some(raw) => {
                let value: usize = raw
                    .trim()
                    .parse()
                    .with_context(|| {
                        format!("SIMCHECK_CONCURRENCY must be a number, got {raw:?}")
                    })?;
                if value == 0 {
                    anyhow::bail!("SIMCHECK_CONCURRENCY must be at least 1");
                }
                value
            }
            None => DEFAULT_CONCURRENCY,
        };

        let deadline = match lookup("SIMCHECK_DEADLINE_MS") {
            Some(raw) if !raw.trim().is_empty() => {
                let ms: u64 = raw.trim().parse().with_context(|| {
                    format!("SIMCHECK_DEADLINE_MS must be a number of milliseconds, got {raw:?}")
                })?;
                Some(Duration::from_millis(ms))
            }
            _ => None,
        };

        Ok(Self {
            db_path: lookup("SIMCHECK_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            concurrency,
            deadline,
        })
    }

    /// Worker-pool settings for corpus comparisons.
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            concurrency: self.concurrency,
            deadline: self.deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db_path, "./simcheck.db");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.deadline, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SIMCHECK_DB_PATH", "/tmp/x.db"),
            ("SIMCHECK_CONCURRENCY", "3"),
            ("SIMCHECK_DEADLINE_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.compare_options().concurrency, 3);
        assert_eq!(config.deadline, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("SIMCHECK_CONCURRENCY", "0")]).is_err());
        assert!(load(&[("SIMCHECK_CONCURRENCY", "many")]).is_err());
        assert!(load(&[("SIMCHECK_DEADLINE_MS", "soon")]).is_err());
    }

    #[test]
    fn test_blank_deadline_means_none() {
        let config = load(&[("SIMCHECK_DEADLINE_MS", "  ")]).unwrap();
        assert_eq!(config.deadline, None);
    }
}

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use stance_engine::EngineConfig;

/// Worker settings read from `STANCE_*` environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub db_path: PathBuf,
    pub reconcile_interval_secs: u64,
    pub engine: EngineConfig,
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Unset variables
    /// fall back to defaults; set but unparseable ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = EngineConfig::default();

        let db_path: PathBuf = lookup("STANCE_DB_PATH")
            .unwrap_or_else(|| "stance.db".into())
            .into();
        let reconcile_interval_secs = parse_or(&lookup, "STANCE_RECONCILE_INTERVAL_SECS", 3600)?;
        if reconcile_interval_secs == 0 {
            anyhow::bail!("STANCE_RECONCILE_INTERVAL_SECS must be greater than zero");
        }

        let engine = EngineConfig {
            compatibility_threshold: parse_or(
                &lookup,
                "STANCE_COMPATIBILITY_THRESHOLD",
                defaults.compatibility_threshold,
            )?,
            compatibility_limit: parse_or(
                &lookup,
                "STANCE_COMPATIBILITY_LIMIT",
                defaults.compatibility_limit,
            )?,
            ..defaults
        };

        Ok(Self {
            db_path,
            reconcile_interval_secs,
            engine,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classification: ClassificationConfig,
    pub chunking: ChunkingConfig,
    pub retry: RetryConfig,
    pub paths: PathsConfig,
}

/// Parameters handed through to the external classifier unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Reference database selector
    pub database: u32,
    /// Search mode selector
    pub mode: u32,
    /// Identity thresholds, most specific rank first
    pub thresholds: Vec<u32>,
    /// Worker count for the classifier's own parallelism
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum records per chunk
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Fixed pause between attempts
    pub retry_interval_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Run directory; defaults to `<input dir>/boldigger3_data`
    pub work_dir: Option<PathBuf>,
    /// Classifier binary; looked up on PATH when unset
    pub boldigger: Option<PathBuf>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            database: 1,
            mode: 3,
            thresholds: vec![97, 95, 90, 85],
            workers: 5,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000 }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_interval_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl ClassificationConfig {
    /// Shell-style rendering of the identify call for `chunk`.
    pub fn command_line(&self, chunk: &str) -> String {
        let thresholds = self
            .thresholds
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "boldigger3 identify {} --db {} --mode {} --thresholds {} --workers {}",
            chunk, self.database, self.mode, thresholds, self.workers
        )
    }
}

impl Config {
    /// Check the invariants every run depends on.
    pub fn validate(&self) -> Result<(), crate::BoldChunkError> {
        if self.chunking.chunk_size == 0 {
            return Err(crate::BoldChunkError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.retry.retry_interval_secs == 0 {
            return Err(crate::BoldChunkError::Config(
                "retry_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.classification.workers == 0 {
            return Err(crate::BoldChunkError::Config(
                "workers must be greater than zero".to_string(),
            ));
        }
        if self.classification.thresholds.is_empty() {
            return Err(crate::BoldChunkError::Config(
                "at least one identity threshold is required".to_string(),
            ));
        }
        Ok(())
    }

    /// The `Params:` line written to the run log and read back by the snapshot.
    pub fn params_line(&self) -> String {
        let thresholds = self
            .classification
            .thresholds
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "Params: DB={} MODE={} THRESHOLDS=[{}] CHUNK_SIZE={} WORKERS={} MAX_RETRIES={} RETRY_INTERVAL={}s",
            self.classification.database,
            self.classification.mode,
            thresholds,
            self.chunking.chunk_size,
            self.classification.workers,
            self.retry.max_retries,
            self.retry.retry_interval_secs,
        )
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::BoldChunkError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::BoldChunkError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::BoldChunkError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::BoldChunkError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

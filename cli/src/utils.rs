use crate::error::CliError;
use clap::Args;
use std::path::PathBuf;
use tarry_core::QueueConfig;

/// Capacity used when neither a flag nor a config file sets one.
pub const DEFAULT_CAPACITY: usize = 2;

#[derive(Args, Debug, Clone, Default)]
pub struct QueueOptions {
    /// JSON file with queue settings; the flags below override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of stored elements
    #[arg(long, global = true)]
    pub capacity: Option<usize>,

    /// How long each push/pop waits before it is dropped
    #[arg(long, global = true)]
    pub wait_bound_ms: Option<u64>,

    /// Worker threads per lane
    #[arg(long, global = true)]
    pub workers: Option<usize>,
}

impl QueueOptions {
    pub fn resolve(&self, default_capacity: usize) -> Result<QueueConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => QueueConfig::from_file(path)?,
            None => QueueConfig::new(default_capacity),
        };

        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(wait_bound_ms) = self.wait_bound_ms {
            config.wait_bound_ms = wait_bound_ms;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tarry_core::QueueError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_defaults() {
        let config = QueueOptions::default().resolve(DEFAULT_CAPACITY).unwrap();
        assert_eq!(config, QueueConfig::new(DEFAULT_CAPACITY));
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"capacity": 8, "wait_bound_ms": 250, "workers": 3}}"#).unwrap();

        let options = QueueOptions {
            config: Some(file.path().to_path_buf()),
            capacity: Some(4),
            ..Default::default()
        };
        let config = options.resolve(DEFAULT_CAPACITY).unwrap();
        assert_eq!(config.capacity, 4);
        assert_eq!(config.wait_bound_ms, 250);
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_zero_capacity_flag_rejected() {
        let options = QueueOptions {
            capacity: Some(0),
            ..Default::default()
        };
        let result = options.resolve(DEFAULT_CAPACITY);
        assert!(matches!(
            result,
            Err(CliError::Queue(QueueError::InvalidCapacity(0)))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let options = QueueOptions {
            config: Some(PathBuf::from("/nonexistent/tarry.json")),
            ..Default::default()
        };
        let result = options.resolve(DEFAULT_CAPACITY);
        assert!(matches!(result, Err(CliError::Queue(QueueError::Io(_)))));
    }
}

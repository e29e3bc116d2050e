pub mod init;
mod schema;

pub use schema::{Config, DataSourceConfig, DataSourceMode};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::scoring::validate_scoring;

/// Get the config directory path (~/.config/realty-risk/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("realty-risk"))
}

/// Get the default config file path (~/.config/realty-risk/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Parse and validate a config document.
pub fn parse_config(content: &str, origin: &Path) -> Result<Config> {
    let config: Config = serde_saphyr::from_str(content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", origin.display()))?;

    if let Err(errors) = validate_scoring(&config.scoring) {
        anyhow::bail!(
            "Invalid scoring config in {}:\n  - {}",
            origin.display(),
            errors.join("\n  - ")
        );
    }
    Ok(config)
}

/// Load configuration from a YAML file
///
/// An explicit `path` must exist. Without one the default location is tried,
/// and built-in defaults are used when nothing is there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly named config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
/// - The scoring tables fail validation (every problem is listed)
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    debug!(path = %config_path.display(), "loaded config");
    parse_config(&config_content, &config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("nope.yaml")));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "data_source:\n  seed: 42\nscoring:\n  esoteric:\n    vastu_baseline: 55\n"
        )
        .unwrap();
        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.data_source.seed, 42);
        assert_eq!(config.data_source.mode, DataSourceMode::Synthetic);
        assert_eq!(config.scoring.esoteric.vastu_baseline, 55.0);
        assert_eq!(config.scoring.crime, crate::scoring::CrimeConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = parse_config("data_source:\n  sede: 1\n", Path::new("inline"));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_weights_list_every_error() {
        let yaml = "scoring:\n  composite:\n    emf: 0.9\n    crime: 0.9\n  emf:\n    external_weight: 2\n";
        let err = parse_config(yaml, Path::new("inline")).unwrap_err().to_string();
        assert!(err.contains("scoring.composite"), "{}", err);
        assert!(err.contains("scoring.emf"), "{}", err);
    }

    #[test]
    fn test_live_mode_parses() {
        let config = parse_config("data_source:\n  mode: live\n", Path::new("inline")).unwrap();
        assert_eq!(config.data_source.mode, DataSourceMode::Live);
    }
}

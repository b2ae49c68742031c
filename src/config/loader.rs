//! Configuration and virtual key loading from disk.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML config file.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantic validation failed.
    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    /// The virtual key file contained no usable keys.
    #[error("virtual key file {0} contains no keys")]
    EmptyKeyFile(String),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the virtual key allow-list from a newline-separated file.
///
/// Entries are trimmed of surrounding whitespace; blank and whitespace-only
/// lines are ignored. Duplicates collapse into one membership entry.
pub fn load_virtual_keys(path: &Path) -> Result<HashSet<String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let keys: HashSet<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(ConfigError::EmptyKeyFile(path.display().to_string()));
    }

    tracing::info!(
        path = %path.display(),
        count = keys.len(),
        "Virtual keys loaded"
    );

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    // Minimal temp-file guard so these tests need no extra dev-dependency.
    struct TempFile(PathBuf);

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn write_temp(content: &str) -> TempFile {
        let mut path = std::env::temp_dir();
        path.push(format!("keygate-loader-{}.txt", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        TempFile(path)
    }

    #[test]
    fn keys_are_trimmed_and_blank_lines_ignored() {
        let file = write_temp("  tok1\n\n tok2 \n");
        let keys = load_virtual_keys(&file.0).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("tok1"));
        assert!(keys.contains("tok2"));
    }

    #[test]
    fn duplicate_keys_collapse() {
        let file = write_temp("tok\ntok\n tok \n");
        let keys = load_virtual_keys(&file.0).unwrap();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn whitespace_only_file_is_an_error() {
        let file = write_temp("   \n\t\n");
        assert!(matches!(
            load_virtual_keys(&file.0),
            Err(ConfigError::EmptyKeyFile(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_virtual_keys(Path::new("/nonexistent/keys.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn config_file_round_trip() {
        let file = write_temp(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [admission]
            access_count_limit = 50
            "#,
        );
        let config = load_config(&file.0).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.admission.access_count_limit, Some(50));
        // Untouched sections keep their defaults.
        assert_eq!(config.upstream.host, "api.openai.com");
    }
}

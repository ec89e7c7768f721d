//! CLI configuration management
//!
//! Handles loading and saving CLI-specific configuration.

use anyhow::{Context, Result};
use oblio_core::credential::mask;
use oblio_core::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Oblio API origin
    pub base_url: String,

    /// API client identifier (account e-mail)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_id: String,

    /// API client secret
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_secret: String,

    /// Fiscal code of the issuing company
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,

    /// Default output format
    pub output_format: String,

    /// Enable verbose logging by default
    pub verbose: bool,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            cif: String::new(),
            output_format: "table".to_string(),
            verbose: false,
            timeout: 30,
        }
    }
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &mask(&self.client_secret))
            .field("cif", &self.cif)
            .field("output_format", &self.output_format)
            .field("verbose", &self.verbose)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from the default file or create it
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config and save it
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CLI config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse CLI config file {}", path.display()))
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize CLI config")?;

        std::fs::write(path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config)
        } else if let Some(dir) = dirs::config_dir() {
            dir
        } else {
            return Err(anyhow::anyhow!("Cannot determine config directory"));
        };

        Ok(config_dir.join("oblio").join("cli.toml"))
    }

    /// Whether both API credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables (including a `.env` file)
/// 4. CLI arguments
///
/// Later layers are applied first and earlier layers only fill gaps, so call
/// the `with_*` setters for CLI arguments before `with_env_overrides` and
/// `with_config_file`, or in any order as long as each field is set once.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    cif: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    timeout: Option<u64>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL (with validation)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Set company fiscal code
    pub fn with_cif(mut self, cif: impl Into<String>) -> Self {
        self.cif = Some(cif.into());
        self
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set timeout (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Fill unset values from a config file
    ///
    /// With `path` set, the file must exist and parse. Without it, the default
    /// file is used and any problem loading it is ignored.
    pub fn with_config_file(self, load_file: bool, path: Option<&Path>) -> Result<Self> {
        if !load_file {
            return Ok(self);
        }

        let config = match path {
            Some(path) => CliConfig::load_from(path)?,
            None => match CliConfig::load() {
                Ok(config) => config,
                // If file doesn't exist or can't be loaded, continue with current builder
                Err(_) => return Ok(self),
            },
        };

        Ok(self.fill_from(config))
    }

    /// Only use file values if they weren't already set (preserving priority)
    fn fill_from(self, config: CliConfig) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        Self {
            base_url: self.base_url.or(Some(config.base_url)),
            client_id: self.client_id.or_else(|| non_empty(config.client_id)),
            client_secret: self.client_secret.or_else(|| non_empty(config.client_secret)),
            cif: self.cif.or_else(|| non_empty(config.cif)),
            output_format: self.output_format.or(Some(config.output_format)),
            verbose: self.verbose.or(Some(config.verbose)),
            timeout: self.timeout.or(Some(config.timeout)),
        }
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        // Only apply env vars if values weren't already set (preserving priority)
        if self.base_url.is_none() {
            if let Some(url) = var("OBLIO_BASE_URL") {
                // Validate before applying
                if Self::validate_url(&url).is_ok() {
                    self.base_url = Some(url);
                }
            }
        }

        if self.client_id.is_none() {
            self.client_id = var("OBLIO_CLIENT_ID");
        }

        if self.client_secret.is_none() {
            self.client_secret = var("OBLIO_CLIENT_SECRET");
        }

        if self.cif.is_none() {
            self.cif = var("OBLIO_CIF");
        }

        if self.output_format.is_none() {
            if let Some(format) = var("OBLIO_FORMAT") {
                if Self::validate_output_format(&format).is_ok() {
                    self.output_format = Some(format);
                }
            }
        }

        if self.verbose.is_none() {
            if let Some(verbose) = var("OBLIO_VERBOSE") {
                self.verbose = Some(verbose.to_lowercase() == "true" || verbose == "1");
            }
        }

        if self.timeout.is_none() {
            if let Some(timeout) = var("OBLIO_TIMEOUT") {
                if let Ok(timeout) = timeout.parse() {
                    if Self::validate_timeout(timeout).is_ok() {
                        self.timeout = Some(timeout);
                    }
                }
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let base_url = self.base_url.unwrap_or(defaults.base_url);
        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        // Validate final values
        Self::validate_url(&base_url)?;
        Self::validate_output_format(&output_format)?;
        Self::validate_timeout(timeout)?;

        Ok(CliConfig {
            base_url,
            client_id: self.client_id.unwrap_or_default(),
            client_secret: self.client_secret.unwrap_or_default(),
            cif: self.cif.unwrap_or_default(),
            output_format,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout,
        })
    }

    /// Validate URL format
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("Base URL cannot be empty"));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Base URL must start with http:// or https://"
            ));
        }

        Ok(())
    }

    /// Validate output format
    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                format
            )),
        }
    }

    /// Validate timeout value
    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > 300 {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to 300 seconds"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: [&str; 7] = [
        "OBLIO_BASE_URL",
        "OBLIO_CLIENT_ID",
        "OBLIO_CLIENT_SECRET",
        "OBLIO_CIF",
        "OBLIO_FORMAT",
        "OBLIO_VERBOSE",
        "OBLIO_TIMEOUT",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.base_url, "https://www.oblio.eu");
        assert_eq!(config.output_format, "table");
        assert!(!config.verbose);
        assert_eq!(config.timeout, 30);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_config_serialization_skips_empty_secrets() {
        let config = CliConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(!toml_str.contains("client_secret"));

        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let parsed: CliConfig = toml::from_str("cif = \"RO37311090\"\n").unwrap();
        assert_eq!(parsed.cif, "RO37311090");
        assert_eq!(parsed.base_url, "https://www.oblio.eu");
        assert_eq!(parsed.timeout, 30);
    }

    #[test]
    fn test_debug_masks_secret() {
        let config = CliConfig {
            client_secret: "0123456789abcdef".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("0123456789abcdef"));
        assert!(debug.contains("0123****"));
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cli.toml");

        let config = CliConfig {
            client_id: "me@example.com".to_string(),
            client_secret: "secret".to_string(),
            cif: "RO37311090".to_string(),
            output_format: "json".to_string(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "timeout = \"soon\"").unwrap();

        let err = CliConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    // ConfigBuilder tests

    #[test]
    #[serial]
    fn test_builder_with_defaults() {
        clear_env();
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_builder_with_custom_values() {
        let config = ConfigBuilder::new()
            .with_base_url("http://localhost:8080")
            .unwrap()
            .with_cif("RO1")
            .with_output_format("json")
            .unwrap()
            .with_verbose(true)
            .with_timeout(60)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(!config.has_credentials());
        assert_eq!(config.cif, "RO1");
        assert_eq!(config.output_format, "json");
        assert!(config.verbose);
        assert_eq!(config.timeout, 60);
    }

    #[test]
    fn test_builder_url_validation() {
        assert!(ConfigBuilder::new().with_base_url("").is_err());
        assert!(ConfigBuilder::new().with_base_url("ftp://oblio.eu").is_err());
        assert!(ConfigBuilder::new().with_base_url("http://localhost:3000").is_ok());
        assert!(ConfigBuilder::new().with_base_url("https://www.oblio.eu").is_ok());
    }

    #[test]
    fn test_builder_format_validation() {
        assert!(ConfigBuilder::new().with_output_format("xml").is_err());
        assert!(ConfigBuilder::new().with_output_format("table").is_ok());
        assert!(ConfigBuilder::new().with_output_format("json").is_ok());
    }

    #[test]
    fn test_builder_timeout_validation() {
        assert!(ConfigBuilder::new().with_timeout(0).is_err());
        assert!(ConfigBuilder::new().with_timeout(301).is_err());
        assert!(ConfigBuilder::new().with_timeout(1).is_ok());
        assert!(ConfigBuilder::new().with_timeout(300).is_ok());
    }

    #[test]
    #[serial]
    fn test_builder_with_env_overrides() {
        clear_env();
        std::env::set_var("OBLIO_BASE_URL", "http://env.example.com:9000");
        std::env::set_var("OBLIO_CLIENT_ID", "env@example.com");
        std::env::set_var("OBLIO_CLIENT_SECRET", "env-secret");
        std::env::set_var("OBLIO_CIF", "RO999");
        std::env::set_var("OBLIO_FORMAT", "json");
        std::env::set_var("OBLIO_VERBOSE", "1");
        std::env::set_var("OBLIO_TIMEOUT", "25");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config.base_url, "http://env.example.com:9000");
        assert_eq!(config.client_id, "env@example.com");
        assert_eq!(config.client_secret, "env-secret");
        assert_eq!(config.cif, "RO999");
        assert_eq!(config.output_format, "json");
        assert!(config.verbose);
        assert_eq!(config.timeout, 25);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_builder_priority_chain() {
        clear_env();
        std::env::set_var("OBLIO_CLIENT_ID", "env@example.com");
        std::env::set_var("OBLIO_TIMEOUT", "25");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(
            &path,
            "client_id = \"file@example.com\"\nclient_secret = \"file-secret\"\ntimeout = 40\n",
        )
        .unwrap();

        // CLI args, then env, then file
        let config = ConfigBuilder::new()
            .with_cif("RO-CLI")
            .with_env_overrides()
            .with_config_file(true, Some(&path))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.cif, "RO-CLI");
        assert_eq!(config.client_id, "env@example.com");
        assert_eq!(config.timeout, 25);
        assert_eq!(config.client_secret, "file-secret");

        clear_env();
    }

    #[test]
    fn test_builder_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(ConfigBuilder::new()
            .with_config_file(true, Some(&missing))
            .is_err());

        // Skipped entirely when loading is disabled
        assert!(ConfigBuilder::new()
            .with_config_file(false, Some(&missing))
            .is_ok());
    }

    #[test]
    #[serial]
    fn test_builder_invalid_env_values_ignored() {
        clear_env();
        std::env::set_var("OBLIO_TIMEOUT", "invalid");
        std::env::set_var("OBLIO_FORMAT", "xml");
        std::env::set_var("OBLIO_BASE_URL", "oblio.eu");

        let config = ConfigBuilder::new().with_env_overrides().build().unwrap();

        assert_eq!(config.timeout, 30);
        assert_eq!(config.output_format, "table");
        assert_eq!(config.base_url, "https://www.oblio.eu");

        clear_env();
    }
}

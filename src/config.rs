//! Configuration system for arco-persona
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (ARCO_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::content::{AssemblyLimits, VariantRegistry, DEFAULT_ARTICLE_LIMIT, DEFAULT_PRODUCT_LIMIT};
use crate::error::{Error, Result};
use crate::persona::Quiz;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Persona cookie storage
    pub storage: StorageSettings,

    /// Content data sources and assembly limits
    pub content: ContentSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Persona cookie storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Cookie jar used by the CLI
    pub jar_path: String,
}

/// Content settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Homepage product recommendations to show
    pub product_limit: usize,

    /// Homepage articles to show
    pub article_limit: usize,

    /// Variant tables TOML (bundled tables if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants_file: Option<String>,

    /// Quiz TOML (bundled quiz if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_file: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            jar_path: "~/.arco/cookies.json".to_string(),
        }
    }
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            product_limit: DEFAULT_PRODUCT_LIMIT,
            article_limit: DEFAULT_ARTICLE_LIMIT,
            variants_file: None,
            quiz_file: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl SiteConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            PathBuf::from("arco-persona.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("arco").join("persona.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".arco").join("persona.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Storage settings
        if let Ok(val) = std::env::var("ARCO_JAR_PATH") {
            self.storage.jar_path = val;
        }

        // Content settings
        if let Ok(val) = std::env::var("ARCO_PRODUCT_LIMIT") {
            if let Ok(n) = val.parse() {
                self.content.product_limit = n;
            }
        }
        if let Ok(val) = std::env::var("ARCO_ARTICLE_LIMIT") {
            if let Ok(n) = val.parse() {
                self.content.article_limit = n;
            }
        }
        if let Ok(val) = std::env::var("ARCO_VARIANTS_FILE") {
            self.content.variants_file = Some(val);
        }
        if let Ok(val) = std::env::var("ARCO_QUIZ_FILE") {
            self.content.quiz_file = Some(val);
        }

        // Logging settings
        if let Ok(val) = std::env::var("ARCO_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("ARCO_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("ARCO_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.storage.jar_path = expand_path(&self.storage.jar_path);

        if let Some(ref file) = self.content.variants_file {
            self.content.variants_file = Some(expand_path(file));
        }
        if let Some(ref file) = self.content.quiz_file {
            self.content.quiz_file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.jar_path.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "storage.jar_path",
                "Cookie jar path cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Cookie jar path
    pub fn jar_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.jar_path)
    }

    /// Homepage list limits
    pub fn assembly_limits(&self) -> AssemblyLimits {
        AssemblyLimits {
            products: self.content.product_limit,
            articles: self.content.article_limit,
        }
    }

    /// Variant tables from `variants_file`, or the bundled ones
    pub fn load_registry(&self) -> Result<VariantRegistry> {
        match self.content.variants_file {
            Some(ref file) => VariantRegistry::from_file(Path::new(file)),
            None => VariantRegistry::bundled(),
        }
    }

    /// Quiz from `quiz_file`, or the bundled one
    pub fn load_quiz(&self) -> Result<Quiz> {
        match self.content.quiz_file {
            Some(ref file) => Quiz::from_file(Path::new(file)),
            None => Quiz::bundled(),
        }
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".arco")
                .join("persona.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# arco-persona configuration

[storage]
# Cookie jar holding the persisted persona (CLI only)
jar_path = "~/.arco/cookies.json"

[content]
# Homepage product recommendations to show
product_limit = 4

# Homepage articles to show
article_limit = 3

# Custom variant tables (bundled tables if unset)
# variants_file = "~/.arco/variants.toml"

# Custom quiz (bundled quiz if unset)
# quiz_file = "~/.arco/quiz.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.arco/logs/persona.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

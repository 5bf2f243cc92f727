use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Organization owning the content
    pub org: String,

    /// Site within the organization
    pub site: String,

    /// Translation service name (selects the connector)
    #[serde(default)]
    pub service: Option<String>,

    /// Workflow options
    #[serde(default)]
    pub options: Options,

    /// Content store selection
    #[serde(default)]
    pub store: StoreConfig,

    /// Path to the DNT rules file (`translate.json`)
    #[serde(default)]
    pub translate_config: Option<String>,

    /// Flat site settings (`translate.conflict.behavior`, ...) applied over
    /// `options` when the configuration is loaded
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub settings: HashMap<String, String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Policy for reconciling existing destination content with new content
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    // @behavior: Keep both and let an editor resolve
    #[default]
    Merge,
    // @behavior: Replace destination content
    Overwrite,
}

// Implement FromStr trait for ConflictBehavior
impl std::str::FromStr for ConflictBehavior {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err(anyhow!("Invalid conflict behavior: {}", s)),
        }
    }
}

impl std::fmt::Display for ConflictBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// The language the project's source content is authored in
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourceLanguage {
    #[serde(default = "default_source_code")]
    pub code: String,
    #[serde(default)]
    pub name: String,
    /// Tree prefix of the source content
    #[serde(default = "default_source_location")]
    pub location: String,
}

impl Default for SourceLanguage {
    fn default() -> Self {
        Self {
            code: default_source_code(),
            name: String::new(),
            location: default_source_location(),
        }
    }
}

/// Workflow options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Options {
    /// Conflict behavior when saving translations
    #[serde(default)]
    pub translate_conflict_behavior: ConflictBehavior,

    /// Conflict behavior when copying source content
    #[serde(default)]
    pub copy_conflict_behavior: ConflictBehavior,

    /// Source language
    #[serde(default)]
    pub source_language: SourceLanguage,

    /// Width of every bounded queue
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            translate_conflict_behavior: ConflictBehavior::default(),
            copy_conflict_behavior: ConflictBehavior::default(),
            source_language: SourceLanguage::default(),
            concurrency: default_concurrency(),
        }
    }
}

impl Options {
    /// Overlay the flat key/value sheet used by site settings
    ///
    /// Recognized keys: `translate.conflict.behavior`,
    /// `copy.conflict.behavior`, `source.language` (a location such as
    /// `/langstore/en`), `source.language.code`. Other keys are ignored.
    pub fn apply_map(&mut self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(value) = map.get("translate.conflict.behavior") {
            self.translate_conflict_behavior = value.parse()?;
        }
        if let Some(value) = map.get("copy.conflict.behavior") {
            self.copy_conflict_behavior = value.parse()?;
        }
        if let Some(location) = map.get("source.language") {
            self.source_language.location = location.clone();
        }
        if let Some(code) = map.get("source.language.code") {
            self.source_language.code = code.clone();
        }
        Ok(())
    }

    /// Tree prefix of the source language
    pub fn source_location(&self) -> &str {
        &self.source_language.location
    }
}

/// Where project content is read from and written to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// A local directory mirroring `/{org}/{site}/...`
    Fs {
        root: String,
    },
    /// A remote content origin
    Http {
        #[serde(default = "default_origin")]
        origin: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Fs { root: "content".to_string() }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert into the `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_code() -> String {
    "en".to_string()
}

fn default_source_location() -> String {
    "/".to_string()
}

fn default_concurrency() -> usize {
    50
}

fn default_origin() -> String {
    crate::store::http::DEFAULT_ORIGIN.to_string()
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .options
            .apply_map(&config.settings)
            .with_context(|| format!("Invalid settings in config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.org.trim().is_empty() {
            return Err(anyhow!("Organization is required"));
        }
        if self.site.trim().is_empty() {
            return Err(anyhow!("Site is required"));
        }
        if self.options.concurrency == 0 {
            return Err(anyhow!("Concurrency must be at least 1"));
        }
        if !self.options.source_language.location.starts_with('/') {
            return Err(anyhow!(
                "Source language location must start with '/': {}",
                self.options.source_language.location
            ));
        }

        if let StoreConfig::Http { origin, .. } = &self.store {
            url::Url::parse(origin)
                .with_context(|| format!("Invalid content origin: {}", origin))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            org: "my-org".to_string(),
            site: "my-site".to_string(),
            service: None,
            options: Options::default(),
            store: StoreConfig::default(),
            translate_config: None,
            settings: HashMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

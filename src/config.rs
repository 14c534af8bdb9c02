use crate::cli::{Cli, OutputFormat, VerbosityLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const APP_NAME: &str = "xml-pkg-qa";
const ENV_PREFIX: &str = "XML_PKG_QA_";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub package: PackageConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
    /// Debug output
    pub debug: bool,
}

/// Package input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackageConfig {
    /// Extensions that mark a single input file as an archive
    pub archive_extensions: Vec<String>,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportsConfig {
    /// Remove an article's previous reports before validating it
    pub clean_before_validation: bool,
    /// Directory for control files
    pub work_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `xml_pkg_qa=debug`
    pub filter: Option<String>,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
            debug: false,
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            archive_extensions: vec!["zip".to_string()],
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            clean_before_validation: true,
            work_dir: None,
        }
    }
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.output.quiet, self.output.verbose, self.output.debug)
    }

    /// Filter directive for the log subscriber when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> String {
        self.logging
            .filter
            .clone()
            .unwrap_or_else(|| self.verbosity().log_filter().to_string())
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path).await?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides(config)?;

        // CLI arguments have the highest precedence
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    fn config_file_names() -> [String; 4] {
        [
            format!("{APP_NAME}.toml"),
            format!("{APP_NAME}.json"),
            format!(".{APP_NAME}.toml"),
            format!(".{APP_NAME}.json"),
        ]
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let names = Self::config_file_names();

        let mut search_dirs = vec![PathBuf::from(".")];
        if let Some(config_dir) = dirs::config_dir() {
            search_dirs.push(config_dir.join(APP_NAME));
        }

        for dir in &search_dirs {
            if let Some(config) = Self::find_config_in(dir, &names).await? {
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    async fn find_config_in(dir: &Path, names: &[String]) -> Result<Option<Config>> {
        for name in names {
            let path = dir.join(name);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::debug!(path = %path.display(), "loading configuration file");
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }
        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        let var = |name: &str| env.get(&format!("{ENV_PREFIX}{name}"));
        let parse_bool = |name: &str, value: String| {
            value.parse::<bool>().map_err(|_| {
                ConfigError::Environment(format!("Invalid {ENV_PREFIX}{name} value: {value}"))
            })
        };

        // Output settings
        if let Some(format) = var("FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid {ENV_PREFIX}FORMAT value: {format}"
                    )));
                }
            };
        }
        if let Some(verbose) = var("VERBOSE") {
            config.output.verbose = parse_bool("VERBOSE", verbose)?;
        }
        if let Some(quiet) = var("QUIET") {
            config.output.quiet = parse_bool("QUIET", quiet)?;
        }

        // Package settings
        if let Some(extensions) = var("ARCHIVE_EXTENSIONS") {
            config.package.archive_extensions = extensions
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Report settings
        if let Some(clean) = var("CLEAN_REPORTS") {
            config.reports.clean_before_validation = parse_bool("CLEAN_REPORTS", clean)?;
        }

        // Logging settings
        if let Some(filter) = var("LOG") {
            config.logging.filter = Some(filter);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence).
    ///
    /// Flags only override when given on the command line.
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        // Output settings
        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
            config.output.debug = false;
        }
        if cli.debug {
            config.output.debug = true;
            config.output.quiet = false;
        }

        // Report settings
        if cli.no_clean {
            config.reports.clean_before_validation = false;
        }
        if let Some(work_dir) = &cli.work_dir {
            config.reports.work_dir = Some(work_dir.clone());
        }

        config
    }

    /// Merge two configurations (second takes precedence for non-None values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        // Output settings
        base.output = override_config.output;

        // Package settings
        if !override_config.package.archive_extensions.is_empty() {
            base.package.archive_extensions = override_config.package.archive_extensions;
        }

        // Report settings
        base.reports.clean_before_validation = override_config.reports.clean_before_validation;
        if override_config.reports.work_dir.is_some() {
            base.reports.work_dir = override_config.reports.work_dir;
        }

        // Logging settings
        if override_config.logging.filter.is_some() {
            base.logging.filter = override_config.logging.filter;
        }

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }
        if config.output.debug && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both debug and quiet modes".to_string(),
            ));
        }

        if config.package.archive_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "At least one archive extension must be specified".to_string(),
            ));
        }
        for ext in &config.package.archive_extensions {
            if ext.contains('/') || ext.contains('\\') || ext.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "Invalid archive extension: {ext}"
                )));
            }
        }

        if let Some(filter) = &config.logging.filter
            && filter.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "Logging filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

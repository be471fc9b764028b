pub mod cli;
pub mod toml_config;

use crate::core::template::Bindings;
use crate::core::ConfigProvider;
use crate::domain::model::{JavaAttributes, DEFAULT_JAVA_VERSION};
use crate::utils::error::{Result, SetupError};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_TEMPLATE_URL: &str = "https://raw.githubusercontent.com/travis-ci/travis-cookbooks/f6cedf1930952a120e14666eaf78d8e29b08ee08/ci_environment/java/templates/ubuntu/jdk_switcher.sh.erb";
pub const DEFAULT_TEMPLATE_CACHE: &str = "jdk_switcher.sh.erb";
pub const OUTPUT_FILE_NAME: &str = ".jdk_switcher_rc";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "jdk-switcher-setup")]
#[command(about = "Render the jdk_switcher template into ~/.jdk_switcher_rc")]
pub struct CliConfig {
    /// URL of the jdk_switcher.sh.erb template
    #[arg(long)]
    pub template_url: Option<String>,

    /// Render a local template instead of downloading one
    #[arg(long)]
    pub template_file: Option<String>,

    /// Value for node.java.default_version [default: oraclejdk7]
    #[arg(long)]
    pub default_version: Option<String>,

    /// Output file [default: $HOME/.jdk_switcher_rc]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Keep a copy of the downloaded template
    #[arg(long)]
    pub keep_template: bool,

    /// Where --keep-template saves the template [default: jdk_switcher.sh.erb]
    #[arg(long)]
    pub template_cache: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print the rendered script instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// 額外的模板變數，只能由設定檔提供
    #[arg(skip)]
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl CliConfig {
    /// 套用設定檔內容，命令列參數優先
    pub fn merge_file(&mut self, file: TomlConfig) {
        let TomlConfig {
            source,
            java,
            variables,
            output,
        } = file;

        self.template_url = self.template_url.take().or(source.url);
        self.template_file = self.template_file.take().or(source.file);
        self.template_cache = self.template_cache.take().or(source.cache_path);
        self.timeout = self.timeout.or(source.timeout_seconds);
        self.keep_template |= source.keep_template.unwrap_or(false);
        self.default_version = self.default_version.take().or(java.default_version);
        self.output = self.output.take().or(output.path);

        for (name, value) in variables {
            self.variables.entry(name).or_insert(value);
        }
    }

    pub fn load_config_file(&mut self) -> Result<()> {
        if let Some(path) = self.config.clone() {
            tracing::info!("📁 Loading configuration from: {}", path);
            let file = TomlConfig::from_file(&path)?;
            file.validate()?;
            self.merge_file(file);
        }
        Ok(())
    }
}

/// `<HOME>/.jdk_switcher_rc` unless an explicit path is given.
pub fn resolve_output_path(explicit: Option<&str>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(PathBuf::from(path));
    }

    match home {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(OUTPUT_FILE_NAME)),
        _ => Err(SetupError::MissingConfigError {
            field: "HOME".to_string(),
        }),
    }
}

impl ConfigProvider for CliConfig {
    fn template_url(&self) -> &str {
        self.template_url.as_deref().unwrap_or(DEFAULT_TEMPLATE_URL)
    }

    fn template_file(&self) -> Option<&str> {
        self.template_file.as_deref()
    }

    fn template_cache(&self) -> Option<&str> {
        if self.keep_template {
            Some(self.template_cache.as_deref().unwrap_or(DEFAULT_TEMPLATE_CACHE))
        } else {
            None
        }
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    fn java(&self) -> JavaAttributes {
        JavaAttributes::new(
            self.default_version
                .as_deref()
                .unwrap_or(DEFAULT_JAVA_VERSION),
        )
    }

    fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    fn output_path(&self) -> Result<PathBuf> {
        resolve_output_path(self.output.as_deref(), std::env::var_os("HOME"))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.template_file {
            Some(file) => validation::validate_path("template_file", file)?,
            None => validation::validate_url("template_url", self.template_url())?,
        }

        if let Some(version) = &self.default_version {
            validation::validate_non_empty_string("default_version", version)?;
        }

        if let Some(output) = &self.output {
            validation::validate_path("output", output)?;
        }
        // HOME 未設定時在下載前就失敗
        self.output_path()?;

        if let Some(cache) = self.template_cache() {
            validation::validate_path("template_cache", cache)?;
        }

        if let Some(timeout) = self.timeout {
            validation::validate_positive_number("timeout", timeout, 1)?;
        }

        let mut bindings = Bindings::new();
        for (name, value) in &self.variables {
            bindings.insert(name, value.as_str())?;
        }

        Ok(())
    }
}

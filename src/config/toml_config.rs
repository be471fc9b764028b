use crate::core::template::Bindings;
use crate::utils::error::{Result, SetupError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub java: JavaConfig,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub file: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub keep_template: Option<bool>,
    pub cache_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JavaConfig {
    pub default_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| SetupError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${HOME})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| SetupError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = &self.source.url {
            validation::validate_url("source.url", url)?;
        }
        if let Some(file) = &self.source.file {
            validation::validate_path("source.file", file)?;
        }
        if let Some(cache) = &self.source.cache_path {
            validation::validate_path("source.cache_path", cache)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }
        if let Some(version) = &self.java.default_version {
            validation::validate_non_empty_string("java.default_version", version)?;
        }
        if let Some(path) = &self.output.path {
            validation::validate_path("output.path", path)?;
        }

        let mut bindings = Bindings::new();
        for (name, value) in &self.variables {
            bindings
                .insert(name, value.as_str())
                .map_err(|e| SetupError::InvalidConfigValueError {
                    field: "variables".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 預設 JDK 版本 (對應 `node.java.default_version`)
pub const DEFAULT_JAVA_VERSION: &str = "oraclejdk7";

/// Stand-in for the configuration node a cookbook template is rendered against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaAttributes {
    pub default_version: String,
}

impl JavaAttributes {
    pub fn new(default_version: impl Into<String>) -> Self {
        Self {
            default_version: default_version.into(),
        }
    }
}

impl Default for JavaAttributes {
    fn default() -> Self {
        Self::new(DEFAULT_JAVA_VERSION)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateSource {
    /// URL 或本地檔案路徑
    pub origin: String,
    pub content: String,
}

impl TemplateSource {
    pub fn new(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScript {
    pub origin: String,
    pub content: String,
    pub substitutions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub template_origin: String,
    pub output_path: PathBuf,
    /// `--keep-template` 保存的模板位置
    pub template_copy: Option<PathBuf>,
    pub bytes_written: usize,
    pub substitutions: usize,
    pub completed_at: DateTime<Utc>,
}

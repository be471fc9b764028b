use crate::domain::model::{JavaAttributes, RenderedScript, TemplateSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Replaces any existing file at `path`.
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn template_url(&self) -> &str;
    /// 設定時略過網路下載，直接讀取本地模板
    fn template_file(&self) -> Option<&str>;
    /// 下載後保存模板的位置 (相當於 `curl -O`)
    fn template_cache(&self) -> Option<&str>;
    fn request_timeout(&self) -> Option<Duration>;
    fn java(&self) -> JavaAttributes;
    fn variables(&self) -> &HashMap<String, String>;
    fn output_path(&self) -> Result<PathBuf>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<TemplateSource>;
    async fn render(&self, source: &TemplateSource) -> Result<RenderedScript>;
    async fn persist(&self, script: &RenderedScript) -> Result<PathBuf>;
    /// 保存下載的模板副本，未啟用時回傳 `None`
    async fn keep_template(&self, source: &TemplateSource) -> Result<Option<PathBuf>>;
}

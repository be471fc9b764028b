use crate::core::template::{self, Bindings, TemplateError};
use crate::core::{ConfigProvider, Pipeline, RenderedScript, Storage, TemplateSource};
use crate::utils::error::{Result, SetupError};
use reqwest::Client;
use std::path::{Path, PathBuf};

pub struct SwitcherPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> SwitcherPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn bindings(&self) -> Result<Bindings> {
        let mut bindings = Bindings::for_java(&self.config.java());
        for (name, value) in self.config.variables() {
            bindings.insert(name, value.as_str())?;
        }
        Ok(bindings)
    }

    async fn download(&self, url: &str) -> Result<String> {
        tracing::debug!("Requesting template: {}", url);
        let mut request = self.client.get(url);

        if let Some(timeout) = self.config.request_timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Template response status: {}", status);

        // 非 2xx 直接失敗，不可繼續渲染舊的或空的模板
        if !status.is_success() {
            return Err(SetupError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        String::from_utf8(body.to_vec()).map_err(|_| TemplateError::InvalidEncoding.into())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SwitcherPipeline<S, C> {
    async fn fetch(&self) -> Result<TemplateSource> {
        if let Some(file) = self.config.template_file() {
            tracing::info!("📄 Using local template: {}", file);
            let bytes = self.storage.read_file(Path::new(file)).await?;
            let content = String::from_utf8(bytes).map_err(|_| TemplateError::InvalidEncoding)?;
            return Ok(TemplateSource::new(file, content));
        }

        let url = self.config.template_url();
        let content = self.download(url).await?;
        Ok(TemplateSource::new(url, content))
    }

    async fn render(&self, source: &TemplateSource) -> Result<RenderedScript> {
        let bindings = self.bindings()?;
        tracing::debug!("Rendering {} with {} bindings", source.origin, bindings.len());

        let rendered = template::render(&source.content, &bindings)?;
        if rendered.substitutions == 0 {
            tracing::warn!("Template {} contains no placeholders", source.origin);
        }

        Ok(RenderedScript {
            origin: source.origin.clone(),
            content: rendered.content,
            substitutions: rendered.substitutions,
        })
    }

    async fn persist(&self, script: &RenderedScript) -> Result<PathBuf> {
        let output_path = self.config.output_path()?;
        self.storage
            .write_file(&output_path, script.content.as_bytes())
            .await?;
        Ok(output_path)
    }

    async fn keep_template(&self, source: &TemplateSource) -> Result<Option<PathBuf>> {
        // 本地模板不需要再複製一份
        if self.config.template_file().is_some() {
            return Ok(None);
        }
        let Some(cache) = self.config.template_cache() else {
            return Ok(None);
        };

        let cache_path = PathBuf::from(cache);
        self.storage
            .write_file(&cache_path, source.content.as_bytes())
            .await?;
        tracing::info!("💾 Template saved to: {}", cache);
        Ok(Some(cache_path))
    }
}

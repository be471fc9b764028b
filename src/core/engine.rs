use crate::core::{Pipeline, RenderedScript, RunReport, TemplateSource};
use crate::utils::error::Result;

/// Runs fetch, render and persist strictly in order. A failing step stops the
/// run, so the output file is only touched after a successful render.
pub struct ProvisionEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ProvisionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting jdk_switcher setup");

        let (source, script) = self.fetch_and_render().await?;

        tracing::info!("💾 Writing switcher script...");
        let output_path = self.pipeline.persist(&script).await?;
        tracing::info!("📁 Output saved to: {}", output_path.display());

        let template_copy = self.pipeline.keep_template(&source).await?;

        Ok(RunReport {
            template_origin: script.origin,
            output_path,
            template_copy,
            bytes_written: script.content.len(),
            substitutions: script.substitutions,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Fetch and render only; nothing is written.
    pub async fn preview(&self) -> Result<RenderedScript> {
        let (_, script) = self.fetch_and_render().await?;
        Ok(script)
    }

    async fn fetch_and_render(&self) -> Result<(TemplateSource, RenderedScript)> {
        tracing::info!("📡 Fetching template...");
        let source = self.pipeline.fetch().await?;
        tracing::info!("Fetched {} bytes from {}", source.content.len(), source.origin);

        tracing::info!("🛠️ Rendering template...");
        let script = self.pipeline.render(&source).await?;
        tracing::info!("Substituted {} placeholder(s)", script.substitutions);

        Ok((source, script))
    }
}

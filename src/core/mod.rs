pub mod engine;
pub mod pipeline;
pub mod template;

pub use crate::domain::model::{JavaAttributes, RenderedScript, RunReport, TemplateSource};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

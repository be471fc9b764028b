pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig};
pub use self::core::{engine::ProvisionEngine, pipeline::SwitcherPipeline};
pub use domain::model::{JavaAttributes, RunReport, DEFAULT_JAVA_VERSION};
pub use utils::error::{Result, SetupError};

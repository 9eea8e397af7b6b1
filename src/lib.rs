pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::cli::LocalStorage;
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::{etl::ExplorerEngine, pipeline::SelectPipeline};
pub use crate::domain::model::{BirdRecord, RenderResult};
pub use crate::utils::error::{ExplorerError, Result};

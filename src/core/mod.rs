pub mod etl;
pub mod pipeline;
pub mod query;
pub mod render;

pub use crate::domain::model::{BirdRecord, RenderResult, SpeciesGroup, SqlResponse};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

pub mod changelog;
pub mod cleanse;
pub mod config;
pub mod delta;
pub mod domain;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod store;
pub mod validate;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{run, RunSummary};

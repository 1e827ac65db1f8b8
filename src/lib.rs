pub mod combine;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod grid;
pub mod logging;
pub mod normalize;
pub mod report;
pub mod utils;

pub use config::{PipelineArgs, PipelineConfig};
pub use error::PipelineError;
pub use grid::Grid;
pub use report::{FileStage, StageReport};

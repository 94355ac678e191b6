// imgmark: upload image post-processing
//
// Watermarks uploaded raster images and optionally transcodes them to WebP.

pub mod config;
pub mod error;
pub mod image_optimizer;
pub mod logging;
pub mod pipeline;
pub mod watermark;

pub use config::ProcessingConfig;
pub use error::{ConfigError, PipelineError};
pub use pipeline::{process_image, FileRecord, ImagePipeline};

// Image post-processing pipeline
//
// threshold check -> decode -> watermark -> WebP or in-place re-save

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::ProcessingConfig;
use crate::error::PipelineError;
use crate::image_optimizer::{convert_to_webp, decode_file, probe_file, save_in_format, RasterFormat};
use crate::watermark::{GlyphRenderer, WatermarkRenderer};

mod record;

pub use record::{file_name, public_url, FileRecord};

/// Post-processes uploaded images.
///
/// The pipeline itself holds no per-file state and can be shared between
/// threads; concurrent calls for the same path must be serialized by the
/// caller.
#[derive(Debug)]
pub struct ImagePipeline {
    watermark: WatermarkRenderer,
}

impl ImagePipeline {
    pub fn new(glyphs: GlyphRenderer) -> Self {
        Self {
            watermark: WatermarkRenderer::new(glyphs),
        }
    }

    /// Build a pipeline whose font comes from `config.font_path`.
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self {
            watermark: WatermarkRenderer::from_config(config),
        }
    }

    pub fn watermark_renderer(&self) -> &WatermarkRenderer {
        &self.watermark
    }

    /// Process one uploaded file.
    ///
    /// Returns `Ok(None)` when the file is not a supported raster image or
    /// is below the size thresholds; the file is untouched in that case.
    /// Otherwise returns `file_info` updated for whatever was written.
    ///
    /// # Errors
    ///
    /// Only a base image that cannot be probed or decoded is an error.
    pub fn process(
        &self,
        path: &Path,
        config: &ProcessingConfig,
        file_info: &FileRecord,
    ) -> Result<Option<FileRecord>, PipelineError> {
        if RasterFormat::from_path(path).is_none() {
            debug!(path = %path.display(), "Not a processable image extension");
            return Ok(None);
        }

        let config = config.normalized();

        let probe = probe_file(path).map_err(|e| PipelineError::decode(path, e.to_string()))?;
        if probe.width < config.min_width || probe.height < config.min_height {
            debug!(
                path = %path.display(),
                width = probe.width,
                height = probe.height,
                min_width = config.min_width,
                min_height = config.min_height,
                "Image below processing threshold"
            );
            return Ok(None);
        }

        let mut image = decode_file(path).map_err(|e| PipelineError::decode(path, e.to_string()))?;

        let watermarked = config.watermark_enable
            && self.watermark.apply(&mut image, &config).is_some();

        let mut record = file_info.clone();

        if config.webp_enable {
            match convert_to_webp(&image, path, config.webp_quality) {
                Ok((webp_path, size)) => {
                    record.url = public_url(&webp_path, config.document_root.as_deref());
                    record.title = file_name(&webp_path);
                    record.file_type = ".webp".to_string();
                    record.size = size;

                    if !config.webp_keep_original {
                        if let Err(e) = std::fs::remove_file(path) {
                            warn!(path = %path.display(), error = %e, "Failed to remove original after WebP conversion");
                        }
                    }

                    info!(
                        source = %path.display(),
                        output = %webp_path.display(),
                        size,
                        watermarked,
                        "Converted image to WebP"
                    );
                    return Ok(Some(record));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "WebP conversion failed, keeping original format");
                }
            }
        }

        if watermarked {
            match save_in_format(&image, path, probe.format) {
                Ok(size) => {
                    record.size = size;
                    info!(path = %path.display(), size, format = probe.format.as_str(), "Saved watermarked image");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to save watermarked image");
                }
            }
        }

        Ok(Some(record))
    }
}

/// Process `path` with a pipeline built from `config`.
///
/// Convenience for one-off calls; reuse an [`ImagePipeline`] when
/// processing many files so the font is loaded once.
pub fn process_image(
    path: &Path,
    config: &ProcessingConfig,
    file_info: &FileRecord,
) -> Result<Option<FileRecord>, PipelineError> {
    ImagePipeline::from_config(config).process(path, config, file_info)
}

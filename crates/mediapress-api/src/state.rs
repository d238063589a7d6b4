//! Application state shared across handlers.

use mediapress_core::Config;
use mediapress_processing::{VideoTranscoder, WebpConverter, WebpSettings};

pub struct AppState {
    pub config: Config,
    pub image: WebpConverter,
    pub video: VideoTranscoder,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, anyhow::Error> {
        let image = WebpConverter::new(WebpSettings {
            method: config.webp_method,
            preserve_metadata: config.preserve_metadata,
            auto_orient: config.auto_orient,
            max_dimension: config.max_image_dimension,
        });
        let video = VideoTranscoder::new(config.ffmpeg_path.clone())
            .map_err(|e| anyhow::anyhow!("invalid ffmpeg configuration: {}", e))?;

        Ok(Self {
            config,
            image,
            video,
        })
    }
}

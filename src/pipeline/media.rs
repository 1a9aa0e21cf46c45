//! Image and video lookup for a topic.
//!
//! Image search failures propagate like any other service error. Video
//! search failures are logged and turned into "no video".

use crate::clients::{ImageSearch, VideoSearch};
use crate::error::Error;
use crate::models::MediaRefs;
use tracing::{info, instrument, warn};

pub struct MediaResolver<'a, I, V> {
    images: &'a I,
    videos: &'a V,
}

impl<'a, I: ImageSearch, V: VideoSearch> MediaResolver<'a, I, V> {
    pub fn new(images: &'a I, videos: &'a V) -> Self {
        Self { images, videos }
    }

    /// Download the first image matching `topic`, if any.
    #[instrument(level = "info", skip(self))]
    pub async fn resolve_image(&self, topic: &str) -> Result<Option<Vec<u8>>, Error> {
        let urls = self.images.search(topic, 1).await?;
        let Some(url) = urls.into_iter().next() else {
            info!("No image found");
            return Ok(None);
        };
        let bytes = self.images.download(&url).await?;
        Ok(Some(bytes))
    }

    /// Id of the best matching video, if any.
    ///
    /// Never fails: a video service error is logged and yields `None`.
    #[instrument(level = "info", skip(self))]
    pub async fn resolve_video_id(&self, topic: &str) -> Option<String> {
        match self.videos.search_videos(topic, 1, "video").await {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                info!("No video found");
                None
            }
            Err(e) => {
                warn!(error = %e, "Video search failed; continuing without video");
                None
            }
        }
    }

    /// Resolve both media kinds for a topic.
    pub async fn resolve(&self, topic: &str) -> Result<MediaRefs, Error> {
        let image_bytes = self.resolve_image(topic).await?;
        let video_id = self.resolve_video_id(topic).await;
        Ok(MediaRefs {
            image_bytes,
            video_id,
        })
    }
}

//! Merge the generated parts and media into a publish-ready [`Article`].

use crate::models::{Article, ArticleImage, MediaRefs};

/// Embed markup for a YouTube video.
pub fn video_embed(video_id: &str) -> String {
    format!(
        r#"<iframe width="560" height="315" src="https://www.youtube.com/embed/{video_id}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#
    )
}

/// Upload filename for a topic's image: spaces become underscores.
///
/// ```ignore
/// assert_eq!(image_filename("AI Chips 2023"), "AI_Chips_2023.jpg");
/// ```
pub fn image_filename(topic: &str) -> String {
    format!("{}.jpg", topic.replace(' ', "_"))
}

/// Build the article. Performs no I/O.
pub fn assemble(
    topic: &str,
    body: String,
    media: MediaRefs,
    title: String,
    tags: Vec<String>,
    categories: Vec<String>,
) -> Article {
    let body = match &media.video_id {
        Some(id) => format!("{}\n\n{}", video_embed(id), body),
        None => body,
    };
    let image = media.image_bytes.map(|bytes| ArticleImage {
        filename: image_filename(topic),
        bytes,
    });

    Article {
        topic: topic.to_string(),
        title,
        body,
        tags,
        categories,
        image,
    }
}

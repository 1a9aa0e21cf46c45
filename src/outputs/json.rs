//! Dry-run output: assembled articles written to disk instead of published.
//!
//! # Output Structure
//!
//! ```text
//! dry_run_dir/
//! └── 2025-05-06/
//!     ├── ai-chips-2023.json
//!     └── AI_Chips_2023.jpg
//! ```

use crate::models::Article;
use crate::utils::slugify_title;
use chrono::Local;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Make an upload filename safe to use as a single path component.
fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Write an [`Article`] as JSON under today's date, with its image beside it.
///
/// The JSON file is named after the slugified topic. Returns the path of the
/// JSON file.
#[instrument(level = "info", skip_all, fields(dry_run_dir = %dry_run_dir.as_ref().display(), topic = %article.topic))]
pub async fn write_article(
    article: &Article,
    dry_run_dir: impl AsRef<Path>,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(article)?;

    let date_dir = dry_run_dir
        .as_ref()
        .join(Local::now().date_naive().to_string());
    if let Err(e) = fs::create_dir_all(&date_dir).await {
        error!(path = %date_dir.display(), error = %e, "Failed to create dry-run dir");
        return Err(e.into());
    }

    let mut slug = slugify_title(&article.topic);
    if slug.is_empty() {
        slug = "article".to_string();
    }
    let json_path = date_dir.join(format!("{slug}.json"));
    fs::write(&json_path, json).await?;
    info!(path = %json_path.display(), "Wrote article JSON");

    if let Some(image) = &article.image {
        let image_path = date_dir.join(sanitize_filename(&image.filename));
        fs::write(&image_path, &image.bytes).await?;
        info!(path = %image_path.display(), bytes = image.bytes.len(), "Wrote article image");
    }

    Ok(json_path)
}

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::ContentApiPort;
use crate::constants::{ALLOWED_IMAGE_EXTENSIONS, DEFAULT_MEDIA_TYPE};
use crate::error::{AdminError, Result, SubmissionError, ValidationError};
use crate::types::{MediaItem, MediaUpload};

static FILE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[^/.]+$").expect("extension pattern is valid"));

fn strip_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Key two media names are compared by: extension dropped, then all whitespace removed.
fn comparison_key(name: &str) -> String {
    strip_whitespace(&FILE_EXTENSION.replace(name, ""))
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "3gp" => "video/3gpp",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// A local file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
}

impl MediaFile {
    /// The content type is inferred from the extension.
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&extension_of(&file_name)).to_string();
        Self {
            file_name,
            content_type,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        )
    }

    pub fn extension(&self) -> String {
        extension_of(&self.file_name)
    }

    /// Name the backend stores: the file name with every whitespace character removed.
    pub fn media_name(&self) -> String {
        strip_whitespace(&self.file_name)
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Rejects an empty selection, a name already used by `existing`, and image formats
    /// other than PNG and JPEG.
    pub fn check(&self, existing: &[MediaItem]) -> std::result::Result<(), ValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::InvalidMedia("Please choose a file."));
        }
        let key = comparison_key(&self.file_name);
        if existing
            .iter()
            .any(|item| comparison_key(&item.media_name) == key)
        {
            return Err(ValidationError::InvalidMedia("This media file already exists"));
        }
        if self.is_image() && !ALLOWED_IMAGE_EXTENSIONS.contains(&self.extension().as_str()) {
            return Err(ValidationError::InvalidMedia("Only JPEG/PNG images allowed!"));
        }
        Ok(())
    }
}

fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Result of an upload the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaUploadOutcome {
    /// `202`: the backend queued the file; it shows up in the list later.
    Initiated,
    /// Any other success status.
    Unexpected { status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaDeletion {
    Deleted,
    /// A template still uses the media and deletion was not forced.
    InUse,
}

pub struct MediaUseCase {
    api: Arc<dyn ContentApiPort>,
}

impl MediaUseCase {
    pub fn new(api: Arc<dyn ContentApiPort>) -> Self {
        Self { api }
    }

    pub async fn list(&self, media_type: &str) -> Result<Vec<MediaItem>> {
        let media_type = media_type_or_default(media_type);
        let items = self.api.list_media(media_type).await?;
        info!(media_type = %media_type, count = items.len(), "Fetched media");
        Ok(items)
    }

    /// Checks the file against the media already listed for its type, then uploads it.
    pub async fn upload(
        &self,
        file: &MediaFile,
        bytes: Vec<u8>,
        media_type: &str,
        description: &str,
    ) -> Result<MediaUploadOutcome> {
        let media_type = media_type_or_default(media_type);
        let existing = self.api.list_media(media_type).await?;
        file.check(&existing)?;

        let upload = MediaUpload {
            media_name: file.media_name(),
            content_type: file.content_type.clone(),
            media_type: media_type.to_string(),
            description: description.to_string(),
            media_id: Utc::now().timestamp_millis(),
            bytes,
        };
        info!(
            media_name = %upload.media_name,
            media_type = %upload.media_type,
            size = upload.bytes.len(),
            "Uploading media"
        );

        match self.api.upload_media(&upload).await {
            Ok(202) => Ok(MediaUploadOutcome::Initiated),
            Ok(status) => {
                warn!(status, "Media upload answered without queueing the file");
                Ok(MediaUploadOutcome::Unexpected { status })
            }
            Err(SubmissionError::Status { status: 413, .. }) => {
                Err(AdminError::Submission(SubmissionError::TooLarge))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes `item` unless a template still uses it; `force` deletes regardless.
    pub async fn delete(&self, item: &MediaItem, force: bool) -> Result<MediaDeletion> {
        if self.api.media_in_use(&item.media_name).await? && !force {
            info!(media_name = %item.media_name, "Media is used by a template");
            return Ok(MediaDeletion::InUse);
        }
        self.api.delete_media(&item.media_url).await?;
        info!(media_url = %item.media_url, "Deleted media");
        Ok(MediaDeletion::Deleted)
    }
}

fn media_type_or_default(media_type: &str) -> &str {
    let media_type = media_type.trim();
    if media_type.is_empty() {
        DEFAULT_MEDIA_TYPE
    } else {
        media_type
    }
}

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SubmissionError;
use crate::types::{
    Location, MediaItem, MediaUpload, MessageTemplate, NumberAdditionPayload, SubmissionPayload,
    TemplatePayload, UnmatchedGroup,
};

/// The group backend, as seen by the use cases.
///
/// Every call is a single request with no retry. Non-success statuses surface as
/// [`SubmissionError::Status`].
#[async_trait]
pub trait GroupApiPort: Send + Sync {
    /// Match uploaded school codes against synced groups.
    async fn find_groups(&self, payload: &SubmissionPayload) -> Result<Value, SubmissionError>;

    /// Ask the backend to resync every group from the messaging provider.
    async fn sync_groups(&self) -> Result<Value, SubmissionError>;

    /// Number of groups known for a district/block.
    async fn group_count(&self, location: &Location) -> Result<u64, SubmissionError>;

    async fn add_number(&self, payload: &NumberAdditionPayload) -> Result<Value, SubmissionError>;

    async fn addition_status(&self, location: &Location) -> Result<Value, SubmissionError>;

    async fn unmatched_groups(&self) -> Result<Vec<UnmatchedGroup>, SubmissionError>;
}

/// Message templates and the media they reference. Same request rules as [`GroupApiPort`].
#[async_trait]
pub trait ContentApiPort: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<MessageTemplate>, SubmissionError>;

    async fn create_template(&self, payload: &TemplatePayload) -> Result<Value, SubmissionError>;

    async fn update_template(&self, payload: &TemplatePayload) -> Result<Value, SubmissionError>;

    async fn delete_template(&self, stored_id: &str) -> Result<Value, SubmissionError>;

    /// Media of one type (`image`, `video`, ...).
    async fn list_media(&self, media_type: &str) -> Result<Vec<MediaItem>, SubmissionError>;

    /// Returns the success status; the backend answers `202` once it has queued the file.
    async fn upload_media(&self, upload: &MediaUpload) -> Result<u16, SubmissionError>;

    /// Whether any template still references the named media.
    async fn media_in_use(&self, media_name: &str) -> Result<bool, SubmissionError>;

    async fn delete_media(&self, media_url: &str) -> Result<Value, SubmissionError>;
}

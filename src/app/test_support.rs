use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::ports::{ContentApiPort, GroupApiPort};
use crate::error::SubmissionError;
use crate::types::{
    Location, MediaItem, MediaUpload, MessageTemplate, NumberAdditionPayload, SubmissionPayload,
    TemplatePayload, UnmatchedGroup,
};

/// In-memory backend that records every call.
pub struct MockGroupApi {
    pub calls: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<SubmissionPayload>>,
    pub additions: Mutex<Vec<NumberAdditionPayload>>,
    pub fail_status: Option<u16>,
    pub count: u64,
    pub add_reply: Value,
    pub unmatched: Vec<UnmatchedGroup>,
}

impl MockGroupApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            additions: Mutex::new(Vec::new()),
            fail_status: None,
            count: 0,
            add_reply: json!({ "status": true }),
            unmatched: Vec::new(),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new()
        }
    }

    async fn record(&self, call: String) -> Result<(), SubmissionError> {
        self.calls.lock().await.push(call);
        match self.fail_status {
            Some(status) => Err(SubmissionError::Status {
                status,
                body: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GroupApiPort for MockGroupApi {
    async fn find_groups(&self, payload: &SubmissionPayload) -> Result<Value, SubmissionError> {
        self.record("find_groups".to_string()).await?;
        self.submissions.lock().await.push(payload.clone());
        Ok(json!({ "status": true }))
    }

    async fn sync_groups(&self) -> Result<Value, SubmissionError> {
        self.record("sync_groups".to_string()).await?;
        Ok(json!({ "message": "sync started" }))
    }

    async fn group_count(&self, location: &Location) -> Result<u64, SubmissionError> {
        self.record(format!("group_count/{}/{}", location.district, location.block))
            .await?;
        Ok(self.count)
    }

    async fn add_number(&self, payload: &NumberAdditionPayload) -> Result<Value, SubmissionError> {
        self.record("add_number".to_string()).await?;
        self.additions.lock().await.push(payload.clone());
        Ok(self.add_reply.clone())
    }

    async fn addition_status(&self, location: &Location) -> Result<Value, SubmissionError> {
        self.record(format!("addition_status/{}/{}", location.district, location.block))
            .await?;
        Ok(json!({ "pending": 0 }))
    }

    async fn unmatched_groups(&self) -> Result<Vec<UnmatchedGroup>, SubmissionError> {
        self.record("unmatched_groups".to_string()).await?;
        Ok(self.unmatched.clone())
    }
}

/// In-memory template and media backend that records every call.
pub struct MockContentApi {
    pub calls: Mutex<Vec<String>>,
    pub templates: Mutex<Vec<TemplatePayload>>,
    pub uploads: Mutex<Vec<MediaUpload>>,
    pub listed_templates: Vec<MessageTemplate>,
    pub media: Vec<MediaItem>,
    pub upload_status: u16,
    pub upload_fail_status: Option<u16>,
    pub in_use: bool,
}

impl MockContentApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            templates: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            listed_templates: Vec::new(),
            media: Vec::new(),
            upload_status: 202,
            upload_fail_status: None,
            in_use: false,
        }
    }
}

#[async_trait]
impl ContentApiPort for MockContentApi {
    async fn list_templates(&self) -> Result<Vec<MessageTemplate>, SubmissionError> {
        self.calls.lock().await.push("list_templates".to_string());
        Ok(self.listed_templates.clone())
    }

    async fn create_template(&self, payload: &TemplatePayload) -> Result<Value, SubmissionError> {
        self.calls.lock().await.push("create_template".to_string());
        self.templates.lock().await.push(payload.clone());
        Ok(json!({ "status": true }))
    }

    async fn update_template(&self, payload: &TemplatePayload) -> Result<Value, SubmissionError> {
        self.calls.lock().await.push("update_template".to_string());
        self.templates.lock().await.push(payload.clone());
        Ok(json!({ "status": true }))
    }

    async fn delete_template(&self, stored_id: &str) -> Result<Value, SubmissionError> {
        self.calls.lock().await.push(format!("delete_template/{stored_id}"));
        Ok(json!({ "status": true }))
    }

    async fn list_media(&self, media_type: &str) -> Result<Vec<MediaItem>, SubmissionError> {
        self.calls.lock().await.push(format!("list_media/{media_type}"));
        Ok(self.media.clone())
    }

    async fn upload_media(&self, upload: &MediaUpload) -> Result<u16, SubmissionError> {
        self.calls.lock().await.push("upload_media".to_string());
        if let Some(status) = self.upload_fail_status {
            return Err(SubmissionError::Status {
                status,
                body: "mock failure".to_string(),
            });
        }
        self.uploads.lock().await.push(upload.clone());
        Ok(self.upload_status)
    }

    async fn media_in_use(&self, media_name: &str) -> Result<bool, SubmissionError> {
        self.calls.lock().await.push(format!("media_in_use/{media_name}"));
        Ok(self.in_use)
    }

    async fn delete_media(&self, media_url: &str) -> Result<Value, SubmissionError> {
        self.calls.lock().await.push(format!("delete_media/{media_url}"));
        Ok(json!({ "status": true }))
    }
}

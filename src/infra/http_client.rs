use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::app::ports::{ContentApiPort, GroupApiPort};
use crate::config::{ApiConfig, ContentConfig};
use crate::constants::{
    ADDITION_STATUS_PATH, ADD_NUMBER_PATH, FIND_GROUPS_PATH, GROUP_COUNT_PATH,
    MEDIA_CONSUMER_TYPE, SYNC_GROUPS_PATH,
};
use crate::error::{AdminError, Result, SubmissionError};
use crate::types::{
    loose_text, Location, MediaItem, MediaUpload, MessageTemplate, NumberAdditionPayload,
    SubmissionPayload, TemplatePayload, UnmatchedGroup,
};

/// reqwest-backed client for the group backend and its template/media service.
pub struct ReqwestGroupApi {
    client: Client,
    base_url: Url,
    unmatched_groups_path: String,
    content: ContentConfig,
}

impl ReqwestGroupApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let raw = config.require_base_url()?;
        // A trailing slash keeps the last base segment when endpoints are appended.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| AdminError::Config(format!("Invalid base URL '{raw}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AdminError::Config(format!("Base URL '{raw}' cannot hold paths")));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            unmatched_groups_path: config.unmatched_groups_path.clone(),
            content: config.content.clone(),
        })
    }

    /// Appends path segments to the base URL, escaping each one.
    fn endpoint(&self, path: &str, params: &[&str]) -> std::result::Result<Url, SubmissionError> {
        self.build_url(path, &[], params)
    }

    /// Like `endpoint`, but a `{key}` segment of `path` is replaced by its value in `vars`.
    fn filled_endpoint(
        &self,
        path: &str,
        vars: &[(&str, &str)],
    ) -> std::result::Result<Url, SubmissionError> {
        self.build_url(path, vars, &[])
    }

    fn build_url(
        &self,
        path: &str,
        vars: &[(&str, &str)],
        params: &[&str],
    ) -> std::result::Result<Url, SubmissionError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SubmissionError::Endpoint(format!("{} cannot hold paths", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(
                path.split('/')
                    .filter(|s| !s.is_empty())
                    .map(|segment| fill_segment(segment, vars)),
            );
            segments.extend(params.iter().copied());
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> std::result::Result<Value, SubmissionError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;
        read_json(response).await
    }

    async fn post_json<T: serde::Serialize + Sync>(
        &self,
        url: Url,
        body: &T,
    ) -> std::result::Result<Value, SubmissionError> {
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;
        read_json(response).await
    }
}

fn fill_segment<'a>(segment: &'a str, vars: &[(&str, &'a str)]) -> &'a str {
    segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .and_then(|key| vars.iter().find(|(name, _)| *name == key))
        .map(|(_, value)| *value)
        .unwrap_or(segment)
}

/// Success bodies that are not JSON come back as a string value.
async fn read_json(response: Response) -> std::result::Result<Value, SubmissionError> {
    let status = response.status();
    let body = response.text().await.map_err(SubmissionError::Transport)?;
    if !status.is_success() {
        return Err(SubmissionError::Status {
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

/// Every array entry becomes a group; fields the backend typed oddly are kept as raw JSON.
fn parse_unmatched(value: Value) -> Vec<UnmatchedGroup> {
    match value {
        Value::Array(items) => items.into_iter().map(UnmatchedGroup::from).collect(),
        other => {
            warn!(kind = %json_kind(&other), "Unmatched groups response is not a list");
            Vec::new()
        }
    }
}

/// List endpoints answer with a bare array or wrap it as `data`/`resData`.
fn list_items(value: Value, what: &str) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match ["data", "resData"]
            .iter()
            .find_map(|key| match fields.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }) {
            Some(items) => items,
            None => {
                warn!(what, "List response has no data array");
                Vec::new()
            }
        },
        other => {
            warn!(what, kind = %json_kind(&other), "List response is not a list");
            Vec::new()
        }
    }
}

/// Reads a count that may arrive as an integer, an integral float or a numeric string.
/// Anything else counts as 0.
fn count_value(value: &Value) -> u64 {
    let float = match value {
        Value::Number(n) => match n.as_u64() {
            Some(count) => return count,
            None => n.as_f64(),
        },
        Value::String(s) => {
            let s = s.trim();
            if let Ok(count) = s.parse::<u64>() {
                return count;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    match float {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => f as u64,
        _ => 0,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl GroupApiPort for ReqwestGroupApi {
    async fn find_groups(&self, payload: &SubmissionPayload) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(FIND_GROUPS_PATH, &[])?;
        self.post_json(url, payload).await
    }

    async fn sync_groups(&self) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(SYNC_GROUPS_PATH, &[])?;
        self.get_json(url).await
    }

    async fn group_count(&self, location: &Location) -> std::result::Result<u64, SubmissionError> {
        let url = self.endpoint(GROUP_COUNT_PATH, &[&location.district, &location.block])?;
        let body = self.get_json(url).await?;
        Ok(body.get("count").map(count_value).unwrap_or(0))
    }

    async fn add_number(
        &self,
        payload: &NumberAdditionPayload,
    ) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(ADD_NUMBER_PATH, &[])?;
        self.post_json(url, payload).await
    }

    async fn addition_status(&self, location: &Location) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(ADDITION_STATUS_PATH, &[&location.district, &location.block])?;
        self.get_json(url).await
    }

    async fn unmatched_groups(&self) -> std::result::Result<Vec<UnmatchedGroup>, SubmissionError> {
        let url = self.endpoint(&self.unmatched_groups_path, &[])?;
        Ok(parse_unmatched(self.get_json(url).await?))
    }
}

#[async_trait]
impl ContentApiPort for ReqwestGroupApi {
    async fn list_templates(&self) -> std::result::Result<Vec<MessageTemplate>, SubmissionError> {
        let url = self.endpoint(&self.content.templates_path, &[])?;
        let items = list_items(self.get_json(url).await?, "templates");
        Ok(items.into_iter().map(MessageTemplate::from).collect())
    }

    async fn create_template(
        &self,
        payload: &TemplatePayload,
    ) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(&self.content.create_template_path, &[])?;
        self.post_json(url, payload).await
    }

    async fn update_template(
        &self,
        payload: &TemplatePayload,
    ) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(&self.content.update_template_path, &[])?;
        self.post_json(url, payload).await
    }

    async fn delete_template(&self, stored_id: &str) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(&self.content.delete_template_path, &[])?;
        self.post_json(url, &json!({ "_id": stored_id })).await
    }

    async fn list_media(&self, media_type: &str) -> std::result::Result<Vec<MediaItem>, SubmissionError> {
        let url = self.filled_endpoint(&self.content.media_list_path, &[("type", media_type)])?;
        let items = list_items(self.get_json(url).await?, "media");
        Ok(items.into_iter().map(MediaItem::from).collect())
    }

    async fn upload_media(&self, upload: &MediaUpload) -> std::result::Result<u16, SubmissionError> {
        let url = self.filled_endpoint(
            &self.content.media_upload_path,
            &[("type", upload.media_type.as_str())],
        )?;
        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.media_name.clone())
            .mime_str(&upload.content_type)
            .map_err(SubmissionError::Transport)?;
        let form = Form::new()
            .part("file", file)
            .text("mediaName", upload.media_name.clone())
            .text("mediaType", upload.media_type.clone())
            .text("mediaDescription", upload.description.clone())
            .text("mediaId", upload.media_id.to_string())
            .text("consumerType", MEDIA_CONSUMER_TYPE)
            .text("appType", self.content.app_type.clone());

        debug!(%url, "POST multipart");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(status.as_u16())
    }

    async fn media_in_use(&self, media_name: &str) -> std::result::Result<bool, SubmissionError> {
        let url = self.filled_endpoint(&self.content.media_usage_path, &[("name", media_name)])?;
        let reply = self.get_json(url).await?;
        Ok(loose_text(&reply).is_some())
    }

    async fn delete_media(&self, media_url: &str) -> std::result::Result<Value, SubmissionError> {
        let url = self.endpoint(&self.content.media_delete_path, &[])?;
        let body = json!({ "mediaUrl": media_url, "consumerType": MEDIA_CONSUMER_TYPE });
        self.post_json(url, &body).await
    }
}

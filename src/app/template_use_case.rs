use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::app::ports::ContentApiPort;
use crate::constants::MAX_MESSAGE_CHARS;
use crate::error::{Result, ValidationError};
use crate::pipeline::listing::filter_by_name;
use crate::types::{MessageTemplate, TemplateKind, TemplatePayload};

/// A template as typed into the form, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDraft {
    /// Stored `_id` when editing an existing template.
    pub stored_id: Option<String>,
    pub name: String,
    /// Free-form type label; anything other than `text` is a media template.
    pub kind: String,
    pub media_url: String,
    pub texts: Vec<String>,
}

impl TemplateDraft {
    /// Starts an edit from a listed template.
    pub fn from_template(template: &MessageTemplate) -> Self {
        Self {
            stored_id: template.stored_id(),
            name: template.display_name().into_owned(),
            kind: template.kind.to_string(),
            media_url: template.media_url.clone(),
            texts: if template.texts.is_empty() {
                vec![String::new()]
            } else {
                template.texts.clone()
            },
        }
    }

    /// Checks the draft and builds the request body. Newlines inside a message become spaces.
    pub fn validate(&self) -> std::result::Result<TemplatePayload, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidTemplate("Please enter name"));
        }

        let kind = TemplateKind::from_label(&self.kind);
        let media_url = self.media_url.trim();
        if kind == TemplateKind::Media && media_url.is_empty() {
            return Err(ValidationError::InvalidTemplate("Please select media"));
        }
        if kind == TemplateKind::Text && self.texts.concat().trim().is_empty() {
            return Err(ValidationError::InvalidTemplate(
                "Please enter at least one message",
            ));
        }
        if self
            .texts
            .iter()
            .any(|text| text.chars().count() > MAX_MESSAGE_CHARS)
        {
            return Err(ValidationError::InvalidTemplate(
                "A message can have at most 1000 characters",
            ));
        }

        Ok(TemplatePayload {
            stored_id: self.stored_id.clone().filter(|id| !id.trim().is_empty()),
            id: None,
            name: name.to_string(),
            kind,
            text: self.texts.iter().map(|text| text.replace('\n', " ")).collect(),
            mediaurl: media_url.to_string(),
        })
    }
}

pub struct TemplateUseCase {
    api: Arc<dyn ContentApiPort>,
}

impl TemplateUseCase {
    pub fn new(api: Arc<dyn ContentApiPort>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<MessageTemplate>> {
        let templates = self.api.list_templates().await?;
        info!(count = templates.len(), "Fetched message templates");
        Ok(templates)
    }

    /// Name search, then the first `shown` matches. Returns the visible slice and the
    /// number of matches so callers can offer to show more.
    pub fn visible<'a>(
        templates: &'a [MessageTemplate],
        query: &str,
        shown: usize,
    ) -> (Vec<&'a MessageTemplate>, usize) {
        let mut matches = filter_by_name(templates, query);
        let total = matches.len();
        matches.truncate(shown);
        (matches, total)
    }

    /// Creates the template, or updates it when the draft carries a stored id.
    pub async fn save(&self, draft: &TemplateDraft) -> Result<Value> {
        let mut payload = draft.validate()?;
        let reply = if payload.stored_id.is_some() {
            self.api.update_template(&payload).await?
        } else {
            payload.id = Some(Utc::now().timestamp_millis());
            self.api.create_template(&payload).await?
        };
        info!(
            name = %payload.name,
            kind = %payload.kind,
            updated = payload.stored_id.is_some(),
            "Saved message template"
        );
        Ok(reply)
    }

    pub async fn delete(&self, stored_id: &str) -> Result<Value> {
        let stored_id = stored_id.trim();
        if stored_id.is_empty() {
            return Err(ValidationError::InvalidTemplate("Template id is required").into());
        }
        let reply = self.api.delete_template(stored_id).await?;
        info!(id = %stored_id, "Deleted message template");
        Ok(reply)
    }
}

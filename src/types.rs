use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

use crate::constants::MISSING_NAME;

/// A single spreadsheet cell as decoded from an uploaded file.
///
/// Serializes untagged so codes reach the backend with the type the sheet gave them:
/// `101` stays a JSON number, `"0101"` stays a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Bool(bool),
    Text(String),
    Blank,
}

impl CellValue {
    /// Integral floats collapse to `Integer` so `101.0` from a workbook reads as `101`.
    pub fn from_float(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            CellValue::Integer(value as i64)
        } else {
            CellValue::Number(value)
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Blank => Ok(()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// One spreadsheet row: column name to cell value, in sheet column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedRow {
    cells: Vec<(String, CellValue)>,
}

impl UploadedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for UploadedRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A row reduced to its school identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub identifier_code: CellValue,
}

/// Identifier codes in original row order. Duplicates pass through.
pub type IdentifierList = Vec<CellValue>;

/// District and block pair that scopes every group operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub district: String,
    pub block: String,
}

impl Location {
    pub fn new(district: impl Into<String>, block: impl Into<String>) -> Self {
        Self {
            district: district.into(),
            block: block.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.district.trim().is_empty() && !self.block.trim().is_empty()
    }

    /// The form the backend expects: both names lowercased.
    pub fn lowercased(&self) -> Self {
        Self {
            district: self.district.to_lowercase(),
            block: self.block.to_lowercase(),
        }
    }
}

/// Body of the group lookup request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub district: String,
    pub block: String,
    #[serde(rename = "udisecodes")]
    pub identifier_codes: IdentifierList,
}

impl SubmissionPayload {
    /// Lowercases district and block. Codes are carried as given.
    pub fn new(location: &Location, identifier_codes: IdentifierList) -> Self {
        let location = location.lowercased();
        Self {
            district: location.district,
            block: location.block,
            identifier_codes,
        }
    }
}

/// Body of the add-number request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberAdditionPayload {
    pub district: String,
    pub block: String,
    pub number: u64,
}

/// Text of a loosely typed JSON field. Null, blank strings, `false` and `0` count as absent;
/// other non-strings are rendered as JSON.
pub fn loose_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// A group the backend could not match to any school.
///
/// Both fields are kept as raw JSON: the backend does not type them consistently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedGroup {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Value,
}

impl UnmatchedGroup {
    pub fn new(id: impl Into<Value>, name: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        loose_text(&self.name).unwrap_or(Cow::Borrowed(MISSING_NAME))
    }

    pub fn display_id(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Every list entry becomes a row. Objects give `id`/`name`; a bare value is taken as the id.
impl From<Value> for UnmatchedGroup {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => Self {
                id: fields.remove("id").unwrap_or(Value::Null),
                name: fields.remove("name").unwrap_or(Value::Null),
            },
            other => Self {
                id: other,
                name: Value::Null,
            },
        }
    }
}

/// How a message template is delivered: plain text messages, or a media header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Text,
    Media,
}

impl TemplateKind {
    /// `text` (any case) is a text template; every other label is a media template.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("text") {
            TemplateKind::Text
        } else {
            TemplateKind::Media
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Text => f.write_str("text"),
            TemplateKind::Media => f.write_str("media"),
        }
    }
}

/// Body of the create/update template requests.
///
/// A new template carries a client-generated millisecond `id`; an edit carries the
/// stored `_id` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePayload {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub stored_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    pub text: Vec<String>,
    pub mediaurl: String,
}

/// A message template as listed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    pub id: Value,
    pub name: Value,
    pub kind: TemplateKind,
    pub texts: Vec<String>,
    pub media_url: String,
}

impl MessageTemplate {
    pub fn display_name(&self) -> Cow<'_, str> {
        loose_text(&self.name).unwrap_or(Cow::Borrowed(MISSING_NAME))
    }

    /// The stored `_id` (or `id`) as used by update and delete.
    pub fn stored_id(&self) -> Option<String> {
        loose_text(&self.id).map(Cow::into_owned)
    }
}

impl From<Value> for MessageTemplate {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Self {
                    id: Value::Null,
                    name: other,
                    kind: TemplateKind::Text,
                    texts: Vec::new(),
                    media_url: String::new(),
                }
            }
        };
        let id = fields
            .remove("_id")
            .filter(|v| !v.is_null())
            .or_else(|| fields.remove("id"))
            .unwrap_or(Value::Null);
        let kind = fields
            .get("type")
            .and_then(Value::as_str)
            .map(TemplateKind::from_label)
            .unwrap_or(TemplateKind::Text);
        let texts = match fields.remove("text") {
            Some(Value::Array(items)) => items.iter().map(owned_text).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![owned_text(&other)],
        };
        Self {
            id,
            name: fields.remove("name").unwrap_or(Value::Null),
            kind,
            texts,
            media_url: fields.get("mediaurl").map(owned_text).unwrap_or_default(),
        }
    }
}

/// An uploaded media file as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub media_name: String,
    pub media_url: String,
    pub media_type: String,
    pub description: String,
}

impl From<Value> for MediaItem {
    fn from(value: Value) -> Self {
        let field = |key: &str| value.get(key).map(owned_text).unwrap_or_default();
        Self {
            media_name: field("mediaName"),
            media_url: field("mediaUrl"),
            media_type: field("mediaType"),
            description: field("mediaDescription"),
        }
    }
}

/// A media file ready to be sent as a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// File name with all whitespace removed, sent as both the part file name and `mediaName`.
    pub media_name: String,
    pub content_type: String,
    pub media_type: String,
    pub description: String,
    /// Client-generated millisecond timestamp.
    pub media_id: i64,
    pub bytes: Vec<u8>,
}

fn owned_text(value: &Value) -> String {
    loose_text(value).map(Cow::into_owned).unwrap_or_default()
}

use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::GroupApiPort;
use crate::error::{AdminError, DecodeError, Result, ValidationError};
use crate::pipeline::ingestion::decoder::{AutoDecoder, SpreadsheetDecoder};
use crate::pipeline::preview::Preview;
use crate::pipeline::processing::extract_identifiers;
use crate::types::{IdentifierList, Location, NormalizedRow, SubmissionPayload};

/// State of one upload-and-submit flow: the chosen location, the selected file and
/// the identifiers extracted from it.
///
/// `submit` takes `&mut self` for the whole request, so a second submission cannot start
/// while one is outstanding and a new file cannot swap the codes underneath it.
pub struct UploadSession {
    api: Arc<dyn GroupApiPort>,
    decoder: Box<dyn SpreadsheetDecoder + Send + Sync>,
    location: Location,
    file_name: Option<String>,
    rows: Vec<NormalizedRow>,
}

impl UploadSession {
    pub fn new(api: Arc<dyn GroupApiPort>) -> Self {
        Self::with_decoder(api, Box::new(AutoDecoder))
    }

    pub fn with_decoder(
        api: Arc<dyn GroupApiPort>,
        decoder: Box<dyn SpreadsheetDecoder + Send + Sync>,
    ) -> Self {
        Self {
            api,
            decoder,
            location: Location::default(),
            file_name: None,
            rows: Vec::new(),
        }
    }

    pub fn select_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Replaces the current file and preview. On a decode failure the selection is
    /// cleared so stale codes from an earlier file cannot be submitted.
    pub fn load_bytes(&mut self, file_name: &str, bytes: &[u8]) -> std::result::Result<usize, DecodeError> {
        match self.decoder.decode(file_name, bytes) {
            Ok(uploaded) => {
                self.rows = extract_identifiers(&uploaded);
                self.file_name = Some(file_name.to_string());
                info!(
                    file = %file_name,
                    rows = uploaded.len(),
                    codes = self.rows.len(),
                    "Loaded spreadsheet"
                );
                Ok(self.rows.len())
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "Spreadsheet could not be decoded");
                self.clear_selection();
                Err(e)
            }
        }
    }

    pub async fn load_path(&mut self, path: &Path) -> Result<usize> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.clear_selection();
                return Err(AdminError::Io(e));
            }
        };
        Ok(self.load_bytes(&file_name, &bytes)?)
    }

    pub fn preview(&self) -> Preview<'_> {
        Preview::new(&self.rows, &self.location)
    }

    pub fn identifier_codes(&self) -> IdentifierList {
        self.preview().identifier_codes()
    }

    /// Checks preconditions in the order the user meets them: file, location, codes.
    pub fn payload(&self) -> std::result::Result<SubmissionPayload, ValidationError> {
        if self.file_name.is_none() {
            return Err(ValidationError::MissingFile);
        }
        if !self.location.is_complete() {
            return Err(ValidationError::MissingLocation);
        }
        if self.rows.is_empty() {
            return Err(ValidationError::NoIdentifiers);
        }
        Ok(SubmissionPayload::new(&self.location, self.identifier_codes()))
    }

    /// Sends the codes once. Success resets the session; failure leaves it intact for a retry.
    pub async fn submit(&mut self) -> Result<Value> {
        let payload = self.payload()?;
        info!(
            district = %payload.district,
            block = %payload.block,
            codes = payload.identifier_codes.len(),
            "Submitting UDISE codes"
        );

        match self.api.find_groups(&payload).await {
            Ok(reply) => {
                info!("UDISE codes submitted");
                self.reset();
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "UDISE submission failed");
                Err(e.into())
            }
        }
    }

    pub fn reset(&mut self) {
        self.location = Location::default();
        self.clear_selection();
    }

    fn clear_selection(&mut self) {
        self.file_name = None;
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::MockGroupApi;
    use crate::error::SubmissionError;
    use crate::types::CellValue;

    const CSV: &str = "UDISE_CODE,random_col,Udice Code\n101,,\n,x,\n,,202\n";

    fn session(api: Arc<MockGroupApi>) -> UploadSession {
        UploadSession::new(api)
    }

    #[tokio::test]
    async fn submits_lowercased_location_with_codes_in_row_order() {
        let api = Arc::new(MockGroupApi::new());
        let mut session = session(api.clone());
        session.select_location(Location::new("Khordha", "Bhubaneswar"));

        assert_eq!(session.load_bytes("codes.csv", CSV.as_bytes()).unwrap(), 2);
        session.submit().await.unwrap();

        let submissions = api.submissions.lock().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].district, "khordha");
        assert_eq!(submissions[0].block, "bhubaneswar");
        assert_eq!(
            submissions[0].identifier_codes,
            vec![CellValue::Integer(101), CellValue::Integer(202)]
        );
        drop(submissions);

        assert!(session.file_name().is_none());
        assert!(session.preview().is_empty());
        assert!(!session.location().is_complete());
    }

    #[tokio::test]
    async fn validation_blocks_the_request() {
        let api = Arc::new(MockGroupApi::new());
        let mut session = session(api.clone());

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::MissingFile)));

        session.load_bytes("codes.csv", CSV.as_bytes()).unwrap();
        session.select_location(Location::new("Khordha", ""));
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::MissingLocation)));

        session.select_location(Location::new("", "Bhubaneswar"));
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::MissingLocation)));

        session.select_location(Location::new("Khordha", "Bhubaneswar"));
        session
            .load_bytes("none.csv", b"name,block\nA,B\n")
            .unwrap();
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::NoIdentifiers)));

        assert!(api.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn failed_submission_keeps_state_for_retry() {
        let api = Arc::new(MockGroupApi::failing(502));
        let mut session = session(api.clone());
        session.select_location(Location::new("Puri", "Gop"));
        session.load_bytes("codes.csv", CSV.as_bytes()).unwrap();

        let err = session.submit().await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Submission(SubmissionError::Status { status: 502, .. })
        ));

        assert_eq!(session.file_name(), Some("codes.csv"));
        assert_eq!(session.preview().len(), 2);
        assert!(session.payload().is_ok());
        assert_eq!(api.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn new_file_replaces_previous_codes() {
        let api = Arc::new(MockGroupApi::new());
        let mut session = session(api);

        session.load_bytes("first.csv", CSV.as_bytes()).unwrap();
        session.load_bytes("second.csv", b"udise\n9\n").unwrap();

        assert_eq!(session.file_name(), Some("second.csv"));
        assert_eq!(session.identifier_codes(), vec![CellValue::Integer(9)]);
    }

    #[tokio::test]
    async fn decode_failure_clears_selection() {
        let api = Arc::new(MockGroupApi::new());
        let mut session = session(api);
        session.load_bytes("first.csv", CSV.as_bytes()).unwrap();

        assert!(session.load_bytes("broken.xlsx", b"not a workbook").is_err());
        assert!(session.file_name().is_none());
        assert!(session.preview().is_empty());
    }

    #[tokio::test]
    async fn load_path_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut session = session(Arc::new(MockGroupApi::new()));
        assert_eq!(session.load_path(&path).await.unwrap(), 2);
        assert_eq!(session.file_name(), Some("codes.csv"));

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            session.load_path(&missing).await,
            Err(AdminError::Io(_))
        ));
        assert!(session.file_name().is_none());
    }
}

use anyhow::Result;
use async_trait::async_trait;
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;
use tokio::sync::Mutex;

use udise_groups::app::ports::GroupApiPort;
use udise_groups::app::upload_use_case::UploadSession;
use udise_groups::types::{
    CellValue, Location, NumberAdditionPayload, SubmissionPayload, UnmatchedGroup,
};
use udise_groups::{AdminError, SubmissionError, ValidationError};

/// Records submitted bodies exactly as they would go on the wire.
#[derive(Default)]
struct RecordingApi {
    bodies: Mutex<Vec<Value>>,
}

#[async_trait]
impl GroupApiPort for RecordingApi {
    async fn find_groups(&self, payload: &SubmissionPayload) -> Result<Value, SubmissionError> {
        self.bodies
            .lock()
            .await
            .push(serde_json::to_value(payload).expect("payload serializes"));
        Ok(json!({ "status": true }))
    }

    async fn sync_groups(&self) -> Result<Value, SubmissionError> {
        unreachable!("not used by the upload flow")
    }

    async fn group_count(&self, _location: &Location) -> Result<u64, SubmissionError> {
        unreachable!("not used by the upload flow")
    }

    async fn add_number(&self, _payload: &NumberAdditionPayload) -> Result<Value, SubmissionError> {
        unreachable!("not used by the upload flow")
    }

    async fn addition_status(&self, _location: &Location) -> Result<Value, SubmissionError> {
        unreachable!("not used by the upload flow")
    }

    async fn unmatched_groups(&self) -> Result<Vec<UnmatchedGroup>, SubmissionError> {
        unreachable!("not used by the upload flow")
    }
}

#[tokio::test]
async fn workbook_upload_is_submitted_with_backend_field_names() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("block_schools.xlsx");

    // Three rows: an identifier, an unrelated column, and the misspelled header.
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "UDISE_CODE")?;
    sheet.write_string(0, 1, "random_col")?;
    sheet.write_string(0, 2, "Udice Code")?;
    sheet.write_number(1, 0, 101)?;
    sheet.write_string(2, 1, "x")?;
    sheet.write_number(3, 2, 202)?;
    workbook.save(&path)?;

    let api = Arc::new(RecordingApi::default());
    let mut session = UploadSession::new(api.clone());
    session.select_location(Location::new("Khordha", "Bhubaneswar"));

    let found = session.load_path(&path).await?;
    assert_eq!(found, 2);
    assert_eq!(
        session.identifier_codes(),
        vec![CellValue::Integer(101), CellValue::Integer(202)]
    );
    assert!(session
        .preview()
        .render()
        .starts_with("Found 2 udise in Bhubaneswar, Khordha"));

    session.submit().await?;

    let bodies = api.bodies.lock().await;
    assert_eq!(
        bodies.as_slice(),
        [json!({
            "district": "khordha",
            "block": "bhubaneswar",
            "udisecodes": [101, 202]
        })]
    );
    Ok(())
}

#[tokio::test]
async fn header_only_workbook_cannot_be_submitted() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("empty.xlsx");

    let mut workbook = Workbook::new();
    workbook.add_worksheet().write_string(0, 0, "UDISE")?;
    workbook.save(&path)?;

    let api = Arc::new(RecordingApi::default());
    let mut session = UploadSession::new(api.clone());
    session.select_location(Location::new("Puri", "Gop"));

    assert_eq!(session.load_path(&path).await?, 0);
    assert!(session.preview().is_empty());

    let err = session.submit().await.unwrap_err();
    assert!(matches!(
        err,
        AdminError::Validation(ValidationError::NoIdentifiers)
    ));
    assert!(api.bodies.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_spreadsheet_upload_is_a_decode_error() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("photo.xlsx");
    std::fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])?;

    let mut session = UploadSession::new(Arc::new(RecordingApi::default()));
    let err = session.load_path(&path).await.unwrap_err();
    assert!(matches!(err, AdminError::Decode(_)));
    assert!(session.file_name().is_none());
    Ok(())
}

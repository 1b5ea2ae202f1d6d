// Upload pipeline: spreadsheet decoding, identifier extraction, and presentation helpers

pub mod ingestion;
pub mod listing;
pub mod preview;
pub mod processing;

pub use ingestion::decoder::{AutoDecoder, SpreadsheetDecoder};
pub use processing::extract_identifiers;

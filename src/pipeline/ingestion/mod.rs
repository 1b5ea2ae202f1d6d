// Pipeline ingestion: reading uploaded spreadsheets into rows

pub mod decoder;

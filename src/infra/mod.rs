pub mod http_client;
pub mod xlsx_export;

pub mod api;
pub mod config;
pub mod db;
pub mod ingest;
pub mod live_state;
pub mod storage;

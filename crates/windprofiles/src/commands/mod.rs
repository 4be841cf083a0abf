pub mod ingest;
pub mod units;

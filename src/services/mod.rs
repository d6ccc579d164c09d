pub mod card_ingest;
pub mod seed;

pub use card_ingest::{ingest, IngestError, IngestReport};

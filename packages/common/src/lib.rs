pub mod compress;
pub mod config;
pub mod ingest;
pub mod storage;

pub use compress::{CompressError, CompressOutcome, Compressor, OutputFormat};
pub use config::{CloudinaryConfig, CompressionPolicy};
pub use ingest::{BoxReader, IngestError, Ingestor, UploadOptions, UploadResult, UploadSource};

mod error;
mod traits;

pub mod cloudinary;
pub mod variants;

pub use cloudinary::CloudinaryStore;
pub use error::StorageError;
pub use traits::{AssetStore, RemoteAsset, UploadRequest};

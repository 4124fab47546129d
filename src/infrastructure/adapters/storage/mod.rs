//! Image Storage Adapters

mod file_image_storage;

pub use file_image_storage::{FileImageStorage, FileImageStorageConfig, ImageObjectMetadata};

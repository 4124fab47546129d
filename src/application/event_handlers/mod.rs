//! Domain Event Handlers
//!
//! 订阅领域事件的应用层处理器

mod image_cleanup;

pub use image_cleanup::ImageCleanupHandler;

//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod character_handlers;
mod image_handlers;
mod pronoun_handlers;

pub use character_handlers::*;
pub use image_handlers::*;
pub use pronoun_handlers::*;

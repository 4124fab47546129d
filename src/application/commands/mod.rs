//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作，每个命令显式携带操作用户

mod character_commands;
mod image_commands;
mod pronoun_commands;

pub mod handlers;

pub use character_commands::*;
pub use image_commands::*;
pub use pronoun_commands::*;

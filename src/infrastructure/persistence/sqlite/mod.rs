//! SQLite Persistence - SQLite 数据库持久化实现

mod change_store;
mod character_repo;
mod database;
mod image_repo;
mod pronoun_repo;

pub use change_store::*;
pub use character_repo::*;
pub use database::*;
pub use image_repo::*;
pub use pronoun_repo::*;

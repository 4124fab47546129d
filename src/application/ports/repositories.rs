//! Repository Ports - 出站端口
//!
//! 只读查找接口；写入统一经由 Unit of Work 的 ChangeStorePort 提交。
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::character::{
    Character, CharacterId, Image, ImageId, Pronoun, PronounId, UserId,
};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 乐观并发冲突（版本号不匹配）
    #[error("Concurrency conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 提交前被取消，事务已回滚
    #[error("Cancelled before commit")]
    Cancelled,
}

// ============================================================================
// Character Repository
// ============================================================================

/// Character Repository Port
///
/// 返回完整重建的聚合（包含代词组与图片）。
#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    /// 根据 ID 查找角色
    async fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError>;

    /// 获取指定用户创建的角色
    async fn find_by_created_by(&self, user_id: UserId) -> Result<Vec<Character>, RepositoryError>;

    /// 获取所有角色
    async fn find_all(&self) -> Result<Vec<Character>, RepositoryError>;
}

// ============================================================================
// Pronoun Repository
// ============================================================================

/// Pronoun Repository Port（代词目录）
#[async_trait]
pub trait PronounRepositoryPort: Send + Sync {
    /// 是否已存在相同三元组（大小写不敏感）
    async fn exists(
        &self,
        subject: &str,
        object: &str,
        possessive: &str,
    ) -> Result<bool, RepositoryError>;

    /// 按三元组查找（大小写不敏感）
    async fn find_by_value(
        &self,
        subject: &str,
        object: &str,
        possessive: &str,
    ) -> Result<Option<Pronoun>, RepositoryError>;

    /// 根据 ID 查找代词组
    async fn find_by_id(&self, id: PronounId) -> Result<Option<Pronoun>, RepositoryError>;

    /// 批量查找；只返回存在的条目，调用方负责报告缺失
    async fn find_by_ids(&self, ids: &[PronounId]) -> Result<Vec<Pronoun>, RepositoryError>;

    /// 获取目录中所有代词组
    async fn find_all(&self) -> Result<Vec<Pronoun>, RepositoryError>;
}

// ============================================================================
// Image Repository
// ============================================================================

/// Image Repository Port
#[async_trait]
pub trait ImageRepositoryPort: Send + Sync {
    /// 根据 ID 查找图片
    async fn find_by_id(&self, id: ImageId) -> Result<Option<Image>, RepositoryError>;

    /// 批量查找；只返回存在的条目
    async fn find_by_ids(&self, ids: &[ImageId]) -> Result<Vec<Image>, RepositoryError>;
}

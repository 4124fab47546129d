//! Change Store Port - Unit of Work 的持久化端口
//!
//! 一次提交的全部变更以 ChangeSet 形式整体交给存储，
//! 存储必须原子地应用（全部成功或全部回滚）。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RepositoryError;
use crate::domain::character::{Character, Pronoun};

/// 角色变更
#[derive(Debug, Clone)]
pub enum CharacterChange {
    /// 新增（version 应为 0）
    Added(Character),
    /// 更新（按加载时的 version 做乐观并发校验）
    Updated(Character),
    /// 删除（同上，级联删除图片与代词关联）
    Deleted(Character),
}

impl CharacterChange {
    pub fn character(&self) -> &Character {
        match self {
            CharacterChange::Added(c) | CharacterChange::Updated(c) | CharacterChange::Deleted(c) => c,
        }
    }

    pub fn character_mut(&mut self) -> &mut Character {
        match self {
            CharacterChange::Added(c) | CharacterChange::Updated(c) | CharacterChange::Deleted(c) => c,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CharacterChange::Added(_) => "added",
            CharacterChange::Updated(_) => "updated",
            CharacterChange::Deleted(_) => "deleted",
        }
    }
}

/// 代词目录变更
#[derive(Debug, Clone)]
pub enum PronounChange {
    Added(Pronoun),
}

/// 一次提交的全部变更（按登记顺序）
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub characters: Vec<CharacterChange>,
    pub pronouns: Vec<PronounChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.pronouns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.characters.len() + self.pronouns.len()
    }
}

/// Change Store Port
#[async_trait]
pub trait ChangeStorePort: Send + Sync {
    /// 原子地持久化全部变更
    ///
    /// 返回 `RepositoryError::Conflict` 表示某个聚合已被并发修改；
    /// 任何错误都意味着没有变更被持久化。
    ///
    /// 取消令牌只在发出 COMMIT 之前检查，返回 `RepositoryError::Cancelled`；
    /// 一旦发出 COMMIT，本次调用必须运行到结束并如实报告结果。
    async fn persist(
        &self,
        changes: &ChangeSet,
        cancel: &CancellationToken,
    ) -> Result<(), RepositoryError>;
}

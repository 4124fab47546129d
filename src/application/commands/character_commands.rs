//! Character Commands

use crate::domain::character::{CharacterId, PronounId, UserId};

/// 代词组输入（subject / object / possessive）
#[derive(Debug, Clone)]
pub struct PronounInput {
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl PronounInput {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        possessive: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            possessive: possessive.into(),
        }
    }
}

/// 创建角色命令
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub requested_by: UserId,
    pub name: String,
    pub description: Option<String>,
    /// 关联代词目录中已存在的代词组
    pub pronoun_ids: Vec<PronounId>,
}

/// 更新角色命令（代词组整体替换）
#[derive(Debug, Clone)]
pub struct UpdateCharacter {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub name: String,
    pub description: Option<String>,
    pub pronouns: Vec<PronounInput>,
}

/// 删除角色命令
#[derive(Debug, Clone)]
pub struct DeleteCharacter {
    pub requested_by: UserId,
    pub character_id: CharacterId,
}

/// 为角色添加代词组
#[derive(Debug, Clone)]
pub struct AddCharacterPronoun {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub pronoun: PronounInput,
}

/// 从角色移除代词组
#[derive(Debug, Clone)]
pub struct RemoveCharacterPronoun {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub pronoun: PronounInput,
}

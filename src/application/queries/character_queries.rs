//! Character Queries

use crate::domain::character::{CharacterId, ImageId, UserId};

/// 获取角色详情
#[derive(Debug, Clone)]
pub struct GetCharacter {
    pub character_id: CharacterId,
}

/// 列出角色，可按创建者过滤
#[derive(Debug, Clone, Default)]
pub struct ListCharacters {
    pub created_by: Option<UserId>,
}

/// 批量获取图片
#[derive(Debug, Clone)]
pub struct GetImagesByIds {
    pub image_ids: Vec<ImageId>,
}

/// 获取图片读取地址
#[derive(Debug, Clone)]
pub struct GetImageDownloadUrl {
    pub character_id: CharacterId,
    pub image_id: ImageId,
}

//! Image Commands

use crate::domain::character::{CharacterId, ImageId, UserId};

/// 为角色添加图片（返回上传地址）
#[derive(Debug, Clone)]
pub struct AddCharacterImage {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub name: String,
}

/// 确认上传完成：Pending → Processing → 校验存储 → Completed / Failed
#[derive(Debug, Clone)]
pub struct ConfirmImageUpload {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub image_id: ImageId,
}

/// 标记上传失败
#[derive(Debug, Clone)]
pub struct MarkImageFailed {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub image_id: ImageId,
}

/// 移除角色图片
#[derive(Debug, Clone)]
pub struct RemoveCharacterImage {
    pub requested_by: UserId,
    pub character_id: CharacterId,
    pub image_id: ImageId,
}

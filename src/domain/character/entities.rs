//! Character Context - Entities
//!
//! Pronoun 与 Image 只能经由 Character 聚合修改。

use serde::Serialize;

use super::errors;
use super::{CharacterId, ImageId, PronounId, UploadStatus};
use crate::domain::primitives::{eq_ignore_case, DomainError, DomainResult, Entity};

// ============================================================================
// Pronoun
// ============================================================================

/// 代词组（不可变）
#[derive(Debug, Clone, Serialize)]
pub struct Pronoun {
    id: PronounId,
    subject: String,
    object: String,
    possessive: String,
}

impl Pronoun {
    pub const MAX_LENGTH: usize = 50;

    /// 创建新代词组
    ///
    /// 三个字段都必须非空（去除首尾空白后）且不超过 50 字符，
    /// 按 subject → object → possessive 顺序校验，返回第一个失败。
    pub fn create(
        subject: impl Into<String>,
        object: impl Into<String>,
        possessive: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::restore(PronounId::new(), subject, object, possessive)
    }

    /// 从存储重建（重新执行校验）
    pub fn restore(
        id: PronounId,
        subject: impl Into<String>,
        object: impl Into<String>,
        possessive: impl Into<String>,
    ) -> DomainResult<Self> {
        let subject = validate_part(
            subject.into(),
            errors::pronoun::subject_empty,
            errors::pronoun::subject_too_long,
        )?;
        let object = validate_part(
            object.into(),
            errors::pronoun::object_empty,
            errors::pronoun::object_too_long,
        )?;
        let possessive = validate_part(
            possessive.into(),
            errors::pronoun::possessive_empty,
            errors::pronoun::possessive_too_long,
        )?;

        Ok(Self {
            id,
            subject,
            object,
            possessive,
        })
    }

    pub fn id(&self) -> PronounId {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn possessive(&self) -> &str {
        &self.possessive
    }

    /// 三元组大小写不敏感匹配
    pub fn matches(&self, subject: &str, object: &str, possessive: &str) -> bool {
        eq_ignore_case(&self.subject, subject.trim())
            && eq_ignore_case(&self.object, object.trim())
            && eq_ignore_case(&self.possessive, possessive.trim())
    }

    pub fn same_value_as(&self, other: &Pronoun) -> bool {
        self.matches(&other.subject, &other.object, &other.possessive)
    }
}

fn validate_part(
    value: String,
    empty: fn() -> DomainError,
    too_long: fn(usize) -> DomainError,
) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }
    if trimmed.chars().count() > Pronoun::MAX_LENGTH {
        return Err(too_long(Pronoun::MAX_LENGTH));
    }
    Ok(trimmed.to_string())
}

impl Entity for Pronoun {
    type Id = PronounId;

    fn id(&self) -> PronounId {
        self.id
    }
}

impl PartialEq for Pronoun {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity_as(other)
    }
}

impl Eq for Pronoun {}

impl std::fmt::Display for Pronoun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.subject, self.object, self.possessive)
    }
}

// ============================================================================
// Image
// ============================================================================

/// 角色图片（上传状态机）
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    id: ImageId,
    character_id: CharacterId,
    name: String,
    status: UploadStatus,
}

impl Image {
    pub const NAME_MAX_LENGTH: usize = 200;

    /// 新图片，状态为 Pending
    pub(crate) fn create(character_id: CharacterId, name: impl Into<String>) -> DomainResult<Self> {
        Self::restore(ImageId::new(), character_id, name, UploadStatus::Pending)
    }

    /// 从存储重建
    pub fn restore(
        id: ImageId,
        character_id: CharacterId,
        name: impl Into<String>,
        status: UploadStatus,
    ) -> DomainResult<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(errors::image::name_invalid());
        }
        if trimmed.chars().count() > Self::NAME_MAX_LENGTH {
            return Err(errors::image::name_too_long(Self::NAME_MAX_LENGTH));
        }

        Ok(Self {
            id,
            character_id,
            name: trimmed.to_string(),
            status,
        })
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Pending → Processing
    pub(crate) fn set_processing(&mut self) -> DomainResult<()> {
        if self.status != UploadStatus::Pending {
            return Err(errors::image::set_processing_invalid_status());
        }
        self.status = UploadStatus::Processing;
        Ok(())
    }

    /// Processing → Completed
    pub(crate) fn set_completed(&mut self) -> DomainResult<()> {
        if self.status != UploadStatus::Processing {
            return Err(errors::image::set_completed_invalid_status());
        }
        self.status = UploadStatus::Completed;
        Ok(())
    }

    /// 除 Completed 外任意状态 → Failed
    pub(crate) fn set_failed(&mut self) -> DomainResult<()> {
        if self.status == UploadStatus::Completed {
            return Err(errors::image::set_failed_invalid_status());
        }
        self.status = UploadStatus::Failed;
        Ok(())
    }
}

impl Entity for Image {
    type Id = ImageId;

    fn id(&self) -> ImageId {
        self.id
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity_as(other)
    }
}

impl Eq for Image {}

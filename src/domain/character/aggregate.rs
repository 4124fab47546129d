//! Character Context - Aggregate Root

use chrono::{DateTime, Utc};

use super::errors;
use super::{
    CharacterId, DomainEvent, Image, ImageId, ImageRemovedDomainEvent,
    ImageUploadFailedDomainEvent, Pronoun, UserId,
};
use crate::domain::primitives::{
    eq_ignore_case, AggregateRoot, DomainEvents, DomainResult, Entity,
};

/// 从存储重建 Character 所需的完整状态
#[derive(Debug, Clone)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_on: DateTime<Utc>,
    pub modified_by: Option<UserId>,
    pub modified_on: Option<DateTime<Utc>>,
    pub version: i64,
    pub pronouns: Vec<Pronoun>,
    pub images: Vec<Image>,
}

/// Character 聚合根
///
/// 不变量:
/// - 名称去除首尾空白后非空，且不超过 200 字符
/// - 描述不超过 5000 字符
/// - 代词组按 subject/object/possessive 大小写不敏感去重
/// - 图片只能通过本聚合增删及切换上传状态
/// - 每次成功的状态变更都会记录 modified_by / modified_on
///
/// `version` 为乐观并发令牌，由存储在每次提交时递增。
#[derive(Debug, Clone)]
pub struct Character {
    id: CharacterId,
    name: String,
    description: Option<String>,
    created_by: UserId,
    created_on: DateTime<Utc>,
    modified_by: Option<UserId>,
    modified_on: Option<DateTime<Utc>>,
    version: i64,
    pronouns: Vec<Pronoun>,
    images: Vec<Image>,
    events: DomainEvents<DomainEvent>,
}

impl Character {
    pub const NAME_MAX_LENGTH: usize = 200;
    pub const DESCRIPTION_MAX_LENGTH: usize = 5000;

    /// 创建新角色
    pub fn create(
        id: CharacterId,
        name: impl Into<String>,
        description: Option<String>,
        created_by: UserId,
    ) -> DomainResult<Self> {
        let name = validate_name(name.into())?;
        validate_description(description.as_deref())?;
        if created_by.is_nil() {
            return Err(errors::character::created_by_invalid());
        }

        Ok(Self {
            id,
            name,
            description,
            created_by,
            created_on: Utc::now(),
            modified_by: None,
            modified_on: None,
            version: 0,
            pronouns: Vec::new(),
            images: Vec::new(),
            events: DomainEvents::new(),
        })
    }

    /// 从存储重建（重新执行 create 的校验，不产生事件）
    pub fn restore(snapshot: CharacterSnapshot) -> DomainResult<Self> {
        let name = validate_name(snapshot.name)?;
        validate_description(snapshot.description.as_deref())?;
        if snapshot.created_by.is_nil() {
            return Err(errors::character::created_by_invalid());
        }

        Ok(Self {
            id: snapshot.id,
            name,
            description: snapshot.description,
            created_by: snapshot.created_by,
            created_on: snapshot.created_on,
            modified_by: snapshot.modified_by,
            modified_on: snapshot.modified_on,
            version: snapshot.version,
            pronouns: snapshot.pronouns,
            images: snapshot.images,
            events: DomainEvents::new(),
        })
    }

    /// 导出完整状态（持久化用）
    pub fn to_snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_by: self.created_by,
            created_on: self.created_on,
            modified_by: self.modified_by,
            modified_on: self.modified_on,
            version: self.version,
            pronouns: self.pronouns.clone(),
            images: self.images.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Name / Description
    // ------------------------------------------------------------------

    /// 修改名称；与当前名称大小写不敏感相同时不做任何修改
    pub fn change_name(&mut self, name: impl Into<String>, modified_by: UserId) -> DomainResult<()> {
        let name = validate_name(name.into())?;
        if eq_ignore_case(&self.name, &name) {
            return Ok(());
        }

        self.name = name;
        self.touch(modified_by);
        Ok(())
    }

    /// 修改描述；与当前描述完全相同时不做任何修改
    pub fn change_description(
        &mut self,
        description: Option<String>,
        modified_by: UserId,
    ) -> DomainResult<()> {
        validate_description(description.as_deref())?;
        if self.description == description {
            return Ok(());
        }

        self.description = description;
        self.touch(modified_by);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pronouns
    // ------------------------------------------------------------------

    /// 新建并添加代词组
    pub fn add_pronoun(
        &mut self,
        subject: &str,
        object: &str,
        possessive: &str,
        modified_by: UserId,
    ) -> DomainResult<Pronoun> {
        if self.find_pronoun(subject, object, possessive).is_some() {
            return Err(errors::character::pronoun_duplicate());
        }

        let pronoun = Pronoun::create(subject, object, possessive)?;
        self.pronouns.push(pronoun.clone());
        self.touch(modified_by);
        Ok(pronoun)
    }

    /// 关联代词目录中已存在的代词组（保留其 ID）
    pub fn attach_pronoun(&mut self, pronoun: Pronoun, modified_by: UserId) -> DomainResult<()> {
        if self.pronouns.iter().any(|p| p.same_value_as(&pronoun)) {
            return Err(errors::character::pronoun_duplicate());
        }

        self.pronouns.push(pronoun);
        self.touch(modified_by);
        Ok(())
    }

    /// 移除匹配的代词组
    pub fn remove_pronoun(
        &mut self,
        subject: &str,
        object: &str,
        possessive: &str,
        modified_by: UserId,
    ) -> DomainResult<Pronoun> {
        let index = self
            .find_pronoun(subject, object, possessive)
            .ok_or_else(errors::character::pronoun_not_found)?;

        let removed = self.pronouns.remove(index);
        self.touch(modified_by);
        Ok(removed)
    }

    fn find_pronoun(&self, subject: &str, object: &str, possessive: &str) -> Option<usize> {
        self.pronouns
            .iter()
            .position(|p| p.matches(subject, object, possessive))
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// 添加图片（Pending）
    pub fn add_image(&mut self, name: impl Into<String>, modified_by: UserId) -> DomainResult<Image> {
        let image = Image::create(self.id, name)?;
        self.images.push(image.clone());
        self.touch(modified_by);
        Ok(image)
    }

    pub fn set_image_processing(&mut self, image_id: ImageId, modified_by: UserId) -> DomainResult<()> {
        self.image_mut(image_id)?.set_processing()?;
        self.touch(modified_by);
        Ok(())
    }

    pub fn set_image_completed(&mut self, image_id: ImageId, modified_by: UserId) -> DomainResult<()> {
        self.image_mut(image_id)?.set_completed()?;
        self.touch(modified_by);
        Ok(())
    }

    /// 标记上传失败，产生 `ImageUploadFailedDomainEvent`
    pub fn set_image_failed(&mut self, image_id: ImageId, modified_by: UserId) -> DomainResult<()> {
        self.image_mut(image_id)?.set_failed()?;
        self.touch(modified_by);
        self.events
            .raise(ImageUploadFailedDomainEvent::new(self.id, image_id).into());
        Ok(())
    }

    /// 移除图片，产生 `ImageRemovedDomainEvent`
    pub fn remove_image(&mut self, image_id: ImageId, modified_by: UserId) -> DomainResult<()> {
        let index = self
            .images
            .iter()
            .position(|i| i.id() == image_id)
            .ok_or_else(|| errors::character::image_not_found(image_id))?;

        self.images.remove(index);
        self.touch(modified_by);
        self.events
            .raise(ImageRemovedDomainEvent::new(self.id, image_id).into());
        Ok(())
    }

    fn image_mut(&mut self, image_id: ImageId) -> DomainResult<&mut Image> {
        self.images
            .iter_mut()
            .find(|i| i.id() == image_id)
            .ok_or_else(|| errors::character::image_not_found(image_id))
    }

    fn touch(&mut self, modified_by: UserId) {
        self.modified_by = Some(modified_by);
        self.modified_on = Some(Utc::now());
    }

    // Getters
    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn modified_by(&self) -> Option<UserId> {
        self.modified_by
    }

    pub fn modified_on(&self) -> Option<DateTime<Utc>> {
        self.modified_on
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn pronouns(&self) -> &[Pronoun] {
        &self.pronouns
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, image_id: ImageId) -> Option<&Image> {
        self.images.iter().find(|i| i.id() == image_id)
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(errors::character::name_invalid());
    }
    if trimmed.chars().count() > Character::NAME_MAX_LENGTH {
        return Err(errors::character::name_too_long(Character::NAME_MAX_LENGTH));
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: Option<&str>) -> DomainResult<()> {
    match description {
        Some(d) if d.chars().count() > Character::DESCRIPTION_MAX_LENGTH => Err(
            errors::character::description_too_long(Character::DESCRIPTION_MAX_LENGTH),
        ),
        _ => Ok(()),
    }
}

impl Entity for Character {
    type Id = CharacterId;

    fn id(&self) -> CharacterId {
        self.id
    }
}

impl PartialEq for Character {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity_as(other)
    }
}

impl Eq for Character {}

impl AggregateRoot for Character {
    type Event = DomainEvent;

    fn domain_events(&self) -> &[DomainEvent] {
        self.events.as_slice()
    }

    fn take_domain_events(&mut self) -> Vec<DomainEvent> {
        self.events.drain()
    }
}

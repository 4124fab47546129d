//! Read Models - 查询与命令共用的只读视图

use chrono::{DateTime, Utc};

use crate::domain::character::{
    Character, CharacterId, Image, ImageId, Pronoun, PronounId, UploadStatus, UserId,
};

/// 角色视图
#[derive(Debug, Clone)]
pub struct CharacterView {
    pub id: CharacterId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_on: DateTime<Utc>,
    pub modified_by: Option<UserId>,
    pub modified_on: Option<DateTime<Utc>>,
    pub version: i64,
    pub pronouns: Vec<PronounView>,
    pub images: Vec<ImageView>,
}

impl From<&Character> for CharacterView {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id(),
            name: character.name().to_string(),
            description: character.description().map(str::to_string),
            created_by: character.created_by(),
            created_on: character.created_on(),
            modified_by: character.modified_by(),
            modified_on: character.modified_on(),
            version: character.version(),
            pronouns: character.pronouns().iter().map(PronounView::from).collect(),
            images: character.images().iter().map(ImageView::from).collect(),
        }
    }
}

/// 代词组视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PronounView {
    pub id: PronounId,
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl From<&Pronoun> for PronounView {
    fn from(pronoun: &Pronoun) -> Self {
        Self {
            id: pronoun.id(),
            subject: pronoun.subject().to_string(),
            object: pronoun.object().to_string(),
            possessive: pronoun.possessive().to_string(),
        }
    }
}

/// 图片视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub id: ImageId,
    pub character_id: CharacterId,
    pub name: String,
    pub status: UploadStatus,
}

impl From<&Image> for ImageView {
    fn from(image: &Image) -> Self {
        Self {
            id: image.id(),
            character_id: image.character_id(),
            name: image.name().to_string(),
            status: image.status(),
        }
    }
}

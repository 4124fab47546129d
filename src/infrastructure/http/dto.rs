//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{
    AddCharacterImageResponse, CharacterView, ConfirmImageUploadResponse, ImageUrlResponse,
    ImageView, PronounInput, PronounView,
};
use crate::domain::character::{CharacterId, ImageId, PronounId, UploadStatus, UserId};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Character DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pronoun_ids: Vec<PronounId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCharacterRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pronouns: Vec<PronounRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCharactersParams {
    pub created_by: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub id: CharacterId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_on: DateTime<Utc>,
    pub modified_by: Option<UserId>,
    pub modified_on: Option<DateTime<Utc>>,
    pub version: i64,
    pub pronouns: Vec<PronounResponse>,
    pub images: Vec<ImageResponse>,
}

impl From<CharacterView> for CharacterResponse {
    fn from(view: CharacterView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            description: view.description,
            created_by: view.created_by,
            created_on: view.created_on,
            modified_by: view.modified_by,
            modified_on: view.modified_on,
            version: view.version,
            pronouns: view.pronouns.into_iter().map(Into::into).collect(),
            images: view.images.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Pronoun DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PronounRequest {
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl From<PronounRequest> for PronounInput {
    fn from(req: PronounRequest) -> Self {
        PronounInput::new(req.subject, req.object, req.possessive)
    }
}

#[derive(Debug, Serialize)]
pub struct PronounResponse {
    pub id: PronounId,
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl From<PronounView> for PronounResponse {
    fn from(view: PronounView) -> Self {
        Self {
            id: view.id,
            subject: view.subject,
            object: view.object,
            possessive: view.possessive,
        }
    }
}

// ============================================================================
// Image DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: ImageId,
    pub character_id: CharacterId,
    pub name: String,
    pub status: UploadStatus,
}

impl From<ImageView> for ImageResponse {
    fn from(view: ImageView) -> Self {
        Self {
            id: view.id,
            character_id: view.character_id,
            name: view.name,
            status: view.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddImageResponse {
    pub image: ImageResponse,
    pub upload_url: String,
    pub upload_expires_at: DateTime<Utc>,
}

impl From<AddCharacterImageResponse> for AddImageResponse {
    fn from(res: AddCharacterImageResponse) -> Self {
        Self {
            image: res.image.into(),
            upload_url: res.upload.url,
            upload_expires_at: res.upload.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmImageResponse {
    pub image: ImageResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl From<ConfirmImageUploadResponse> for ConfirmImageResponse {
    fn from(res: ConfirmImageUploadResponse) -> Self {
        Self {
            image: res.image.into(),
            failure_reason: res.failure_reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageUrlDto {
    pub image_id: ImageId,
    pub url: String,
}

impl From<ImageUrlResponse> for ImageUrlDto {
    fn from(res: ImageUrlResponse) -> Self {
        Self {
            image_id: res.image_id,
            url: res.url,
        }
    }
}

/// 签名上传参数
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub expires: i64,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub image_id: ImageId,
    pub content_type: String,
    pub size: u64,
}

//! Image HTTP Handlers
//!
//! 图片元数据由角色聚合管理；二进制内容通过签名上传地址写入文件存储

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{
    AddCharacterImage, ConfirmImageUpload, GetImageDownloadUrl, GetImagesByIds, MarkImageFailed,
    RemoveCharacterImage,
};
use crate::domain::character::{CharacterId, ImageId, UploadStatus};
use crate::infrastructure::http::dto::{
    AddImageRequest, AddImageResponse, ApiResponse, ConfirmImageResponse, Empty, ImageResponse,
    ImageUrlDto, UploadParams, UploadReceipt,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::ActingUser;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Character image lifecycle
// ============================================================================

/// 添加图片，返回签名上传地址
pub async fn add_character_image(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(character_id): Path<CharacterId>,
    Json(req): Json<AddImageRequest>,
) -> Result<Json<ApiResponse<AddImageResponse>>, ApiError> {
    let command = AddCharacterImage {
        requested_by: user,
        character_id,
        name: req.name,
    };

    let result = state
        .add_character_image_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 确认上传完成
pub async fn confirm_image_upload(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> Result<Json<ApiResponse<ConfirmImageResponse>>, ApiError> {
    let command = ConfirmImageUpload {
        requested_by: user,
        character_id,
        image_id,
    };

    let result = state
        .confirm_image_upload_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 标记上传失败
pub async fn mark_image_failed(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> Result<Json<ApiResponse<ImageResponse>>, ApiError> {
    let command = MarkImageFailed {
        requested_by: user,
        character_id,
        image_id,
    };

    let view = state
        .mark_image_failed_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 移除图片（存储对象由事件处理器清理）
pub async fn remove_character_image(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let command = RemoveCharacterImage {
        requested_by: user,
        character_id,
        image_id,
    };

    state
        .remove_character_image_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 获取图片读取地址
pub async fn get_image_url(
    State(state): State<Arc<AppState>>,
    Path((character_id, image_id)): Path<(CharacterId, ImageId)>,
) -> Result<Json<ApiResponse<ImageUrlDto>>, ApiError> {
    let query = GetImageDownloadUrl {
        character_id,
        image_id,
    };

    let result = state.get_image_download_url_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(result.into())))
}

// ============================================================================
// Binary content
// ============================================================================

/// 接收签名上传
pub async fn upload_image_content(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<ImageId>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<UploadReceipt>>, ApiError> {
    state
        .image_storage
        .verify_upload_signature(image_id, params.expires, &params.signature)?;

    if body.len() as u64 > state.max_upload_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "Upload exceeds {} bytes",
            state.max_upload_size
        )));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("Content-Type header is required"))?;

    // 只接受仍在等待上传的图片
    let image = state
        .get_images_by_ids_handler
        .handle(GetImagesByIds {
            image_ids: vec![image_id],
        })
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound {
            code: None,
            message: format!("Image {} not found", image_id),
        })?;
    if image.status != UploadStatus::Pending {
        return Err(ApiError::bad_request(format!(
            "Image {} is not awaiting upload (status: {})",
            image_id, image.status
        )));
    }

    let metadata = state
        .image_storage
        .save_upload(image_id, &content_type, &body)
        .await?;

    tracing::info!(
        character_id = %image.character_id,
        image_id = %image_id,
        content_type = %metadata.content_type,
        size = metadata.size,
        "Image content uploaded"
    );

    Ok(Json(ApiResponse::success(UploadReceipt {
        image_id,
        content_type: metadata.content_type,
        size: metadata.size,
    })))
}

/// 流式返回图片内容
pub async fn get_image_content(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<ImageId>,
) -> Result<Response, ApiError> {
    let (file, metadata) = state.image_storage.open_content(image_id).await?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, metadata.content_type)
        .header(header::CONTENT_LENGTH, metadata.size)
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

//! Character HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    AddCharacterPronoun, CreateCharacter, DeleteCharacter, GetCharacter, ListCharacters,
    RemoveCharacterPronoun, UpdateCharacter,
};
use crate::domain::character::CharacterId;
use crate::infrastructure::http::dto::{
    ApiResponse, CharacterResponse, CreateCharacterRequest, Empty, ListCharactersParams,
    PronounRequest, UpdateCharacterRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::ActingUser;
use crate::infrastructure::http::state::AppState;

/// 创建角色
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Json(req): Json<CreateCharacterRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let command = CreateCharacter {
        requested_by: user,
        name: req.name,
        description: req.description,
        pronoun_ids: req.pronoun_ids,
    };

    let view = state
        .create_character_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 列出角色（可按创建者过滤）
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCharactersParams>,
) -> Result<Json<ApiResponse<Vec<CharacterResponse>>>, ApiError> {
    let query = ListCharacters {
        created_by: params.created_by,
    };

    let views = state.list_characters_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(
        views.into_iter().map(Into::into).collect(),
    )))
}

/// 获取角色详情
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(character_id): Path<CharacterId>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let view = state
        .get_character_handler
        .handle(GetCharacter { character_id })
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 更新角色（代词组整体替换）
pub async fn update_character(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(character_id): Path<CharacterId>,
    Json(req): Json<UpdateCharacterRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let command = UpdateCharacter {
        requested_by: user,
        character_id,
        name: req.name,
        description: req.description,
        pronouns: req.pronouns.into_iter().map(Into::into).collect(),
    };

    let view = state
        .update_character_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 删除角色
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(character_id): Path<CharacterId>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let command = DeleteCharacter {
        requested_by: user,
        character_id,
    };

    state
        .delete_character_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 为角色添加代词组
pub async fn add_character_pronoun(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(character_id): Path<CharacterId>,
    Json(req): Json<PronounRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let command = AddCharacterPronoun {
        requested_by: user,
        character_id,
        pronoun: req.into(),
    };

    let view = state
        .add_character_pronoun_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 从角色移除代词组
pub async fn remove_character_pronoun(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(character_id): Path<CharacterId>,
    Json(req): Json<PronounRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let command = RemoveCharacterPronoun {
        requested_by: user,
        character_id,
        pronoun: req.into(),
    };

    let view = state
        .remove_character_pronoun_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

//! Pronoun Catalog HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{CreatePronoun, GetPronoun, ListPronouns};
use crate::domain::character::PronounId;
use crate::infrastructure::http::dto::{ApiResponse, PronounRequest, PronounResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::ActingUser;
use crate::infrastructure::http::state::AppState;

/// 列出代词目录
pub async fn list_pronouns(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PronounResponse>>>, ApiError> {
    let views = state.list_pronouns_handler.handle(ListPronouns).await?;

    Ok(Json(ApiResponse::success(
        views.into_iter().map(Into::into).collect(),
    )))
}

/// 获取代词组
pub async fn get_pronoun(
    State(state): State<Arc<AppState>>,
    Path(pronoun_id): Path<PronounId>,
) -> Result<Json<ApiResponse<PronounResponse>>, ApiError> {
    let view = state
        .get_pronoun_handler
        .handle(GetPronoun { pronoun_id })
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 新增代词组到目录
pub async fn create_pronoun(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Json(req): Json<PronounRequest>,
) -> Result<Json<ApiResponse<PronounResponse>>, ApiError> {
    let command = CreatePronoun {
        requested_by: user,
        subject: req.subject,
        object: req.object,
        possessive: req.possessive,
    };

    let view = state
        .create_pronoun_handler
        .handle(command, &state.shutdown)
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

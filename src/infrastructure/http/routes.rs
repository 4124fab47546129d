//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                                            GET     健康检查
//! - /api/characters                                      POST    创建角色
//! - /api/characters?created_by={user_id}                 GET     列出角色
//! - /api/characters/:id                                  GET     角色详情
//! - /api/characters/:id                                  PUT     更新角色
//! - /api/characters/:id                                  DELETE  删除角色
//! - /api/characters/:id/pronouns                         POST    添加代词组
//! - /api/characters/:id/pronouns/remove                  POST    移除代词组
//! - /api/characters/:id/images                           POST    添加图片（返回上传地址）
//! - /api/characters/:id/images/:image_id                 DELETE  移除图片
//! - /api/characters/:id/images/:image_id/confirm         POST    确认上传
//! - /api/characters/:id/images/:image_id/fail            POST    标记上传失败
//! - /api/characters/:id/images/:image_id/url             GET     获取读取地址
//! - /api/images/:image_id/upload?expires=&signature=     PUT     签名上传
//! - /api/images/:image_id/content                        GET     读取图片内容
//! - /api/pronouns                                        GET     代词目录
//! - /api/pronouns                                        POST    新增代词组
//! - /api/pronouns/:id                                    GET     代词组详情
//!
//! 写操作需要 `X-User-Id` 请求头

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/characters", character_routes())
        .nest("/images", image_routes())
        .nest("/pronouns", pronoun_routes())
}

/// Character 路由
fn character_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(handlers::create_character).get(handlers::list_characters),
        )
        .route(
            "/:id",
            get(handlers::get_character)
                .put(handlers::update_character)
                .delete(handlers::delete_character),
        )
        .route("/:id/pronouns", post(handlers::add_character_pronoun))
        .route("/:id/pronouns/remove", post(handlers::remove_character_pronoun))
        .route("/:id/images", post(handlers::add_character_image))
        .route(
            "/:id/images/:image_id",
            delete(handlers::remove_character_image),
        )
        .route(
            "/:id/images/:image_id/confirm",
            post(handlers::confirm_image_upload),
        )
        .route("/:id/images/:image_id/fail", post(handlers::mark_image_failed))
        .route("/:id/images/:image_id/url", get(handlers::get_image_url))
}

/// Image content 路由
fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:image_id/upload", put(handlers::upload_image_content))
        .route("/:image_id/content", get(handlers::get_image_content))
}

/// Pronoun 路由
fn pronoun_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::list_pronouns).post(handlers::create_pronoun),
        )
        .route("/:id", get(handlers::get_pronoun))
}

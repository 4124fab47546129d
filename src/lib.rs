//! Charsite - 角色目录服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Character Context: 角色聚合（代词组、图片上传状态机、领域事件）
//! - Primitives: Entity / AggregateRoot / DomainError
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, ChangeStore, EventBus, ImageStorage）
//! - Unit of Work: 单事务提交，提交成功后发布领域事件
//! - Commands / Queries: CQRS 处理器
//! - Event Handlers: 图片存储清理
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: SQLite 存储
//! - Adapters: 文件系统图片存储
//! - Events: 进程内事件总线

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

//! Domain Primitives - 领域基础构件
//!
//! 所有限界上下文共享:
//! - DomainError / DomainResult: 带稳定错误码的业务失败
//! - Entity: 基于标识的相等性
//! - AggregateRoot / DomainEvents: 聚合根与待发布领域事件队列

mod aggregate_root;
mod entity;
mod error;

pub use aggregate_root::{AggregateRoot, DomainEvents};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};

/// 大小写不敏感的字符串比较（Unicode 小写折叠）
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

//! Domain Layer - 领域层
//!
//! - primitives: Entity / AggregateRoot / DomainError 等共享构件
//! - Character Context: 角色、代词组与图片

pub mod character;
pub mod primitives;

pub use primitives::{AggregateRoot, DomainError, DomainEvents, DomainResult, Entity};

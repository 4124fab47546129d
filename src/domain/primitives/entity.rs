//! Entity - 具有稳定标识的领域对象

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// 实体
///
/// 两个实体相等当且仅当标识相等，与其余属性无关。
/// 实现方的 `PartialEq` 应委托给 [`Entity::same_identity_as`]。
pub trait Entity {
    type Id: Copy + Eq + Hash + Debug + Display;

    fn id(&self) -> Self::Id;

    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

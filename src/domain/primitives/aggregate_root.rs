//! Aggregate Root - 聚合根与领域事件队列

use super::Entity;

/// 待发布的领域事件队列
///
/// 只能由所属聚合在校验通过后追加；由 Unit of Work 在提交时整体取出。
#[derive(Debug, Clone)]
pub struct DomainEvents<E> {
    pending: Vec<E>,
}

impl<E> DomainEvents<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub(crate) fn raise(&mut self, event: E) {
        self.pending.push(event);
    }

    pub fn as_slice(&self) -> &[E] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 取出全部事件（按追加顺序），队列清空
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }
}

impl<E> Default for DomainEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// 聚合根
///
/// 一致性边界：外部只能通过聚合根修改其自身及其拥有的子实体。
pub trait AggregateRoot: Entity {
    type Event: Clone;

    fn domain_events(&self) -> &[Self::Event];

    /// 取出并清空待发布事件
    fn take_domain_events(&mut self) -> Vec<Self::Event>;

    fn has_domain_events(&self) -> bool {
        !self.domain_events().is_empty()
    }
}

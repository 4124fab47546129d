//! Event Infrastructure
//!
//! 进程内领域事件总线

mod bus;

pub use bus::InProcessEventBus;

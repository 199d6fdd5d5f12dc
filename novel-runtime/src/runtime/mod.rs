//! # Runtime 模块
//!
//! 事件求值与执行引擎。
//!
//! ```text
//! AST → [Evaluator] → Event 列表 → [Queue] → 显示缓冲区 / 通知通道
//! ```

pub mod evaluator;
pub mod event;
pub mod queue;
pub mod text;

pub use evaluator::{Evaluator, Label, LabelMaster};
pub use event::{Event, SideEffect};
pub use queue::{Queue, QueueConfig};

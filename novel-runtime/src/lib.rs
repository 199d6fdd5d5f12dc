//! # novel-runtime
//!
//! 视觉小说脚本运行时核心库。
//!
//! ## 架构
//!
//! ```text
//! 脚本文本
//!    │
//!    ▼
//! [script]  Lexer → Parser → Program (AST)
//!    │
//!    ▼
//! [runtime] Evaluator（标签发现 / 事件降级）
//!    │
//!    ▼
//! [runtime] Queue（工作线程：逐字动画、阻塞等待、跳转）
//!    │
//!    ├─▶ 显示缓冲区（已折行，随时可读）
//!    └─▶ 通知通道（背景变更等副作用）
//! ```
//!
//! ## 脚本语言
//!
//! - `*名前` 开头的行定义标签，标签本体延伸到下一个标签或文件末尾
//! - 裸文本逐字显示；`[p]` 等待点击后清屏，`[l]` 等待点击后换行，
//!   `[r]` 直接换行
//! - `[image source="..."]` 背景变更，`[wait time="..."]` 定时等待，
//!   `[jump target="..."]` 标签跳转
//!
//! ## 快速上手
//!
//! ```ignore
//! let queue = novel_runtime::queue_from_text("*start\nこんにちは[p]")?;
//! queue.start()?;
//! queue.wait_for_settled();
//! println!("{}", queue.display());
//! ```

pub mod error;
pub mod runtime;
pub mod script;

pub use error::{EvalError, NovelError, NovelResult, SyntaxError};
pub use runtime::{Evaluator, Event, Queue, QueueConfig, SideEffect};
pub use script::{Lexer, Parser, Program};

/// 把脚本文本编译为求值器
///
/// 解析失败时返回收集到的全部语法错误。
pub fn compile(text: &str) -> NovelResult<Evaluator> {
    let mut parser = Parser::new(Lexer::new(text));
    let program = parser.parse_program().map_err(NovelError::Parse)?;
    Ok(Evaluator::new(&program))
}

/// 把脚本文本编译为带默认配置的事件队列
pub fn queue_from_text(text: &str) -> NovelResult<Queue> {
    Ok(Queue::new(compile(text)?))
}

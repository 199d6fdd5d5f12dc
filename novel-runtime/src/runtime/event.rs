//! # Event 模块
//!
//! 定义脚本降级后的可执行事件。
//!
//! ## 设计说明
//!
//! - 事件是封闭的 enum，执行分发依靠穷尽的模式匹配
//! - 每次 `play` 某个标签都会重新产出全新的事件，不在多次播放间复用
//! - 阻塞事件（Flush / LineEndWait）不会自动推进队列，需要外部 Advance；
//!   其余事件执行完毕后队列自动继续

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 可执行事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// 逐字显示正文
    MsgEmit(MsgEmit),
    /// 等待点击后清空缓冲区（阻塞）
    Flush,
    /// 等待点击后追加换行（阻塞）
    LineEndWait,
    /// 背景变更通知（只转发给宿主，不触碰文本缓冲区）
    ChangeBg(ChangeBg),
    /// 定时等待
    Wait(Wait),
    /// 跳转到其他标签
    Jump(Jump),
    /// 追加换行
    Newline,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::MsgEmit(m) => write!(f, "<MsgEmit {}>", m.body),
            Event::Flush => write!(f, "<Flush>"),
            Event::LineEndWait => write!(f, "<LineEndWait>"),
            Event::ChangeBg(c) => write!(f, "<ChangeBg {}>", c.source),
            Event::Wait(w) => write!(f, "<Wait {}ms>", w.duration.as_millis()),
            Event::Jump(j) => write!(f, "<Jump {}>", j.target),
            Event::Newline => write!(f, "<Newline>"),
        }
    }
}

/// 逐字显示正文
///
/// 有「文字滚动中」和「显示完毕」两种状态。
/// 除正文外还持有一个一次性跳过信号，仅在执行期间使用，
/// 不属于事件的逻辑标识（相等比较只看正文）。
#[derive(Debug, Clone)]
pub struct MsgEmit {
    /// 解析器传来的显示对象字符串
    pub body: String,
    /// 跳过信号
    pub(crate) skip: Arc<SkipSignal>,
}

impl MsgEmit {
    /// 创建新的 MsgEmit
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            skip: Arc::new(SkipSignal::default()),
        }
    }
}

impl PartialEq for MsgEmit {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

/// 背景变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBg {
    /// 图像来源。对核心来说是不透明字符串，由外部渲染器解析
    pub source: String,
}

/// 定时等待
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wait {
    /// 等待时长
    pub duration: Duration,
}

/// 标签跳转
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jump {
    /// 跳转目标标签名
    pub target: String,
}

/// 需要宿主自行实现的事件通知
///
/// 文本类事件会被转换进显示缓冲区，不会出现在这里。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// 背景变更
    ChangeBg(ChangeBg),
}

/// 一次性跳过信号
///
/// 单发契约：`fire` 可以被调用任意次（幂等），但 `take` 对一次点火
/// 至多观测到一次 `true`。动画循环在每个字符之间做非阻塞检查，
/// 避免「完成」与「跳过」竞争导致的重复推进或丢失唤醒。
#[derive(Debug, Default)]
pub(crate) struct SkipSignal {
    fired: AtomicBool,
}

impl SkipSignal {
    /// 点火。已完成的动画收到点火是 no-op
    pub(crate) fn fire(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }

    /// 观测并消费信号
    pub(crate) fn take(&self) -> bool {
        self.fired.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(
            Event::MsgEmit(MsgEmit::new("こんにちは")).to_string(),
            "<MsgEmit こんにちは>"
        );
        assert_eq!(Event::Flush.to_string(), "<Flush>");
        assert_eq!(Event::LineEndWait.to_string(), "<LineEndWait>");
        assert_eq!(
            Event::ChangeBg(ChangeBg {
                source: "test.png".to_string(),
            })
            .to_string(),
            "<ChangeBg test.png>"
        );
        assert_eq!(
            Event::Wait(Wait {
                duration: Duration::from_millis(100),
            })
            .to_string(),
            "<Wait 100ms>"
        );
        assert_eq!(
            Event::Jump(Jump {
                target: "start".to_string(),
            })
            .to_string(),
            "<Jump start>"
        );
        assert_eq!(Event::Newline.to_string(), "<Newline>");
    }

    #[test]
    fn test_msg_emit_equality_ignores_signal() {
        let a = MsgEmit::new("同じ");
        let b = MsgEmit::new("同じ");
        a.skip.fire();
        assert_eq!(a, b);
    }

    #[test]
    fn test_skip_signal_single_fire() {
        let sig = SkipSignal::default();
        assert!(!sig.take());

        sig.fire();
        sig.fire(); // 重复点火是幂等的
        assert!(sig.take());
        assert!(!sig.take()); // 一次点火至多观测一次
    }
}

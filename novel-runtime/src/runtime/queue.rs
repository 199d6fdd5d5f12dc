//! # Queue 模块
//!
//! 事件队列与工作线程：逐字显示动画、阻塞等待、标签跳转。
//!
//! ## 设计说明
//!
//! - 控制消息（加载标签、推进）通过 mpsc 通道发给唯一的工作线程，
//!   工作线程按顺序执行事件，遇到阻塞事件停下等待下一条推进消息
//! - 推进恰好消费一个阻塞点：阻塞状态用 `Option` 持有，`take` 后
//!   执行其副作用（Flush 清空缓冲区，LineEndWait 追加换行）再继续排空
//! - 动画期间的推进走另一条路径：不经过通道，直接点火共享的跳过信号，
//!   工作线程在下一个字符前观测到信号并一次性补完剩余文本
//! - 副作用（背景变更）通过有界通知通道送出，通道满时丢弃并告警，
//!   绝不阻塞工作线程

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::error::EvalError;
use crate::runtime::evaluator::Evaluator;
use crate::runtime::event::{Event, MsgEmit, SideEffect, SkipSignal};
use crate::runtime::text::auto_newline;

/// 入口标签名
pub const START_LABEL: &str = "start";

/// 通知通道容量。满了之后新通知被丢弃而不是阻塞工作线程
const NOTIFY_CAPACITY: usize = 1024;

/// 一次排空中允许的连续跳转上限
///
/// 中间没有任何阻塞点的跳转链超过此数即视为死循环脚本，
/// 记录错误并停止排空，保证工作线程始终可以退出。
const MAX_CHAINED_JUMPS: usize = 64;

/// 队列行为配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// 逐字显示时相邻字符之间的间隔
    pub message_speed: Duration,
    /// 自动换行宽度（按字符数计）。0 表示不换行
    pub wrap_width: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            message_speed: Duration::from_millis(20),
            wrap_width: 24,
        }
    }
}

/// 控制消息
enum Ctrl {
    /// 加载指定标签并开始排空
    Load(String),
    /// 消费当前阻塞点
    Advance,
}

/// 工作线程当前停在哪种阻塞事件上
enum Blocker {
    /// `[p]`：推进时清空缓冲区
    Flush,
    /// `[l]`：推进时追加换行
    LineEndWait,
}

/// 取锁。锁中毒时照常接管数据，不向外传播 panic
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 静止计数器
///
/// 每发出一条控制消息计数加一，工作线程每处理完一条减一。
/// 计数归零即「静止」：没有在途的控制消息。
#[derive(Debug, Default)]
struct SettleGate {
    count: Mutex<u32>,
    cv: Condvar,
}

impl SettleGate {
    fn add(&self) {
        *lock(&self.count) += 1;
    }

    fn done(&self) {
        let mut count = lock(&self.count);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.cv.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = lock(&self.count);
        while *count > 0 {
            count = self
                .cv
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// 调用方与工作线程的共享状态
#[derive(Debug, Default)]
struct Shared {
    /// 显示缓冲区（已折行）
    buf: Mutex<String>,
    /// 进行中动画的跳过信号。无动画时为 None
    anim: Mutex<Option<Arc<SkipSignal>>>,
    /// 当前标签名
    current_label: Mutex<String>,
    /// 降级与执行过程中积累的错误
    errors: Mutex<Vec<EvalError>>,
    /// 静止计数器
    settle: SettleGate,
}

/// 事件队列
///
/// 持有工作线程与通往它的控制通道。Drop 时关闭通道并等待线程退出。
pub struct Queue {
    evaluator: Evaluator,
    shared: Arc<Shared>,
    ctrl_tx: Option<Sender<Ctrl>>,
    notify_rx: Receiver<SideEffect>,
    worker: Option<JoinHandle<()>>,
}

impl Queue {
    /// 用默认配置创建队列并启动工作线程
    pub fn new(evaluator: Evaluator) -> Self {
        Self::with_config(evaluator, QueueConfig::default())
    }

    /// 用指定配置创建队列并启动工作线程
    pub fn with_config(evaluator: Evaluator, config: QueueConfig) -> Self {
        let shared = Arc::new(Shared::default());
        let (ctrl_tx, ctrl_rx) = mpsc::channel();
        let (notify_tx, notify_rx) = mpsc::sync_channel(NOTIFY_CAPACITY);

        let worker = Worker {
            evaluator: evaluator.clone(),
            shared: Arc::clone(&shared),
            notify_tx,
            pending: VecDeque::new(),
            blocked: None,
            config,
        };
        let handle = thread::spawn(move || worker.run(ctrl_rx));

        Self {
            evaluator,
            shared,
            ctrl_tx: Some(ctrl_tx),
            notify_rx,
            worker: Some(handle),
        }
    }

    /// 从入口标签开始播放
    pub fn start(&self) -> Result<(), EvalError> {
        self.play(START_LABEL)
    }

    /// 播放指定标签
    ///
    /// 标签不存在时同步返回 `LabelNotFound`，不打扰工作线程。
    pub fn play(&self, label: &str) -> Result<(), EvalError> {
        if !self.evaluator.master().contains(label) {
            return Err(EvalError::LabelNotFound(label.to_string()));
        }
        self.send(Ctrl::Load(label.to_string()));
        Ok(())
    }

    /// 推进
    ///
    /// 动画进行中时等价于跳过；否则消费当前阻塞点。
    /// 既无动画也无阻塞点时是 no-op。
    ///
    /// 工作线程正在执行非动画事件（如定时等待）期间到来的推进
    /// 不会被丢弃：它排在控制通道里，待工作线程停到下一个阻塞点时
    /// 被消费。
    pub fn advance(&self) {
        {
            let anim = lock(&self.shared.anim);
            if let Some(signal) = anim.as_ref() {
                signal.fire();
                return;
            }
        }
        self.send(Ctrl::Advance);
    }

    /// 跳过当前动画。无动画时是 no-op
    pub fn skip(&self) {
        let anim = lock(&self.shared.anim);
        if let Some(signal) = anim.as_ref() {
            signal.fire();
        }
    }

    /// 当前显示缓冲区的快照（已折行）
    pub fn display(&self) -> String {
        lock(&self.shared.buf).clone()
    }

    /// 当前标签名。尚未加载任何标签时为空字符串
    pub fn current_label(&self) -> String {
        lock(&self.shared.current_label).clone()
    }

    /// 是否有逐字动画正在进行
    pub fn is_animating(&self) -> bool {
        lock(&self.shared.anim).is_some()
    }

    /// 到目前为止积累的运行期错误快照
    pub fn runtime_errors(&self) -> Vec<EvalError> {
        lock(&self.shared.errors).clone()
    }

    /// 阻塞直到所有在途控制消息处理完毕
    pub fn wait_for_settled(&self) {
        self.shared.settle.wait();
    }

    /// 非阻塞地取一条通知
    pub fn poll_notification(&self) -> Option<SideEffect> {
        self.notify_rx.try_recv().ok()
    }

    /// 限时阻塞地取一条通知
    pub fn recv_notification_timeout(&self, timeout: Duration) -> Option<SideEffect> {
        self.notify_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, ctrl: Ctrl) {
        // ctrl_tx 只在 Drop 中被取走，正常使用期间总是 Some
        let Some(tx) = self.ctrl_tx.as_ref() else {
            return;
        };
        self.shared.settle.add();
        if tx.send(ctrl).is_err() {
            warn!("工作线程已退出，控制消息被丢弃");
            self.shared.settle.done();
        }
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        // 先断开通道让工作线程的 recv 返回 Err，再等它退出
        drop(self.ctrl_tx.take());
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

/// 工作线程本体
struct Worker {
    evaluator: Evaluator,
    shared: Arc<Shared>,
    notify_tx: SyncSender<SideEffect>,
    /// 待执行事件，加载或跳转时整体替换
    pending: VecDeque<Event>,
    /// 当前停住的阻塞事件
    blocked: Option<Blocker>,
    config: QueueConfig,
}

impl Worker {
    fn run(mut self, ctrl_rx: Receiver<Ctrl>) {
        loop {
            let ctrl = match ctrl_rx.recv() {
                Ok(ctrl) => ctrl,
                // 通道关闭即队列被丢弃
                Err(_) => break,
            };
            match ctrl {
                Ctrl::Load(label) => {
                    if self.load_label(&label) {
                        self.drain();
                    }
                }
                Ctrl::Advance => self.advance(),
            }
            self.shared.settle.done();
        }
        debug!("工作线程退出");
    }

    /// 降级标签本体并整体替换待执行队列
    fn load_label(&mut self, label: &str) -> bool {
        match self.evaluator.lower(label) {
            Ok(lowered) => {
                if !lowered.errors.is_empty() {
                    warn!("标签 '{}' 降级时记录 {} 个错误", label, lowered.errors.len());
                    lock(&self.shared.errors).extend(lowered.errors);
                }
                self.pending = lowered.events.into();
                self.blocked = None;
                *lock(&self.shared.current_label) = label.to_string();
                debug!("加载标签 '{}'，{} 个事件", label, self.pending.len());
                true
            }
            Err(e) => {
                warn!("加载标签失败: {}", e);
                lock(&self.shared.errors).push(e);
                false
            }
        }
    }

    /// 消费当前阻塞点并继续排空
    fn advance(&mut self) {
        match self.blocked.take() {
            Some(Blocker::Flush) => {
                lock(&self.shared.buf).clear();
                self.drain();
            }
            Some(Blocker::LineEndWait) => {
                lock(&self.shared.buf).push('\n');
                self.drain();
            }
            None => debug!("没有可消费的阻塞点，推进被忽略"),
        }
    }

    /// 依次执行待执行事件，直到碰到阻塞事件或队列耗尽
    fn drain(&mut self) {
        let mut chained_jumps = 0usize;
        loop {
            let Some(event) = self.pending.pop_front() else {
                debug!("事件队列耗尽");
                return;
            };
            match event {
                Event::MsgEmit(msg) => self.animate(msg),
                Event::Flush => {
                    self.blocked = Some(Blocker::Flush);
                    return;
                }
                Event::LineEndWait => {
                    self.blocked = Some(Blocker::LineEndWait);
                    return;
                }
                Event::Newline => lock(&self.shared.buf).push('\n'),
                Event::ChangeBg(bg) => {
                    if self.notify_tx.try_send(SideEffect::ChangeBg(bg)).is_err() {
                        warn!("通知通道已满，背景变更通知被丢弃");
                    }
                }
                Event::Wait(wait) => thread::sleep(wait.duration),
                Event::Jump(jump) => {
                    chained_jumps += 1;
                    if chained_jumps > MAX_CHAINED_JUMPS {
                        warn!("连续跳转超过 {MAX_CHAINED_JUMPS} 次，在 '{}' 处停止", jump.target);
                        lock(&self.shared.errors).push(EvalError::JumpLoop(jump.target));
                        self.pending.clear();
                        return;
                    }
                    // 跳转整体替换队列后继续排空；失败只记录错误
                    self.load_label(&jump.target);
                }
            }
        }
    }

    /// 逐字追加正文到显示缓冲区
    ///
    /// 每个字符之前观测一次跳过信号，点火后一次性补完剩余文本。
    fn animate(&mut self, msg: MsgEmit) {
        let signal = Arc::clone(&msg.skip);
        *lock(&self.shared.anim) = Some(Arc::clone(&signal));

        let runes: Vec<char> = msg.body.chars().collect();
        for (i, rune) in runes.iter().enumerate() {
            if signal.take() {
                let rest: String = runes[i..].iter().collect();
                let mut buf = lock(&self.shared.buf);
                buf.push_str(&rest);
                let wrapped = auto_newline(&buf, self.config.wrap_width);
                *buf = wrapped;
                break;
            }
            {
                let mut buf = lock(&self.shared.buf);
                buf.push(*rune);
                let wrapped = auto_newline(&buf, self.config.wrap_width);
                *buf = wrapped;
            }
            if i + 1 < runes.len() {
                thread::sleep(self.config.message_speed);
            }
        }

        *lock(&self.shared.anim) = None;
    }
}

// fmt::Debug 需要避开 Receiver 字段
impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("current_label", &self.current_label())
            .field("is_animating", &self.is_animating())
            .finish_non_exhaustive()
    }
}

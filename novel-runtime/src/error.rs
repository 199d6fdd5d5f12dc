//! # Error 模块
//!
//! 定义 novel-runtime 中使用的错误类型。
//!
//! ## 传播策略
//!
//! - 编译期错误（解析）同步返回给 `parse_program` 的调用方，按列表收集
//! - 求值 / 运行期错误在内部累积、可查询，不跨 worker 边界抛出
//!   （worker 不能因为单个坏事件而停止排空队列）

use thiserror::Error;

use crate::script::token::TokenType;

/// 语法错误
///
/// 解析过程中收集为列表；只要存在一个，整体解析即告失败。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// Token 种类不符合预期（缺少 `=`、缺少带引号的值等）
    #[error("期望下一个 token 是 {expected}，实际是 {actual}")]
    UnexpectedToken {
        /// 期望的 Token 种类
        expected: TokenType,
        /// 实际的 Token 种类
        actual: TokenType,
    },

    /// 命令在 EOF 之前没有对应的闭括号 `]`
    #[error("命令 '{command}' 缺少闭括号 ']'，已到达输入末尾")]
    UnterminatedCommand {
        /// 未闭合的命令名
        command: String,
    },

    /// 当前 Token 没有对应的解析规则
    #[error("token {0} 没有对应的解析规则")]
    NoParseRule(TokenType),
}

/// 求值错误
///
/// `LabelNotFound` 由 `play` / `lower` 同步返回；
/// 其余变体是命令降级错误，记录后丢弃出错的事件，继续求值。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// 指定的标签不存在
    #[error("标签 '{0}' 不存在")]
    LabelNotFound(String),

    /// 无法识别的命令名
    #[error("未知命令 '{0}'")]
    UnknownCommand(String),

    /// 命令缺少必需参数
    #[error("命令 '{command}' 缺少参数 '{param}'")]
    MissingParameter {
        /// 命令名
        command: String,
        /// 缺少的参数名
        param: String,
    },

    /// `wait` 的时长无法解析为整数毫秒
    #[error("无法将 '{0}' 解析为毫秒整数")]
    InvalidDuration(String),

    /// 连续跳转超过上限（中间没有任何阻塞点的跳转死循环）
    #[error("连续跳转超过上限，在标签 '{0}' 处停止")]
    JumpLoop(String),
}

/// novel-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NovelError {
    /// 解析错误（收集到的全部语法错误）
    #[error("脚本解析失败，共 {} 个语法错误", .0.len())]
    Parse(Vec<SyntaxError>),

    /// 求值错误
    #[error("求值错误: {0}")]
    Eval(#[from] EvalError),
}

/// Result 类型别名
pub type NovelResult<T> = Result<T, NovelError>;

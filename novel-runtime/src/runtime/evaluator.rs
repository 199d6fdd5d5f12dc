//! # Evaluator 模块
//!
//! 遍历 AST，发现标签并将标签本体降级为事件列表。
//!
//! ## 设计说明
//!
//! - `Evaluator::new` 对整个 Program 只做一次发现遍历：登记所有标签，
//!   其余产物全部丢弃
//! - `lower(label)` 每次都重新遍历该标签的本体，产出全新的事件列表
//! - 单个命令降级失败（未知命令、参数问题）不使整体失败：
//!   记录错误、丢弃该事件，继续处理后续语句

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::EvalError;
use crate::runtime::event::{ChangeBg, Event, Jump, MsgEmit, Wait};
use crate::script::ast::{BlockStatement, CmdLiteral, Expression, Program};

/// 刷新（清空缓冲区）命令
pub const CMD_FLUSH: &str = "p";
/// 行尾等待命令
pub const CMD_LINE_END_WAIT: &str = "l";
/// 换行命令
pub const CMD_NEWLINE: &str = "r";
/// 背景变更命令
pub const CMD_IMAGE: &str = "image";
/// 定时等待命令
pub const CMD_WAIT: &str = "wait";
/// 标签跳转命令
pub const CMD_JUMP: &str = "jump";

/// 标签：脚本中可独立播放的命名区段
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// 标签名（区分大小写）
    pub name: String,
    /// 标签本体
    pub body: BlockStatement,
}

/// 标签表
///
/// 用 Vec 保存定义顺序，同时可以按名字检索。
/// 重复定义同名标签是 no-op（首次定义生效），
/// 因此迭代顺序确定、无重复，与脚本中的定义顺序一致。
#[derive(Debug, Clone, Default)]
pub struct LabelMaster {
    labels: Vec<Label>,
    index: HashMap<String, usize>,
}

impl LabelMaster {
    /// 登记标签。同名标签的后续定义被忽略
    pub fn add_label(&mut self, label: Label) {
        if !self.index.contains_key(&label.name) {
            self.index.insert(label.name.clone(), self.labels.len());
            self.labels.push(label);
        }
    }

    /// 按名字检索标签
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.index.get(name).map(|&i| &self.labels[i])
    }

    /// 标签是否存在
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按定义顺序返回所有标签名
    pub fn names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }

    /// 标签数量
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 降级结果
///
/// 出错的命令被丢弃并记录在 `errors` 中，其余事件照常产出。
#[derive(Debug)]
pub struct Lowered {
    /// 按源码顺序排列的事件
    pub events: Vec<Event>,
    /// 降级过程中记录的错误
    pub errors: Vec<EvalError>,
}

/// 求值器
///
/// 持有不可变的标签表，可以廉价克隆后交给执行引擎。
#[derive(Debug, Clone)]
pub struct Evaluator {
    master: Arc<LabelMaster>,
}

impl Evaluator {
    /// 发现遍历：登记 Program 中的所有标签
    ///
    /// 标签之外的顶层语句只存在于发现遍历中，其产物被丢弃。
    pub fn new(program: &Program) -> Self {
        let mut master = LabelMaster::default();
        for stmt in &program.statements {
            if let Expression::Label(label) = &stmt.expression {
                master.add_label(Label {
                    name: label.name.value.clone(),
                    body: label.body.clone(),
                });
            }
        }
        Self {
            master: Arc::new(master),
        }
    }

    /// 标签表的访问器
    pub fn master(&self) -> &LabelMaster {
        &self.master
    }

    /// 按定义顺序返回所有标签名
    pub fn label_names(&self) -> Vec<String> {
        self.master.names().iter().map(|s| s.to_string()).collect()
    }

    /// 将指定标签的本体降级为事件列表
    ///
    /// 标签不存在时返回 `LabelNotFound`。每次调用都产出全新的事件。
    pub fn lower(&self, label: &str) -> Result<Lowered, EvalError> {
        let label = self
            .master
            .get(label)
            .ok_or_else(|| EvalError::LabelNotFound(label.to_string()))?;

        let mut events = Vec::new();
        let mut errors = Vec::new();
        for stmt in &label.body.statements {
            match &stmt.expression {
                Expression::Text(t) => events.push(Event::MsgEmit(MsgEmit::new(&t.value))),
                Expression::Cmd(c) => match lower_cmd(c) {
                    Ok(event) => events.push(event),
                    Err(e) => errors.push(e),
                },
                // 解析器保证块中不会出现标签定义
                Expression::Label(_) => {}
            }
        }

        Ok(Lowered { events, errors })
    }
}

/// 按命令名将单个括号命令降级为事件
fn lower_cmd(cmd: &CmdLiteral) -> Result<Event, EvalError> {
    match cmd.func_name.value.as_str() {
        CMD_FLUSH => Ok(Event::Flush),
        CMD_LINE_END_WAIT => Ok(Event::LineEndWait),
        CMD_NEWLINE => Ok(Event::Newline),
        CMD_IMAGE => {
            let source = require_param(cmd, "source")?;
            Ok(Event::ChangeBg(ChangeBg {
                source: source.to_string(),
            }))
        }
        CMD_WAIT => {
            let time = require_param(cmd, "time")?;
            let millis: u64 = time
                .parse()
                .map_err(|_| EvalError::InvalidDuration(time.to_string()))?;
            Ok(Event::Wait(Wait {
                duration: Duration::from_millis(millis),
            }))
        }
        CMD_JUMP => {
            let target = require_param(cmd, "target")?;
            Ok(Event::Jump(Jump {
                target: target.to_string(),
            }))
        }
        other => Err(EvalError::UnknownCommand(other.to_string())),
    }
}

/// 取必需参数，缺失时报错
fn require_param<'a>(cmd: &'a CmdLiteral, param: &str) -> Result<&'a str, EvalError> {
    cmd.params.get(param).ok_or_else(|| EvalError::MissingParameter {
        command: cmd.func_name.value.clone(),
        param: param.to_string(),
    })
}

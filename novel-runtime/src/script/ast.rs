//! # AST 模块
//!
//! 定义脚本的抽象语法树（Abstract Syntax Tree）。
//!
//! ## 设计说明
//!
//! AST 是解析器的输出。求值器读取 AST 并产生 Event。
//!
//! - 节点以封闭的 enum 表示，分发依靠穷尽的模式匹配
//! - 节点一经构建不再修改，所有权是一棵简单的树
//!   （Program 拥有 Statement，Statement 拥有 Expression），无环
//! - `Display` 实现将节点还原为近似源码的形式，便于调试

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 程序。解析器生成的所有 AST 的根节点
///
/// 语句顺序与源码顺序一致。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// 顶层语句列表
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// 语句
///
/// 本脚本语言只有表达式语句一种语句形式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// 语句持有的表达式
    pub expression: Expression,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// 表达式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// 正文文本
    Text(TextLiteral),
    /// 括号命令
    Cmd(CmdLiteral),
    /// 标签定义
    Label(LabelLiteral),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Text(t) => write!(f, "{t}"),
            Expression::Cmd(c) => write!(f, "{c}"),
            Expression::Label(l) => write!(f, "{l}"),
        }
    }
}

/// 正文文本字面量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLiteral {
    /// 显示内容
    pub value: String,
}

impl fmt::Display for TextLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// 标识符（命令名、参数名、标签名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// 标识符内容
    pub value: String,
}

impl Identifier {
    /// 创建标识符
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// 命名参数集合
///
/// 键唯一，值始终是原始字符串。所有类型化（如时长解析）都发生在下游。
/// 键的插入顺序无意义，用 BTreeMap 保证遍历顺序确定。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedParams {
    /// 参数名 → 参数值
    pub map: BTreeMap<String, String>,
}

impl NamedParams {
    /// 取参数值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }
}

impl fmt::Display for NamedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.map {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{k}=\"{v}\"")?;
            first = false;
        }
        Ok(())
    }
}

/// 括号命令字面量
///
/// 对应 `[cmd key="value" ...]` 语法。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmdLiteral {
    /// 命令名
    pub func_name: Identifier,
    /// 命名参数
    pub params: NamedParams,
}

impl fmt::Display for CmdLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.func_name)?;
        if !self.params.map.is_empty() {
            write!(f, " {}", self.params)?;
        }
        write!(f, "]")
    }
}

/// 标签的本体块
///
/// 从标签头之后到下一个标签定义（或 EOF）之前的语句列表。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    /// 块内语句列表
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// 标签定义
///
/// 对应 `*name\n ...` 语法。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLiteral {
    /// 标签名
    pub name: Identifier,
    /// 标签本体
    pub body: BlockStatement,
}

impl fmt::Display for LabelLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*{}\n{}", self.name, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_stmt(value: &str) -> Statement {
        Statement {
            expression: Expression::Text(TextLiteral {
                value: value.to_string(),
            }),
        }
    }

    #[test]
    fn test_program_display() {
        let mut params = NamedParams::default();
        params.map.insert("source".to_string(), "test.png".to_string());

        let program = Program {
            statements: vec![
                text_stmt("こんにちは"),
                Statement {
                    expression: Expression::Cmd(CmdLiteral {
                        func_name: Identifier::new("image"),
                        params,
                    }),
                },
            ],
        };

        assert_eq!(program.to_string(), "こんにちは[image source=\"test.png\"]");
    }

    #[test]
    fn test_label_display() {
        let label = LabelLiteral {
            name: Identifier::new("start"),
            body: BlockStatement {
                statements: vec![text_stmt("本文")],
            },
        };
        assert_eq!(label.to_string(), "*start\n本文");
    }

    #[test]
    fn test_cmd_without_params_display() {
        let cmd = CmdLiteral {
            func_name: Identifier::new("p"),
            params: NamedParams::default(),
        };
        assert_eq!(cmd.to_string(), "[p]");
    }

    #[test]
    fn test_program_serialization_roundtrip() {
        let program = Program {
            statements: vec![text_stmt("あいう")],
        };
        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(program, back);
    }
}

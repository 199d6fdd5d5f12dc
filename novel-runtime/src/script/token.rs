//! # Token 模块
//!
//! 定义词法分析器输出的 Token 类型。
//!
//! ## 设计说明
//!
//! - Token 是不可变数据，由词法分析器按需逐个产出
//! - 括号内外的词法规则不同（见 `lexer` 模块），但 Token 本身不携带模式信息

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token 种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// 无法识别的字符
    Illegal,
    /// 输入结束。到达末尾后会被无限返回
    Eof,

    /// 正文文本。括号外的连续字符串（支持多字节文字）
    Text,
    /// 标识符。括号内的裸单词（命令名、参数名）
    Ident,
    /// 字符串字面量。括号内的双引号内容（引号已剥离）
    Str,

    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `=`
    Equal,
    /// `*`（标签定义的起始记号）
    Asterisk,
    /// `\n`。换行是有意义的 Token（标签头定界、语句分隔），不作为空白吞掉
    Newline,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::Text => "TEXT",
            TokenType::Ident => "IDENT",
            TokenType::Str => "STRING",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::Equal => "=",
            TokenType::Asterisk => "*",
            TokenType::Newline => "NEWLINE",
        };
        write!(f, "{s}")
    }
}

/// 词法单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 种类
    pub token_type: TokenType,
    /// 原文字面量（STRING 类型已剥离引号）
    pub literal: String,
}

impl Token {
    /// 创建新 Token
    pub fn new(token_type: TokenType, literal: impl Into<String>) -> Self {
        Self {
            token_type,
            literal: literal.into(),
        }
    }

    /// 创建 EOF Token
    pub fn eof() -> Self {
        Self::new(TokenType::Eof, "")
    }

    /// 判断 Token 种类
    pub fn is(&self, t: TokenType) -> bool {
        self.token_type == t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let tok = Token::new(TokenType::Text, "こんにちは");
        assert!(tok.is(TokenType::Text));
        assert_eq!(tok.literal, "こんにちは");

        let eof = Token::eof();
        assert!(eof.is(TokenType::Eof));
        assert_eq!(eof.literal, "");
    }

    #[test]
    fn test_token_type_display() {
        assert_eq!(TokenType::LBracket.to_string(), "[");
        assert_eq!(TokenType::Newline.to_string(), "NEWLINE");
        assert_eq!(TokenType::Str.to_string(), "STRING");
    }
}

//! # Lexer 模块
//!
//! 将脚本原文转换为 Token 流。
//!
//! ## 词法规则
//!
//! 词法分析器有两种模式，由 `[` / `]` 切换：
//!
//! - **括号外**：`*` 为 ASTERISK，`\n` 为 NEWLINE，其余连续字符
//!   （到下一个 `[`、`*`、换行为止）作为一个 TEXT
//! - **括号内**：裸单词为 IDENT，`=` 为 EQUAL，双引号内容为 STRING
//!   （引号剥离），空白跳过
//!
//! 词法分析永不失败：无法识别的单字符作为 ILLEGAL 产出。
//! 到达输入末尾后，`next_token` 无限返回 EOF。

use crate::script::token::{Token, TokenType};

/// 词法分析器
///
/// 按需逐个产出 Token，不做回溯。
pub struct Lexer {
    /// 输入字符序列（以字符为单位，支持多字节文字）
    chars: Vec<char>,
    /// 当前读取位置
    pos: usize,
    /// 是否处于 `[...]` 内部
    in_bracket: bool,
}

impl Lexer {
    /// 创建新的词法分析器
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            in_bracket: false,
        }
    }

    /// 产出下一个 Token
    pub fn next_token(&mut self) -> Token {
        if self.in_bracket {
            self.skip_spaces();
        }

        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Token::eof(),
        };

        match ch {
            '[' => {
                self.advance();
                self.in_bracket = true;
                Token::new(TokenType::LBracket, "[")
            }
            ']' => {
                self.advance();
                self.in_bracket = false;
                Token::new(TokenType::RBracket, "]")
            }
            '\n' => {
                self.advance();
                Token::new(TokenType::Newline, "\n")
            }
            _ if self.in_bracket => self.bracket_token(ch),
            '*' => {
                self.advance();
                Token::new(TokenType::Asterisk, "*")
            }
            _ => self.text_token(),
        }
    }

    /// 括号内部的 Token
    fn bracket_token(&mut self, ch: char) -> Token {
        match ch {
            '=' => {
                self.advance();
                Token::new(TokenType::Equal, "=")
            }
            '"' => self.string_token(),
            _ if is_ident_char(ch) => self.ident_token(),
            _ => {
                self.advance();
                Token::new(TokenType::Illegal, ch.to_string())
            }
        }
    }

    /// 双引号字符串。返回时剥离引号本体
    fn string_token(&mut self) -> Token {
        self.advance(); // 开引号
        let mut literal = String::new();
        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance();
                break;
            }
            literal.push(ch);
            self.advance();
        }
        Token::new(TokenType::Str, literal)
    }

    /// 括号内的裸单词
    fn ident_token(&mut self) -> Token {
        let mut literal = String::new();
        while let Some(ch) = self.peek() {
            if !is_ident_char(ch) {
                break;
            }
            literal.push(ch);
            self.advance();
        }
        Token::new(TokenType::Ident, literal)
    }

    /// 括号外的正文。到下一个 `[`、`*`、换行为止
    fn text_token(&mut self) -> Token {
        let mut literal = String::new();
        while let Some(ch) = self.peek() {
            if ch == '[' || ch == '*' || ch == '\n' {
                break;
            }
            literal.push(ch);
            self.advance();
        }
        Token::new(TokenType::Text, literal)
    }

    /// 跳过空格和制表符（仅括号内使用）
    fn skip_spaces(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

/// 命令名 / 参数名允许的字符
fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

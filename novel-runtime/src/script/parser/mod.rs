//! # Parser 模块
//!
//! 运算符优先级（Pratt）风格的语法分析器。
//!
//! ## 设计说明
//!
//! 本语言只有两个优先级：LOWEST 和 CMD（括号命令比正文结合更紧），
//! 且没有中置运算符，因此前置解析按 Token 种类分发即可。
//!
//! - NEWLINE 是语句分隔信号，在语句层被跳过，不进入 AST
//! - 语法错误按列表累积，不是每个都立即致命；
//!   只要存在错误，`parse_program` 整体即告失败
//! - 命令内部出错时同步到 `]`、换行或 EOF，避免级联错误

#[cfg(test)]
mod tests;

use crate::error::SyntaxError;
use crate::script::ast::{
    BlockStatement, CmdLiteral, Expression, Identifier, LabelLiteral, NamedParams, Program,
    Statement, TextLiteral,
};
use crate::script::lexer::Lexer;
use crate::script::token::{Token, TokenType};

/// 语法分析器
///
/// 持有词法分析器，维护当前 / 下一个 Token 的二重预读。
pub struct Parser {
    lexer: Lexer,
    /// 当前 Token
    cur: Token,
    /// 下一个 Token
    peek: Token,
    /// 累积的语法错误
    errors: Vec<SyntaxError>,
}

impl Parser {
    /// 接收词法分析器并初始化
    pub fn new(lexer: Lexer) -> Self {
        let mut p = Self {
            lexer,
            cur: Token::eof(),
            peek: Token::eof(),
            errors: Vec::new(),
        };

        // 读入两个 Token，cur 和 peek 都被填充
        p.next_token();
        p.next_token();

        p
    }

    /// 累积错误的访问器
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// 开始解析。逐个消费 Token
    ///
    /// 只要记录过语法错误，整体即返回 `Err`（错误列表）。
    pub fn parse_program(&mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut program = Program::default();

        while !self.cur_is(TokenType::Eof) {
            // 换行是语句分隔符
            if self.cur_is(TokenType::Newline) {
                self.next_token();
                continue;
            }
            match self.parse_statement() {
                Some(stmt) => {
                    program.statements.push(stmt);
                    // 标签语句解析完毕时已停在下一个标签（或 EOF）上，不再前进
                    if !self.cur_is(TokenType::Asterisk) && !self.cur_is(TokenType::Eof) {
                        self.next_token();
                    }
                }
                None => self.next_token(),
            }
        }

        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(self.errors.clone())
        }
    }

    /// 解析一条语句（本语言只有表达式语句）
    fn parse_statement(&mut self) -> Option<Statement> {
        self.parse_expression()
            .map(|expression| Statement { expression })
    }

    /// 前置解析分发
    fn parse_expression(&mut self) -> Option<Expression> {
        match self.cur.token_type {
            TokenType::Text => Some(Expression::Text(TextLiteral {
                value: self.cur.literal.clone(),
            })),
            TokenType::LBracket => self.parse_cmd_literal().map(Expression::Cmd),
            TokenType::Asterisk => self.parse_label_literal().map(Expression::Label),
            t => {
                self.errors.push(SyntaxError::NoParseRule(t));
                None
            }
        }
    }

    /// 解析括号命令
    ///
    /// `[image source="test.png"]` / `[p]`
    ///
    /// `[` 之后紧跟命令名，然后重复读取 `name=value` 参数对直到 `]`。
    /// 每对参数要求依次出现 EQUAL、STRING；`]` 之前遇到 EOF 是硬错误。
    fn parse_cmd_literal(&mut self) -> Option<CmdLiteral> {
        // cur = '['
        if !self.expect_peek(TokenType::Ident) {
            self.synchronize();
            return None;
        }
        let func_name = Identifier::new(self.cur.literal.clone());
        let mut params = NamedParams::default();

        loop {
            if self.peek_is(TokenType::RBracket) {
                self.next_token();
                break;
            }
            if self.peek_is(TokenType::Eof) {
                // 对应的闭括号不存在，已到达末尾
                self.errors.push(SyntaxError::UnterminatedCommand {
                    command: func_name.value.clone(),
                });
                self.next_token();
                break;
            }

            // 参数名
            if !self.expect_peek(TokenType::Ident) {
                self.synchronize();
                break;
            }
            let key = self.cur.literal.clone();
            if !self.expect_peek(TokenType::Equal) {
                self.synchronize();
                break;
            }
            if !self.expect_peek(TokenType::Str) {
                self.synchronize();
                break;
            }
            params.map.insert(key, self.cur.literal.clone());
        }

        Some(CmdLiteral { func_name, params })
    }

    /// 解析标签定义
    ///
    /// `*name` 后要求换行，之后的块一直累积到下一个 ASTERISK 或 EOF
    /// （即一个标签的本体延伸到下一个标签定义之前）。
    fn parse_label_literal(&mut self) -> Option<LabelLiteral> {
        // cur = '*'，标签名以正文 Token 的形式跟在后面
        if !self.peek_is(TokenType::Text) {
            self.errors.push(SyntaxError::UnexpectedToken {
                expected: TokenType::Text,
                actual: self.peek.token_type,
            });
            return None;
        }
        self.next_token();
        let name = Identifier::new(self.cur.literal.trim().to_string());

        if !self.expect_peek(TokenType::Newline) {
            return None;
        }
        self.next_token();

        let body = self.parse_block_statement();
        Some(LabelLiteral { name, body })
    }

    /// 解析标签本体块。停在下一个 ASTERISK 或 EOF 上
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();

        while !self.cur_is(TokenType::Asterisk) && !self.cur_is(TokenType::Eof) {
            if self.cur_is(TokenType::Newline) {
                self.next_token();
                continue;
            }
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }

        block
    }

    /// 前进到下一个 Token
    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    /// 比较当前 Token 的种类
    fn cur_is(&self, t: TokenType) -> bool {
        self.cur.token_type == t
    }

    /// 比较下一个 Token 的种类
    fn peek_is(&self, t: TokenType) -> bool {
        self.peek.token_type == t
    }

    /// 检查 peek 的种类，只在种类正确时前进；否则记录错误
    fn expect_peek(&mut self, t: TokenType) -> bool {
        if self.peek_is(t) {
            self.next_token();
            true
        } else {
            self.errors.push(SyntaxError::UnexpectedToken {
                expected: t,
                actual: self.peek.token_type,
            });
            false
        }
    }

    /// 错误恢复：前进到 `]`、换行或 EOF
    fn synchronize(&mut self) {
        while !self.cur_is(TokenType::RBracket)
            && !self.cur_is(TokenType::Newline)
            && !self.cur_is(TokenType::Eof)
        {
            self.next_token();
        }
    }
}

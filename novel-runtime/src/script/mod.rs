//! # Script 模块
//!
//! 脚本编译前端：词法分析、语法分析与 AST。
//!
//! ```text
//! 原始文本 → [Lexer] → Token 流 → [Parser] → Program (AST)
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Program;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenType};

//! # Parser 测试

use super::*;

/// 解析辅助：成功时返回 Program
fn parse(input: &str) -> Program {
    let mut p = Parser::new(Lexer::new(input));
    p.parse_program().expect("解析应当成功")
}

/// 解析辅助：失败时返回错误列表
fn parse_err(input: &str) -> Vec<SyntaxError> {
    let mut p = Parser::new(Lexer::new(input));
    p.parse_program().expect_err("解析应当失败")
}

// -------------------------------------------------------------------------
// 正常系
// -------------------------------------------------------------------------

#[test]
fn test_parse_text_and_commands() {
    let program = parse("こんにちは[l]世界[p]");
    assert_eq!(program.statements.len(), 4);

    match &program.statements[0].expression {
        Expression::Text(t) => assert_eq!(t.value, "こんにちは"),
        other => panic!("期望正文，实际是 {other:?}"),
    }
    match &program.statements[1].expression {
        Expression::Cmd(c) => assert_eq!(c.func_name.value, "l"),
        other => panic!("期望命令，实际是 {other:?}"),
    }
    match &program.statements[2].expression {
        Expression::Text(t) => assert_eq!(t.value, "世界"),
        other => panic!("期望正文，实际是 {other:?}"),
    }
    match &program.statements[3].expression {
        Expression::Cmd(c) => assert_eq!(c.func_name.value, "p"),
        other => panic!("期望命令，实际是 {other:?}"),
    }
}

#[test]
fn test_parse_cmd_parameters() {
    let program = parse(r#"[image a="value1" b="value2" c="test.png"]"#);
    assert_eq!(program.statements.len(), 1);

    let Expression::Cmd(cmd) = &program.statements[0].expression else {
        panic!("期望命令");
    };
    assert_eq!(cmd.func_name.value, "image");
    assert_eq!(cmd.params.get("a"), Some("value1"));
    assert_eq!(cmd.params.get("b"), Some("value2"));
    assert_eq!(cmd.params.get("c"), Some("test.png"));
}

#[test]
fn test_newline_separates_statements() {
    let program = parse("hello\nworld\n");
    assert_eq!(program.statements.len(), 2);
    assert_eq!(program.statements[0].expression.to_string(), "hello");
    assert_eq!(program.statements[1].expression.to_string(), "world");
}

#[test]
fn test_parse_label_blocks() {
    let input = "*start\nあい[p]\n*second\nうえ";
    let program = parse(input);
    assert_eq!(program.statements.len(), 2);

    let Expression::Label(first) = &program.statements[0].expression else {
        panic!("期望标签");
    };
    assert_eq!(first.name.value, "start");
    // 本体：正文 + [p]。本体延伸到下一个标签之前
    assert_eq!(first.body.statements.len(), 2);

    let Expression::Label(second) = &program.statements[1].expression else {
        panic!("期望标签");
    };
    assert_eq!(second.name.value, "second");
    assert_eq!(second.body.statements.len(), 1);
}

#[test]
fn test_text_before_first_label_is_top_level() {
    let program = parse("プロローグ\n*start\n本文");
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(
        program.statements[0].expression,
        Expression::Text(_)
    ));
    assert!(matches!(
        program.statements[1].expression,
        Expression::Label(_)
    ));
}

#[test]
fn test_parse_full_scenario_snapshot() {
    let input = "*start\nこんにちは[l]世界[p]\n[image source=\"test.png\"]\n[wait time=\"100\"]\n*example1\nこれは[l]\n[jump target=\"start\"]";
    let program = parse(input);

    // Display 实现将 AST 还原为近似源码的形式
    insta::assert_snapshot!(
        program.to_string(),
        @r#"*start
こんにちは[l]世界[p][image source="test.png"][wait time="100"]*example1
これは[l][jump target="start"]"#
    );
}

#[test]
fn test_empty_label_body() {
    let program = parse("*start\n");
    let Expression::Label(label) = &program.statements[0].expression else {
        panic!("期望标签");
    };
    assert!(label.body.statements.is_empty());
}

// -------------------------------------------------------------------------
// 异常系
// -------------------------------------------------------------------------

#[test]
fn test_error_unterminated_bracket() {
    // 闭括号缺失时，恰好产生一个语法错误
    let errors = parse_err(r#"[example a="hello""#);
    assert_eq!(
        errors,
        vec![SyntaxError::UnterminatedCommand {
            command: "example".to_string(),
        }]
    );
    assert!(errors[0].to_string().contains("闭括号"));
}

#[test]
fn test_error_missing_equal() {
    let errors = parse_err(r#"[image source "test.png"]"#);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        SyntaxError::UnexpectedToken {
            expected: TokenType::Equal,
            ..
        }
    ));
}

#[test]
fn test_error_missing_quoted_value() {
    let errors = parse_err("[wait time=]");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        SyntaxError::UnexpectedToken {
            expected: TokenType::Str,
            actual: TokenType::RBracket,
        }
    ));
}

#[test]
fn test_error_label_requires_newline() {
    let errors = parse_err("*start");
    assert!(matches!(
        errors[0],
        SyntaxError::UnexpectedToken {
            expected: TokenType::Newline,
            ..
        }
    ));
}

#[test]
fn test_errors_accessor_accumulates() {
    let mut p = Parser::new(Lexer::new("[a=]\n[b=]"));
    let result = p.parse_program();
    assert!(result.is_err());
    // 两个坏命令，各记录一个错误，互不级联
    assert_eq!(p.errors().len(), 2);
}

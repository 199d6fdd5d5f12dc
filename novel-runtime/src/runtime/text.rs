//! # Text 模块
//!
//! 显示缓冲区的自动换行。

/// 查看最近一行，超过显示宽度就按字符数折行
///
/// 纯函数：只加工最后一行（之前的行保持原样），
/// 行尾不追加多余的折行符。宽度按字符（rune）计数，与字节数无关。
pub fn auto_newline(buf: &str, chunk_size: usize) -> String {
    if chunk_size == 0 {
        return buf.to_string();
    }

    let mut lines: Vec<&str> = buf.split('\n').collect();
    let last = lines.pop().unwrap_or("");

    let runes: Vec<char> = last.chars().collect();
    let mut latest_line = String::new();
    for (i, r) in runes.iter().enumerate() {
        latest_line.push(*r);
        // 恰好落在行末时不追加折行
        if (i + 1) % chunk_size == 0 && i + 1 != runes.len() {
            latest_line.push('\n');
        }
    }

    if lines.is_empty() {
        latest_line
    } else {
        format!("{}\n{}", lines.join("\n"), latest_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_newline() {
        assert_eq!(auto_newline("", 10), "");
        assert_eq!(auto_newline("あいうえ", 10), "あいうえ");
        assert_eq!(
            auto_newline("あいうえおかきくけこさしすせそ", 10),
            "あいうえおかきくけこ\nさしすせそ"
        );
        assert_eq!(
            auto_newline("あいうえお\nかきくけこさしすせそ", 5),
            "あいうえお\nかきくけこ\nさしすせそ"
        );
        assert_eq!(
            auto_newline("あいうえお\nかきくけこ\nさしすせそたちつてと", 5),
            "あいうえお\nかきくけこ\nさしすせそ\nたちつてと"
        );
        assert_eq!(auto_newline("abcdefghijklmno", 10), "abcdefghij\nklmno");
        assert_eq!(
            auto_newline("あいうえおかきくけこさしすせそ", 5),
            "あいうえお\nかきくけこ\nさしすせそ"
        );
    }

    #[test]
    fn test_auto_newline_exact_width_no_trailing_break() {
        // 最后一行恰好等于宽度时，不追加折行
        assert_eq!(auto_newline("abcde", 5), "abcde");
        assert_eq!(auto_newline("abcdeabcde", 5), "abcde\nabcde");
    }

    #[test]
    fn test_auto_newline_zero_width_is_noop() {
        assert_eq!(auto_newline("abc", 0), "abc");
    }
}

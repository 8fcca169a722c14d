pub mod str {
    use std::sync::LazyLock;

    use regex::Regex;

    static WHITESPACE_RUN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("whitespace run pattern"));
    static BLANK_LINE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*[\r\n]").expect("blank line pattern"));

    /// Replace the characters `&"<>` with their html entities.
    pub fn html_escape(data: &str) -> String {
        data.replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Collapse runs of whitespace into a single space and trim both ends.
    /// Applied to the enclosed text of every directive before keyword
    /// matching.
    pub fn collapse_whitespace(s: &str) -> String {
        WHITESPACE_RUN.replace_all(s, " ").trim().to_owned()
    }

    /// Remove all whitespace. Applied to output expressions and condition
    /// headers before parsing.
    pub fn strip_whitespace(s: &str) -> String {
        WHITESPACE_RUN.replace_all(s, "").into_owned()
    }

    /// Drop whitespace-only lines from rendered output. Cosmetic
    /// post-processing at the public render entry points, not a parsing
    /// rule.
    pub fn strip_blank_lines(s: &str) -> String {
        BLANK_LINE.replace_all(s, "").into_owned()
    }

    /// 1-based line and column of a byte offset, for error reporting.
    pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut col = 1;
        for (idx, c) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    #[cfg(test)]
    mod test {
        use crate::support::str::{
            collapse_whitespace, html_escape, line_col, strip_blank_lines, strip_whitespace,
        };

        #[test]
        fn test_html_escape() {
            assert_eq!(
                html_escape("<b>\"a\" & b</b>"),
                "&lt;b&gt;&quot;a&quot; &amp; b&lt;/b&gt;"
            );
            assert_eq!(html_escape("plain"), "plain");
        }

        #[test]
        fn test_collapse_whitespace() {
            assert_eq!(collapse_whitespace("  if \t a  ===  1 "), "if a === 1");
            assert_eq!(collapse_whitespace("foreach m in orders"), "foreach m in orders");
        }

        #[test]
        fn test_strip_whitespace() {
            assert_eq!(strip_whitespace(" name | plus ( 2 ) "), "name|plus(2)");
        }

        #[test]
        fn test_strip_blank_lines() {
            assert_eq!(strip_blank_lines("\n  \nhello\n\t\nworld\n"), "hello\nworld\n");
        }

        #[test]
        fn test_line_col() {
            let s = "ab\ncd\nef";
            assert_eq!(line_col(s, 0), (1, 1));
            assert_eq!(line_col(s, 4), (2, 2));
            assert_eq!(line_col(s, 7), (3, 2));
        }
    }
}

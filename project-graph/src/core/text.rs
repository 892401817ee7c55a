//! Source text helpers.

/// Remove `//` and `/* */` comments and the contents of string literals.
///
/// Quotes are kept (`"abc"` → `""`) and newlines survive, so identifiers
/// never merge across a removed region.
pub fn strip_comments_and_strings(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            '"' | '\'' => {
                out.push(c);
                let mut escaped = false;
                for n in chars.by_ref() {
                    if escaped {
                        escaped = false;
                        continue;
                    }
                    match n {
                        '\\' => escaped = true,
                        '\n' => {
                            // Unterminated literal; resume on the next line.
                            out.push('\n');
                            break;
                        }
                        q if q == c => {
                            out.push(q);
                            break;
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Lines `[from, to)` of `text` joined with `\n`, clamped to the text.
pub fn line_window(text: &str, from: usize, to: usize) -> String {
    text.lines()
        .skip(from)
        .take(to.saturating_sub(from))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let src = "a(); // b()\n/* c()\n d() */ e();";
        assert_eq!(strip_comments_and_strings(src), "a(); \n\n e();");
    }

    #[test]
    fn empties_string_literals() {
        let src = r#"log("call f() now"); x = 'it\'s g()';"#;
        assert_eq!(strip_comments_and_strings(src), r#"log(""); x = '';"#);
    }

    #[test]
    fn url_in_string_is_not_a_comment() {
        let src = r#"get("http://x"); run();"#;
        assert_eq!(strip_comments_and_strings(src), r#"get(""); run();"#);
    }

    #[test]
    fn window_is_clamped() {
        let text = "l0\nl1\nl2";
        assert_eq!(line_window(text, 1, 10), "l1\nl2");
        assert_eq!(line_window(text, 0, 1), "l0");
    }
}

//! Inline formatting scanner: bold, italic, strikethrough, inline code,
//! links, and images, matched in a fixed order so the bold/italic markers
//! never shadow each other.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Bold(String),
    Italic(String),
    Strike(String),
    Link { text: String, url: String },
    Image { alt: String, url: String },
}

/// Parse one line (or joined paragraph) of text into inline spans.
/// Unterminated markers fall through as literal text.
pub fn parse(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut pos = 0;

    while pos < chars.len() {
        if let Some((span, next)) = match_at(&chars, pos) {
            if !plain.is_empty() {
                spans.push(Inline::Text(std::mem::take(&mut plain)));
            }
            spans.push(span);
            pos = next;
        } else {
            plain.push(chars[pos]);
            pos += 1;
        }
    }

    if !plain.is_empty() {
        spans.push(Inline::Text(plain));
    }

    spans
}

/// Plain-text projection, used for heading slugs and TUI fallbacks.
pub fn plain_text(spans: &[Inline]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text(t)
            | Inline::Code(t)
            | Inline::Bold(t)
            | Inline::Italic(t)
            | Inline::Strike(t) => out.push_str(t),
            Inline::Link { text, .. } => out.push_str(text),
            Inline::Image { alt, .. } => out.push_str(alt),
        }
    }
    out
}

fn match_at(chars: &[char], pos: usize) -> Option<(Inline, usize)> {
    // Fixed precedence: code, image, link, bold, italic, strikethrough.
    if chars[pos] == '`' {
        if let Some((content, next)) = delimited(chars, pos, "`", "`") {
            return Some((Inline::Code(content), next));
        }
    }

    if chars[pos] == '!' && pos + 1 < chars.len() && chars[pos + 1] == '[' {
        if let Some((alt, url, next)) = bracket_pair(chars, pos + 1) {
            return Some((Inline::Image { alt, url }, next));
        }
    }

    if chars[pos] == '[' {
        if let Some((text, url, next)) = bracket_pair(chars, pos) {
            return Some((Inline::Link { text, url }, next));
        }
    }

    if starts_with(chars, pos, "**") {
        if let Some((content, next)) = delimited(chars, pos, "**", "**") {
            if flanked(&content) {
                return Some((Inline::Bold(content), next));
            }
        }
    }

    if chars[pos] == '*' {
        if let Some((content, next)) = delimited(chars, pos, "*", "*") {
            if flanked(&content) {
                return Some((Inline::Italic(content), next));
            }
        }
    }

    if starts_with(chars, pos, "~~") {
        if let Some((content, next)) = delimited(chars, pos, "~~", "~~") {
            if flanked(&content) {
                return Some((Inline::Strike(content), next));
            }
        }
    }

    None
}

/// Emphasis content must hug its markers: `* b *` is prose, not italics.
fn flanked(content: &str) -> bool {
    !content.is_empty() && content.trim() == content
}

fn starts_with(chars: &[char], pos: usize, pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    chars.len() >= pos + pat.len() && chars[pos..pos + pat.len()] == pat[..]
}

/// Match `open … close` at `pos`, returning the enclosed text and the
/// index just past the closer. The enclosed text must be non-empty for
/// symmetric single-char markers to avoid matching `**` as empty italic.
fn delimited(chars: &[char], pos: usize, open: &str, close: &str) -> Option<(String, usize)> {
    let open_len = open.chars().count();
    let close_chars: Vec<char> = close.chars().collect();
    let mut i = pos + open_len;

    while i + close_chars.len() <= chars.len() {
        if chars[i..i + close_chars.len()] == close_chars[..] {
            let content: String = chars[pos + open_len..i].iter().collect();
            if content.is_empty() && open_len == 1 {
                return None;
            }
            return Some((content, i + close_chars.len()));
        }
        i += 1;
    }
    None
}

/// Match `[text](url)` starting at the `[`.
fn bracket_pair(chars: &[char], pos: usize) -> Option<(String, String, usize)> {
    debug_assert_eq!(chars[pos], '[');
    let close = (pos + 1..chars.len()).find(|&i| chars[i] == ']')?;
    if close + 1 >= chars.len() || chars[close + 1] != '(' {
        return None;
    }
    let paren_close = (close + 2..chars.len()).find(|&i| chars[i] == ')')?;
    let text: String = chars[pos + 1..close].iter().collect();
    let url: String = chars[close + 2..paren_close].iter().collect();
    Some((text, url, paren_close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_before_italic() {
        let spans = parse("**strong** and *slanted*");
        assert_eq!(spans[0], Inline::Bold("strong".into()));
        assert_eq!(spans[1], Inline::Text(" and ".into()));
        assert_eq!(spans[2], Inline::Italic("slanted".into()));
    }

    #[test]
    fn test_inline_code_shields_markers() {
        let spans = parse("use `mov *eax*` here");
        assert_eq!(spans[1], Inline::Code("mov *eax*".into()));
    }

    #[test]
    fn test_link_and_image() {
        let spans = parse("see [fasm docs](https://flatassembler.net) ![logo](img/logo.png)");
        assert!(spans.contains(&Inline::Link {
            text: "fasm docs".into(),
            url: "https://flatassembler.net".into(),
        }));
        assert!(spans.contains(&Inline::Image {
            alt: "logo".into(),
            url: "img/logo.png".into(),
        }));
    }

    #[test]
    fn test_unterminated_markers_stay_literal() {
        let spans = parse("a ** b * c ~~ d");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0], Inline::Text("a ** b * c ~~ d".into()));
    }

    #[test]
    fn test_strikethrough() {
        let spans = parse("~~old~~ new");
        assert_eq!(spans[0], Inline::Strike("old".into()));
    }

    #[test]
    fn test_plain_text_projection() {
        let spans = parse("**Getting** `started` [now](x)");
        assert_eq!(plain_text(&spans), "Getting started now");
    }
}

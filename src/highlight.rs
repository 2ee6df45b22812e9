//! Assembly syntax highlighting for book code blocks.
//!
//! A single character scan classifies each token, so comment and string
//! interiors never get mnemonic tagging. The same token stream backs the
//! HTML renderer (semantic spans, `data-instruction` attributes) and the
//! reader pane's styled lines.

use crate::fasm_lang;
use crate::markdown::html::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Mnemonic,
    Register,
    Directive,
    Number,
    String,
    Comment,
    Label,
    Operator,
    Plain,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub token_type: TokenType,
}

impl Token {
    pub fn new(text: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            text: text.into(),
            token_type,
        }
    }
}

/// Receives one record per mnemonic match during highlighting. Usage
/// tracking is a cross-component write, so it is an explicit parameter
/// here rather than a global the highlighter reaches for.
pub trait UsageSink {
    fn record(&mut self, mnemonic: &str, line: usize, context: &str);
}

/// Sink that drops every record; for rendering without usage indexing.
pub struct NullSink;

impl UsageSink for NullSink {
    fn record(&mut self, _mnemonic: &str, _line: usize, _context: &str) {}
}

pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];

        // Comment - everything from ; to end of line
        if ch == ';' {
            let comment: String = chars[pos..].iter().collect();
            tokens.push(Token::new(comment, TokenType::Comment));
            break;
        }

        // String literal
        if ch == '"' || ch == '\'' {
            let quote = ch;
            let start = pos;
            pos += 1;
            while pos < chars.len() && chars[pos] != quote {
                if chars[pos] == '\\' && pos + 1 < chars.len() {
                    pos += 1;
                }
                pos += 1;
            }
            if pos < chars.len() {
                pos += 1; // Include closing quote
            }
            let string: String = chars[start..pos].iter().collect();
            tokens.push(Token::new(string, TokenType::String));
            continue;
        }

        // Whitespace
        if ch.is_whitespace() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            let ws: String = chars[start..pos].iter().collect();
            tokens.push(Token::new(ws, TokenType::Plain));
            continue;
        }

        // Numbers: decimal, 0x-prefixed, or h/b/o suffixed
        if ch.is_ascii_digit() {
            let start = pos;
            if ch == '0'
                && pos + 1 < chars.len()
                && (chars[pos + 1] == 'x' || chars[pos + 1] == 'X')
            {
                pos += 2;
                while pos < chars.len() && chars[pos].is_ascii_hexdigit() {
                    pos += 1;
                }
            } else {
                while pos < chars.len() && (chars[pos].is_ascii_hexdigit() || chars[pos] == '_') {
                    pos += 1;
                }
                if pos < chars.len() && matches!(chars[pos].to_ascii_lowercase(), 'h' | 'b' | 'o') {
                    pos += 1;
                }
            }
            let num: String = chars[start..pos].iter().collect();
            tokens.push(Token::new(num, TokenType::Number));
            continue;
        }

        // Identifier, mnemonic, register, or directive
        if ch.is_alphabetic() || ch == '_' || ch == '.' || ch == '@' {
            let start = pos;
            pos += 1;
            while pos < chars.len()
                && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '@')
            {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();

            // Label: identifier immediately followed by a colon
            if pos < chars.len() && chars[pos] == ':' {
                pos += 1;
                let label: String = chars[start..pos].iter().collect();
                tokens.push(Token::new(label, TokenType::Label));
                continue;
            }

            let token_type = if fasm_lang::is_mnemonic(&word) {
                TokenType::Mnemonic
            } else if fasm_lang::is_register(&word) {
                TokenType::Register
            } else if fasm_lang::is_directive(&word) {
                TokenType::Directive
            } else {
                TokenType::Plain
            };
            tokens.push(Token::new(word, token_type));
            continue;
        }

        let op_chars = [
            '+', '-', '*', '/', ',', '[', ']', '(', ')', ':', '<', '>', '=', '&', '|', '^', '!',
            '~', '$', '%',
        ];
        if op_chars.contains(&ch) {
            tokens.push(Token::new(ch.to_string(), TokenType::Operator));
            pos += 1;
            continue;
        }

        tokens.push(Token::new(ch.to_string(), TokenType::Plain));
        pos += 1;
    }

    tokens
}

/// Highlight assembly lines as HTML. `first_line` is the 1-based source
/// line of `lines[0]`; each mnemonic match is reported to `sink` with its
/// absolute line and the trimmed line as context.
pub fn highlight_html(lines: &[String], first_line: usize, sink: &mut dyn UsageSink) -> String {
    let mut out = String::new();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let source_line = first_line + i;
        for token in tokenize_line(line) {
            match token.token_type {
                TokenType::Mnemonic => {
                    let key = token.text.to_ascii_uppercase();
                    sink.record(&key, source_line, line.trim());
                    out.push_str(&format!(
                        "<span class=\"mnemonic\" data-instruction=\"{}\">{}</span>",
                        key,
                        escape(&token.text)
                    ));
                }
                TokenType::Register => push_span(&mut out, "register", &token.text),
                TokenType::Directive => push_span(&mut out, "directive", &token.text),
                TokenType::Number => push_span(&mut out, "number", &token.text),
                TokenType::String => push_span(&mut out, "string", &token.text),
                TokenType::Comment => push_span(&mut out, "comment", &token.text),
                TokenType::Label => push_span(&mut out, "label", &token.text),
                TokenType::Operator | TokenType::Plain => out.push_str(&escape(&token.text)),
            }
        }
    }

    out
}

fn push_span(out: &mut String, class: &str, text: &str) {
    out.push_str(&format!("<span class=\"{}\">{}</span>", class, escape(text)));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CollectSink(Vec<(String, usize, String)>);

    impl UsageSink for CollectSink {
        fn record(&mut self, mnemonic: &str, line: usize, context: &str) {
            self.0
                .push((mnemonic.to_string(), line, context.to_string()));
        }
    }

    #[test]
    fn test_tokenize_instruction_line() {
        let tokens = tokenize_line("mov eax, 10h");
        assert!(tokens
            .iter()
            .any(|t| t.token_type == TokenType::Mnemonic && t.text == "mov"));
        assert!(tokens
            .iter()
            .any(|t| t.token_type == TokenType::Register && t.text == "eax"));
        assert!(tokens
            .iter()
            .any(|t| t.token_type == TokenType::Number && t.text == "10h"));
    }

    #[test]
    fn test_tokenize_label_and_comment() {
        let tokens = tokenize_line("start: xor eax, eax ; zero it");
        assert!(tokens.iter().any(|t| t.token_type == TokenType::Label));
        let comment = tokens.last().unwrap();
        assert_eq!(comment.token_type, TokenType::Comment);
        assert_eq!(comment.text, "; zero it");
    }

    #[test]
    fn test_mnemonic_inside_comment_not_tagged() {
        let tokens = tokenize_line("ret ; then call exit");
        let mnemonics: Vec<_> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::Mnemonic)
            .collect();
        assert_eq!(mnemonics.len(), 1);
        assert_eq!(mnemonics[0].text, "ret");
    }

    #[test]
    fn test_html_emits_clickable_mnemonic_span() {
        let lines = vec![String::from("mov eax, 1")];
        let html = highlight_html(&lines, 4, &mut NullSink);
        assert!(html.contains("data-instruction=\"MOV\""));
        assert!(html.contains("class=\"mnemonic\""));
        assert!(html.contains("class=\"register\""));
    }

    #[test]
    fn test_usage_sink_gets_line_and_context() {
        let lines = vec![String::from("  push ebp"), String::from("  mov ebp, esp")];
        let mut sink = CollectSink(Vec::new());
        highlight_html(&lines, 10, &mut sink);
        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[0], ("PUSH".into(), 10, "push ebp".into()));
        assert_eq!(sink.0[1].0, "MOV");
        assert_eq!(sink.0[1].1, 11);
    }

    #[test]
    fn test_string_contents_not_highlighted() {
        let tokens = tokenize_line("msg db \"mov eax\", 0");
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::String)
            .collect();
        assert_eq!(strings.len(), 1);
        assert!(!tokens
            .iter()
            .any(|t| t.token_type == TokenType::Mnemonic));
    }
}

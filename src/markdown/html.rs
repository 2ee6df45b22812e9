//! HTML rendering for the block tree. Each variant renders independently;
//! heading ids, table wrappers, and code-block chrome follow the book's
//! existing stylesheet classes.

use std::collections::HashMap;

use super::block::{Block, CodeBlock};
use super::inline::{self, Inline};
use super::Document;
use crate::fasm_lang;
use crate::highlight::{self, UsageSink};

/// Render a parsed document to an HTML fragment. Mnemonic matches inside
/// assembly code blocks are reported through `sink`; pass
/// [`highlight::NullSink`] when no usage indexing is wanted. Output is a
/// pure function of the document, so rendering twice is byte-identical.
pub fn render_document(doc: &Document, sink: &mut dyn UsageSink) -> String {
    let mut out = String::new();
    let mut slug_counts: HashMap<String, usize> = HashMap::new();

    for block in &doc.blocks {
        render_block(block, &mut out, &mut slug_counts, sink);
    }

    out
}

fn render_block(
    block: &Block,
    out: &mut String,
    slug_counts: &mut HashMap<String, usize>,
    sink: &mut dyn UsageSink,
) {
    match block {
        Block::Heading { level, inlines } => {
            let id = unique_slug(&inline::plain_text(inlines), slug_counts);
            out.push_str(&format!("<h{level} id=\"{id}\">"));
            render_inlines(inlines, out);
            out.push_str(&format!("</h{level}>\n"));
        }
        Block::Code(code) => render_code_block(code, out, sink),
        Block::Table { header, rows } => {
            out.push_str("<div class=\"table-scroll\"><table>\n<thead><tr>");
            for cell in header {
                out.push_str("<th>");
                render_inlines(cell, out);
                out.push_str("</th>");
            }
            out.push_str("</tr></thead>\n<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    render_inlines(cell, out);
                    out.push_str("</td>");
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table></div>\n");
        }
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let mut depth = 0usize;
            for item in items {
                while depth <= item.level {
                    out.push_str(&format!("<{tag}>\n"));
                    depth += 1;
                }
                while depth > item.level + 1 {
                    out.push_str(&format!("</{tag}>\n"));
                    depth -= 1;
                }
                out.push_str("<li>");
                render_inlines(&item.inlines, out);
                out.push_str("</li>\n");
            }
            while depth > 0 {
                out.push_str(&format!("</{tag}>\n"));
                depth -= 1;
            }
        }
        Block::Blockquote { lines } => {
            out.push_str("<blockquote><p>");
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_inlines(line, out);
            }
            out.push_str("</p></blockquote>\n");
        }
        Block::Rule => out.push_str("<hr>\n"),
        Block::Callout { kind, lines } => {
            out.push_str(&format!(
                "<div class=\"callout {}\"><div class=\"callout-title\">{}</div><p>",
                kind.css_class(),
                kind.label()
            ));
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_inlines(line, out);
            }
            out.push_str("</p></div>\n");
        }
        Block::Paragraph { inlines } => {
            out.push_str("<p>");
            render_inlines(inlines, out);
            out.push_str("</p>\n");
        }
    }
}

fn render_code_block(code: &CodeBlock, out: &mut String, sink: &mut dyn UsageSink) {
    let lang_label = code.language.as_deref().unwrap_or("text");
    out.push_str(&format!(
        "<div class=\"code-block\" data-start-line=\"{}\" data-end-line=\"{}\">\n",
        code.start_line, code.end_line
    ));
    out.push_str(&format!(
        "<div class=\"code-header\"><span class=\"code-lang\">{}</span>\
         <button class=\"code-action\" data-action=\"copy\">copy</button>\
         <button class=\"code-action\" data-action=\"download\">download</button></div>\n",
        escape(lang_label)
    ));

    let body = if code
        .language
        .as_deref()
        .is_some_and(fasm_lang::is_assembly_language)
    {
        highlight::highlight_html(&code.lines, code.content_start_line(), sink)
    } else {
        escape(&code.lines.join("\n"))
    };

    out.push_str(&format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n</div>\n",
        escape(lang_label),
        body
    ));
}

fn render_inlines(spans: &[Inline], out: &mut String) {
    for span in spans {
        match span {
            Inline::Text(t) => out.push_str(&escape(t)),
            Inline::Code(t) => out.push_str(&format!("<code>{}</code>", escape(t))),
            Inline::Bold(t) => out.push_str(&format!("<strong>{}</strong>", escape(t))),
            Inline::Italic(t) => out.push_str(&format!("<em>{}</em>", escape(t))),
            Inline::Strike(t) => out.push_str(&format!("<del>{}</del>", escape(t))),
            Inline::Link { text, url } => out.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                escape(url),
                escape(text)
            )),
            Inline::Image { alt, url } => out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape(url),
                escape(alt)
            )),
        }
    }
}

/// Escape text for safe embedding in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Heading id: lowercased, non-word characters stripped, spaces to hyphens.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = false;
    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if (c.is_whitespace() || c == '-') && !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}

fn unique_slug(text: &str, counts: &mut HashMap<String, usize>) -> String {
    let base = slugify(text);
    let count = counts.entry(base.clone()).or_insert(0);
    let slug = if *count == 0 {
        base.clone()
    } else {
        format!("{}-{}", base, count)
    };
    *count += 1;
    slug
}

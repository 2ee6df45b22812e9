//! Static HTML export: one page per chapter with prev/next navigation, a
//! contents index, and a glossary page, all sharing one embedded stylesheet.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::book::Book;
use crate::config::ExportConfig;
use crate::glossary::Glossary;
use crate::highlight::NullSink;
use crate::markdown::html::{self, escape};

const STYLESHEET: &str = r#"
body { max-width: 52rem; margin: 0 auto; padding: 1rem 2rem;
       font-family: Georgia, serif; line-height: 1.6; color: #222; }
h1, h2, h3 { font-family: Helvetica, Arial, sans-serif; }
a { color: #0a6ebd; }
pre { margin: 0; padding: 0.75rem; overflow-x: auto; }
code { font-family: "SF Mono", Consolas, monospace; font-size: 0.9em; }
p > code { background: #f2f2f2; padding: 0.1em 0.3em; border-radius: 3px; }
.code-block { border: 1px solid #ddd; border-radius: 4px; margin: 1rem 0;
              background: #fafafa; }
.code-header { display: flex; justify-content: flex-end; gap: 0.5rem;
               padding: 0.3rem 0.6rem; border-bottom: 1px solid #ddd;
               font-family: Helvetica, Arial, sans-serif; font-size: 0.8rem; }
.code-lang { margin-right: auto; color: #888; text-transform: uppercase; }
.code-action { border: 1px solid #ccc; background: #fff; border-radius: 3px;
               cursor: pointer; }
.mnemonic { color: #0550ae; font-weight: bold; }
.register { color: #116329; }
.directive { color: #8250df; }
.number { color: #0a3069; }
.string { color: #a04100; }
.comment { color: #6e7781; font-style: italic; }
.label { color: #953800; }
.table-scroll { overflow-x: auto; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.3rem 0.6rem; }
blockquote { border-left: 3px solid #ccc; margin-left: 0; padding-left: 1rem;
             color: #555; }
.callout { border-left: 4px solid #888; background: #f6f8fa;
           padding: 0.5rem 1rem; margin: 1rem 0; }
.callout-title { font-weight: bold; font-family: Helvetica, sans-serif; }
.callout-warning { border-color: #d4a72c; }
.callout-tip { border-color: #2da44e; }
.callout-exercise { border-color: #8250df; }
.callout-example { border-color: #0969da; }
.page-nav { display: flex; justify-content: space-between; margin: 2rem 0;
            font-family: Helvetica, Arial, sans-serif; }
.glossary-entry { border-bottom: 1px solid #eee; padding: 1rem 0; }
.glossary-meta { color: #666; font-size: 0.85rem; }
"#;

pub struct ExportedSite {
    pub pages: Vec<PathBuf>,
}

pub fn export_book(
    book: &Book,
    glossary: &Glossary,
    config: &ExportConfig,
    out_dir: &Path,
) -> Result<ExportedSite> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut pages = Vec::new();

    let index_path = out_dir.join("index.html");
    fs::write(&index_path, index_page(book, config))
        .with_context(|| format!("Failed to write {}", index_path.display()))?;
    pages.push(index_path);

    for chapter in &book.chapters {
        let path = out_dir.join(format!("{}.html", chapter.id()));
        fs::write(&path, chapter_page(book, chapter.index, config))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        pages.push(path);
    }

    let glossary_path = out_dir.join("glossary.html");
    fs::write(&glossary_path, glossary_page(glossary, config))
        .with_context(|| format!("Failed to write {}", glossary_path.display()))?;
    pages.push(glossary_path);

    Ok(ExportedSite { pages })
}

fn page_shell(title: &str, suffix: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} - {}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(suffix),
        STYLESHEET,
        body
    )
}

fn index_page(book: &Book, config: &ExportConfig) -> String {
    let mut body = String::from("<h1>Contents</h1>\n<ol>\n");
    for chapter in &book.chapters {
        body.push_str(&format!(
            "<li><a href=\"{}.html\">{}</a></li>\n",
            escape(&chapter.id()),
            escape(&chapter.title)
        ));
    }
    body.push_str("</ol>\n<p><a href=\"glossary.html\">Instruction glossary</a></p>\n");
    page_shell("Contents", &config.title_suffix, &body)
}

fn chapter_page(book: &Book, index: usize, config: &ExportConfig) -> String {
    let chapter = &book.chapters[index];
    let content = match &chapter.load_error {
        // Usage indexing happens at load time; export rendering stays pure.
        None => html::render_document(&chapter.doc, &mut NullSink),
        Some(err) => format!(
            "<p>Could not read this chapter: {}</p>",
            escape(err)
        ),
    };

    let mut nav = String::from("<nav class=\"page-nav\">");
    match index.checked_sub(1).map(|i| &book.chapters[i]) {
        Some(prev) => nav.push_str(&format!(
            "<a href=\"{}.html\">&larr; {}</a>",
            escape(&prev.id()),
            escape(&prev.title)
        )),
        None => nav.push_str("<a href=\"index.html\">&larr; Contents</a>"),
    }
    match book.chapters.get(index + 1) {
        Some(next) => nav.push_str(&format!(
            "<a href=\"{}.html\">{} &rarr;</a>",
            escape(&next.id()),
            escape(&next.title)
        )),
        None => nav.push_str("<a href=\"glossary.html\">Glossary &rarr;</a>"),
    }
    nav.push_str("</nav>\n");

    let body = format!("{}{}{}", nav, content, nav);
    page_shell(&chapter.title, &config.title_suffix, &body)
}

fn glossary_page(glossary: &Glossary, config: &ExportConfig) -> String {
    let mut results = glossary.search("", &crate::glossary::SearchOptions {
        sort: crate::glossary::SortKey::Name,
        limit: usize::MAX,
        ..Default::default()
    });

    let mut body = String::from("<h1>Instruction Glossary</h1>\n");
    body.push_str("<p><a href=\"index.html\">&larr; Contents</a></p>\n");

    for entry in results.matches.drain(..) {
        let Some(record) = glossary.lookup(&entry.mnemonic) else {
            continue;
        };
        body.push_str(&format!(
            "<div class=\"glossary-entry\" id=\"{}\">\n<h2>{}</h2>\n",
            escape(&entry.mnemonic),
            escape(&record.mnemonic)
        ));
        body.push_str(&format!(
            "<p class=\"glossary-meta\">{} &middot; {} &middot; flags: {}</p>\n",
            escape(&record.category),
            escape(&record.difficulty),
            escape(if record.flags.is_empty() { "none" } else { &record.flags })
        ));
        body.push_str(&format!("<p><code>{}</code></p>\n", escape(&record.syntax)));
        body.push_str(&format!("<p>{}</p>\n", escape(&record.description)));
        if !record.cross_refs.is_empty() {
            body.push_str("<p class=\"glossary-meta\">See also: ");
            for (i, cross) in record.cross_refs.iter().enumerate() {
                if i > 0 {
                    body.push_str(", ");
                }
                let key = cross.to_ascii_uppercase();
                // Dangling cross-refs stay as plain text rather than links.
                if glossary.lookup(&key).is_some() {
                    body.push_str(&format!("<a href=\"#{}\">{}</a>", escape(&key), escape(cross)));
                } else {
                    body.push_str(&escape(cross));
                }
            }
            body.push_str("</p>\n");
        }
        body.push_str("</div>\n");
    }

    if !glossary.patterns().is_empty() {
        body.push_str("<h1>Common Patterns</h1>\n");
        for pattern in glossary.patterns() {
            body.push_str(&format!(
                "<div class=\"glossary-entry\">\n<h2>{}</h2>\n<p>{}</p>\n",
                escape(&pattern.name),
                escape(&pattern.description)
            ));
            if !pattern.example.is_empty() {
                body.push_str(&format!(
                    "<pre><code>{}</code></pre>\n",
                    escape(&pattern.example)
                ));
            }
            if !pattern.instructions.is_empty() {
                body.push_str("<p class=\"glossary-meta\">Uses: ");
                for (i, mnemonic) in pattern.instructions.iter().enumerate() {
                    if i > 0 {
                        body.push_str(", ");
                    }
                    let key = mnemonic.to_ascii_uppercase();
                    if glossary.lookup(&key).is_some() {
                        body.push_str(&format!(
                            "<a href=\"#{}\">{}</a>",
                            escape(&key),
                            escape(mnemonic)
                        ));
                    } else {
                        body.push_str(&escape(mnemonic));
                    }
                }
                body.push_str("</p>\n");
            }
            body.push_str("</div>\n");
        }
    }

    page_shell("Instruction Glossary", &config.title_suffix, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_book(tmp: &TempDir) -> Book {
        let dir = tmp.path().join("book");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("chapter-01-intro.md"),
            "# Intro\n\n```assembly\nmov eax, 1\n```",
        )
        .unwrap();
        fs::write(dir.join("chapter-02-next.md"), "# Next\n\ntext").unwrap();
        Book::open(&dir).unwrap()
    }

    #[test]
    fn test_export_writes_all_pages() {
        let tmp = TempDir::new().unwrap();
        let book = sample_book(&tmp);
        let out = tmp.path().join("html");

        let site = export_book(&book, &Glossary::fallback(), &ExportConfig::default(), &out)
            .unwrap();

        assert_eq!(site.pages.len(), 4); // index + 2 chapters + glossary
        assert!(out.join("index.html").exists());
        assert!(out.join("chapter-01-intro.html").exists());
        assert!(out.join("glossary.html").exists());
    }

    #[test]
    fn test_chapter_page_links_neighbours() {
        let tmp = TempDir::new().unwrap();
        let book = sample_book(&tmp);
        let config = ExportConfig::default();

        let first = chapter_page(&book, 0, &config);
        assert!(first.contains("href=\"index.html\""));
        assert!(first.contains("href=\"chapter-02-next.html\""));
        assert!(first.contains("data-instruction=\"MOV\""));

        let last = chapter_page(&book, 1, &config);
        assert!(last.contains("href=\"chapter-01-intro.html\""));
        assert!(last.contains("href=\"glossary.html\""));
    }

    #[test]
    fn test_glossary_page_links_only_resolvable_cross_refs() {
        let config = ExportConfig::default();
        // Fallback MOV cross-refs XCHG, which the fallback does not define.
        let page = glossary_page(&Glossary::fallback(), &config);
        assert!(page.contains("<h2>MOV</h2>"));
        assert!(page.contains("XCHG"));
        assert!(!page.contains("href=\"#XCHG\""));
        // ADD cross-refs SUB and INC, also undefined; SUB stays plain text.
        assert!(!page.contains("href=\"#SUB\""));
    }

    #[test]
    fn test_glossary_page_lists_patterns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("glossary.json");
        fs::write(
            &path,
            r#"{
              "instructions": {
                "XOR": {"category": "logic",
                        "syntax": "XOR dest, src",
                        "description": "Bitwise exclusive or."}
              },
              "patterns": [
                {"name": "Zero a register",
                 "description": "xor reg, reg is shorter than mov reg, 0.",
                 "instructions": ["XOR", "MOV"],
                 "example": "xor ebx, ebx"}
              ]
            }"#,
        )
        .unwrap();
        let glossary = Glossary::load(&path).unwrap();

        let page = glossary_page(&glossary, &ExportConfig::default());
        assert!(page.contains("<h2>Zero a register</h2>"));
        assert!(page.contains("<pre><code>xor ebx, ebx</code></pre>"));
        // XOR is defined and links; MOV is not and stays plain.
        assert!(page.contains("href=\"#XOR\""));
        assert!(!page.contains("href=\"#MOV\""));
    }

    #[test]
    fn test_page_titles_carry_suffix() {
        let tmp = TempDir::new().unwrap();
        let book = sample_book(&tmp);
        let config = ExportConfig {
            title_suffix: String::from("My Book"),
            ..Default::default()
        };
        let page = chapter_page(&book, 0, &config);
        assert!(page.contains("<title>Intro - My Book</title>"));
    }
}

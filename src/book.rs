//! Book loading: chapter discovery, parsing, glossary wiring, and the
//! sample-book scaffold behind `fasmbook --init`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::glossary::{ChapterUsageSink, Glossary};
use crate::highlight;
use crate::markdown::{self, Document};

pub const GLOSSARY_FILE: &str = "glossary.json";

#[derive(Debug)]
pub struct Chapter {
    pub index: usize,
    pub path: PathBuf,
    pub title: String,
    pub source: String,
    pub doc: Document,
    /// Set when the chapter file could not be read; the reader shows the
    /// message in place of content instead of dying.
    pub load_error: Option<String>,
}

impl Chapter {
    /// File stem, used as the stable chapter id in usage records and
    /// exported file names.
    pub fn id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("chapter-{}", self.index))
    }
}

pub struct Book {
    pub dir: PathBuf,
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Open a book directory: every `chapter-*.md`, sorted by file name so
    /// the numeric prefix fixes the reading order. A chapter that fails to
    /// read still occupies its slot, with `load_error` set.
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read book directory: {}", dir.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "md")
                    && p.file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with("chapter-"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            anyhow::bail!("No chapter-*.md files in {}", dir.display());
        }

        let chapters = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| match fs::read_to_string(&path) {
                Ok(source) => {
                    let doc = markdown::parse(&source);
                    let title = doc
                        .title()
                        .unwrap_or_else(|| fallback_title(&path, index));
                    Chapter {
                        index,
                        path,
                        title,
                        source,
                        doc,
                        load_error: None,
                    }
                }
                Err(err) => Chapter {
                    index,
                    title: fallback_title(&path, index),
                    path,
                    source: String::new(),
                    doc: Document::default(),
                    load_error: Some(err.to_string()),
                },
            })
            .collect();

        Ok(Self {
            dir: dir.to_path_buf(),
            chapters,
        })
    }

    pub fn glossary_path(&self) -> PathBuf {
        self.dir.join(GLOSSARY_FILE)
    }

    /// Load the book's glossary, or the built-in fallback when the data
    /// file is missing or malformed. Returns the load error alongside so
    /// the caller can surface it.
    pub fn load_glossary(&self) -> (Glossary, Option<String>) {
        match Glossary::load(&self.glossary_path()) {
            Ok(glossary) => (glossary, None),
            Err(err) => (Glossary::fallback(), Some(format!("{:#}", err))),
        }
    }

    /// Walk every chapter's assembly blocks in reading order and record
    /// each mnemonic sighting, so usage counts reflect the whole book
    /// before the first page renders.
    pub fn scan_usages(&self, glossary: &mut Glossary) {
        for chapter in &self.chapters {
            let mut sink = ChapterUsageSink::new(glossary, chapter.id());
            for code in chapter.doc.code_blocks() {
                if code
                    .language
                    .as_deref()
                    .is_some_and(crate::fasm_lang::is_assembly_language)
                {
                    highlight::highlight_html(&code.lines, code.content_start_line(), &mut sink);
                }
            }
        }
    }
}

fn fallback_title(path: &Path, index: usize) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Chapter {}", index + 1))
}

const SAMPLE_CHAPTER: &str = r#"# Getting Started with FASM

Welcome! This chapter walks through your first flat assembler program.

## Registers

The 32-bit general purpose registers are `eax`, `ebx`, `ecx`, and `edx`.

```assembly
format ELF executable 3
entry start

start:
    mov eax, 1      ; sys_exit
    xor ebx, ebx    ; status 0
    int 0x80
```

💡 Tip: run `fasm hello.asm` to assemble this file.

Exercise: change the exit status to 42 and verify it with `echo $?`.
"#;

const SAMPLE_GLOSSARY: &str = r#"{
  "instructions": {
    "MOV": {
      "category": "data-transfer",
      "syntax": "MOV dest, src",
      "description": "Copy the source operand into the destination.",
      "flags": "none",
      "difficulty": "beginner",
      "examples": ["mov eax, 1"],
      "cross_refs": ["XCHG"],
      "keywords": ["copy", "assign"]
    },
    "XOR": {
      "category": "logic",
      "syntax": "XOR dest, src",
      "description": "Bitwise exclusive or; xor reg, reg zeroes a register.",
      "flags": "OF SF ZF PF CF",
      "difficulty": "beginner",
      "examples": ["xor ebx, ebx"],
      "cross_refs": ["AND", "OR"],
      "keywords": ["zero", "toggle"]
    },
    "INT": {
      "category": "control-flow",
      "syntax": "INT imm8",
      "description": "Raise a software interrupt; int 0x80 enters the kernel.",
      "flags": "none",
      "difficulty": "intermediate",
      "examples": ["int 0x80"],
      "cross_refs": [],
      "keywords": ["syscall", "interrupt"]
    }
  },
  "patterns": [
    {
      "name": "Zero a register",
      "description": "xor reg, reg is shorter than mov reg, 0 and sets ZF.",
      "instructions": ["XOR"],
      "example": "xor ebx, ebx"
    }
  ]
}
"#;

/// Scaffold a new book directory with one chapter and a starter glossary.
pub fn create_sample_book(name: &str) -> Result<()> {
    let book_dir = PathBuf::from(name);

    if book_dir.exists() {
        anyhow::bail!("Directory '{}' already exists", name);
    }

    fs::create_dir_all(&book_dir)
        .with_context(|| format!("Failed to create directory: {}", name))?;

    fs::write(book_dir.join("chapter-01-getting-started.md"), SAMPLE_CHAPTER)
        .context("Failed to create chapter-01-getting-started.md")?;
    fs::write(book_dir.join(GLOSSARY_FILE), SAMPLE_GLOSSARY)
        .context("Failed to create glossary.json")?;

    let readme = format!(
        r#"# {}

A FASM tutorial book readable with fasmbook.

## Read

```bash
fasmbook {}
```

## Export to HTML

```bash
fasmbook {} --export html
```

Chapters are `chapter-NN-title.md` files; the instruction glossary lives
in `glossary.json`.
"#,
        name, name, name
    );
    fs::write(book_dir.join("README.md"), readme).context("Failed to create README.md")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_book(tmp: &TempDir, chapters: &[(&str, &str)]) {
        for (name, body) in chapters {
            fs::write(tmp.path().join(name), body).unwrap();
        }
    }

    #[test]
    fn test_chapters_sorted_by_file_name() {
        let tmp = TempDir::new().unwrap();
        write_book(
            &tmp,
            &[
                ("chapter-02-loops.md", "# Loops"),
                ("chapter-01-intro.md", "# Intro"),
                ("chapter-10-io.md", "# IO"),
                ("notes.md", "# Not a chapter"),
            ],
        );

        let book = Book::open(tmp.path()).unwrap();
        let titles: Vec<_> = book.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Loops", "IO"]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(Book::open(tmp.path()).is_err());
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let tmp = TempDir::new().unwrap();
        write_book(&tmp, &[("chapter-01-intro.md", "no heading here")]);
        let book = Book::open(tmp.path()).unwrap();
        assert_eq!(book.chapters[0].title, "chapter-01-intro");
    }

    #[test]
    fn test_missing_glossary_uses_fallback() {
        let tmp = TempDir::new().unwrap();
        write_book(&tmp, &[("chapter-01-intro.md", "# Intro")]);
        let book = Book::open(tmp.path()).unwrap();
        let (glossary, error) = book.load_glossary();
        assert!(error.is_some());
        assert!(glossary.lookup("MOV").is_some());
    }

    #[test]
    fn test_scan_usages_covers_all_chapters() {
        let tmp = TempDir::new().unwrap();
        write_book(
            &tmp,
            &[
                ("chapter-01-a.md", "# A\n\n```assembly\nmov eax, 1\n```"),
                ("chapter-02-b.md", "# B\n\n```asm\nmov ebx, 2\nadd eax, ebx\n```"),
            ],
        );
        let book = Book::open(tmp.path()).unwrap();
        let mut glossary = Glossary::fallback();
        book.scan_usages(&mut glossary);
        assert_eq!(glossary.usage_count("MOV"), 2);
        assert_eq!(glossary.usage_count("ADD"), 1);
        assert_eq!(glossary.usages("MOV")[0].chapter, "chapter-01-a");
    }

    #[test]
    fn test_create_sample_book_is_openable() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mybook");
        let name = dir.to_string_lossy().into_owned();
        create_sample_book(&name).unwrap();

        let book = Book::open(&dir).unwrap();
        assert_eq!(book.chapters.len(), 1);
        let (glossary, error) = book.load_glossary();
        assert!(error.is_none());
        assert!(glossary.lookup("xor").is_some());
    }
}

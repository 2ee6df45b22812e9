//! Instruction glossary: records loaded from the book's `glossary.json`,
//! case-insensitive lookup, scored search, related-instruction resolution,
//! and the usage log fed by the highlighter through [`UsageSink`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::highlight::UsageSink;

pub const DEFAULT_RESULT_LIMIT: usize = 20;
const RELATED_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InstructionRecord {
    pub mnemonic: String,
    pub category: String,
    pub syntax: String,
    pub description: String,
    pub flags: String,
    pub cycles: String,
    pub notes: String,
    pub examples: Vec<String>,
    pub cross_refs: Vec<String>,
    pub difficulty: String,
    pub keywords: Vec<String>,
}

/// A named idiom from the book, shown alongside the instructions it uses.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CodePattern {
    pub name: String,
    pub description: String,
    pub instructions: Vec<String>,
    pub example: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct GlossaryFile {
    /// Mnemonic-keyed records; the map key is canonical and records need
    /// not repeat it.
    instructions: HashMap<String, InstructionRecord>,
    patterns: Vec<CodePattern>,
}

/// One sighting of a mnemonic in the book's code blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub chapter: String,
    pub line: usize,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Relevance,
    Usage,
    Name,
    Category,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub sort: SortKey,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            difficulty: None,
            sort: SortKey::Relevance,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub mnemonic: String,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub matches: Vec<SearchMatch>,
    /// Match count before the limit was applied.
    pub total: usize,
}

pub struct Glossary {
    /// Keyed by uppercased mnemonic.
    records: HashMap<String, InstructionRecord>,
    patterns: Vec<CodePattern>,
    /// Search term (word or 2-char shingle) to mnemonic keys.
    index: HashMap<String, HashSet<String>>,
    usages: HashMap<String, Vec<Usage>>,
    related_cache: HashMap<String, Vec<String>>,
}

impl Glossary {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary: {}", path.display()))?;
        let file: GlossaryFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse glossary: {}", path.display()))?;
        let records = file
            .instructions
            .into_iter()
            .map(|(key, mut record)| {
                record.mnemonic = key.to_ascii_uppercase();
                record
            })
            .collect();
        Ok(Self::from_records(records, file.patterns))
    }

    /// Two-entry built-in glossary, used when the data file is missing or
    /// malformed so the reader still works end to end.
    pub fn fallback() -> Self {
        let records = vec![
            InstructionRecord {
                mnemonic: String::from("MOV"),
                category: String::from("data-transfer"),
                syntax: String::from("MOV dest, src"),
                description: String::from("Copy the source operand into the destination."),
                flags: String::from("none"),
                cycles: String::from("1"),
                examples: vec![String::from("mov eax, 1")],
                cross_refs: vec![String::from("XCHG")],
                difficulty: String::from("beginner"),
                keywords: vec![String::from("copy"), String::from("assign")],
                ..Default::default()
            },
            InstructionRecord {
                mnemonic: String::from("ADD"),
                category: String::from("arithmetic"),
                syntax: String::from("ADD dest, src"),
                description: String::from("Add the source operand to the destination."),
                flags: String::from("OF SF ZF AF CF PF"),
                cycles: String::from("1"),
                examples: vec![String::from("add eax, ebx")],
                cross_refs: vec![String::from("SUB"), String::from("INC")],
                difficulty: String::from("beginner"),
                keywords: vec![String::from("sum"), String::from("plus")],
                ..Default::default()
            },
        ];
        Self::from_records(records, Vec::new())
    }

    fn from_records(records: Vec<InstructionRecord>, patterns: Vec<CodePattern>) -> Self {
        let mut map = HashMap::new();
        let mut index: HashMap<String, HashSet<String>> = HashMap::new();

        for record in records {
            let key = record.mnemonic.to_ascii_uppercase();
            for term in index_terms(&record) {
                index.entry(term).or_default().insert(key.clone());
            }
            map.insert(key, record);
        }

        Self {
            records: map,
            patterns,
            index,
            usages: HashMap::new(),
            related_cache: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn patterns(&self) -> &[CodePattern] {
        &self.patterns
    }

    /// Case-insensitive lookup. Pure: never touches the usage log.
    pub fn lookup(&self, mnemonic: &str) -> Option<&InstructionRecord> {
        self.records.get(&mnemonic.to_ascii_uppercase())
    }

    pub fn record_usage(&mut self, mnemonic: &str, usage: Usage) {
        self.usages
            .entry(mnemonic.to_ascii_uppercase())
            .or_default()
            .push(usage);
    }

    pub fn usage_count(&self, mnemonic: &str) -> usize {
        self.usages
            .get(&mnemonic.to_ascii_uppercase())
            .map_or(0, Vec::len)
    }

    pub fn usages(&self, mnemonic: &str) -> &[Usage] {
        self.usages
            .get(&mnemonic.to_ascii_uppercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Cross-referenced and same-category instructions, at most five.
    /// Cross-refs naming instructions the glossary does not define are
    /// skipped here; they still appear verbatim on the record itself.
    pub fn related(&mut self, mnemonic: &str) -> Vec<String> {
        let key = mnemonic.to_ascii_uppercase();
        if let Some(cached) = self.related_cache.get(&key) {
            return cached.clone();
        }

        let mut related = Vec::new();
        if let Some(record) = self.records.get(&key) {
            for cross in &record.cross_refs {
                let cross_key = cross.to_ascii_uppercase();
                if cross_key != key
                    && self.records.contains_key(&cross_key)
                    && !related.contains(&cross_key)
                {
                    related.push(cross_key);
                }
            }

            let mut same_category: Vec<&String> = self
                .records
                .iter()
                .filter(|(k, r)| **k != key && r.category == record.category)
                .map(|(k, _)| k)
                .collect();
            same_category.sort();
            for other in same_category {
                if related.len() >= RELATED_LIMIT {
                    break;
                }
                if !related.contains(other) {
                    related.push(other.clone());
                }
            }
        }
        related.truncate(RELATED_LIMIT);

        self.related_cache.insert(key, related.clone());
        related
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> SearchResults {
        let query = query.trim().to_ascii_lowercase();
        let query_terms: HashSet<String> = text_terms(&query).into_iter().collect();

        let mut matches: Vec<SearchMatch> = self
            .records
            .iter()
            .filter(|(_, record)| {
                options
                    .category
                    .as_deref()
                    .is_none_or(|c| record.category.eq_ignore_ascii_case(c))
                    && options
                        .difficulty
                        .as_deref()
                        .is_none_or(|d| record.difficulty.eq_ignore_ascii_case(d))
            })
            .filter_map(|(key, _)| {
                let score = self.score(key, &query, &query_terms)?;
                Some(SearchMatch {
                    mnemonic: key.clone(),
                    score,
                })
            })
            .collect();

        match options.sort {
            SortKey::Relevance => {
                matches.sort_by(|a, b| b.score.cmp(&a.score).then(a.mnemonic.cmp(&b.mnemonic)))
            }
            SortKey::Usage => matches.sort_by(|a, b| {
                self.usage_count(&b.mnemonic)
                    .cmp(&self.usage_count(&a.mnemonic))
                    .then(a.mnemonic.cmp(&b.mnemonic))
            }),
            SortKey::Name => matches.sort_by(|a, b| a.mnemonic.cmp(&b.mnemonic)),
            SortKey::Category => matches.sort_by(|a, b| {
                let ca = &self.records[&a.mnemonic].category;
                let cb = &self.records[&b.mnemonic].category;
                ca.cmp(cb).then(a.mnemonic.cmp(&b.mnemonic))
            }),
        }

        let total = matches.len();
        matches.truncate(options.limit);
        SearchResults { matches, total }
    }

    fn score(&self, key: &str, query: &str, query_terms: &HashSet<String>) -> Option<u32> {
        if query.is_empty() {
            return Some(0);
        }
        let name = key.to_ascii_lowercase();
        if name == query {
            return Some(100);
        }
        if name.starts_with(query) {
            return Some(80);
        }
        if name.ends_with(query) {
            return Some(70);
        }
        if name.contains(query) {
            return Some(60);
        }
        let overlap = query_terms
            .iter()
            .any(|term| self.index.get(term).is_some_and(|set| set.contains(key)));
        if overlap {
            Some(30)
        } else {
            None
        }
    }
}

/// Index terms for one record: lowercased words plus 2-char shingles of
/// the mnemonic, so partial queries like "mo" still reach MOV.
fn index_terms(record: &InstructionRecord) -> HashSet<String> {
    let mut terms = HashSet::new();
    let name = record.mnemonic.to_ascii_lowercase();
    terms.insert(name.clone());
    let chars: Vec<char> = name.chars().collect();
    for pair in chars.windows(2) {
        terms.insert(pair.iter().collect());
    }
    for source in [&record.description, &record.category, &record.syntax] {
        terms.extend(text_terms(source));
    }
    for keyword in &record.keywords {
        terms.extend(text_terms(keyword));
    }
    for example in &record.examples {
        terms.extend(text_terms(example));
    }
    terms
}

fn text_terms(text: &str) -> Vec<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() >= 2)
        .map(str::to_string)
        .collect()
}

/// Routes highlighter mnemonic reports into a glossary's usage log,
/// stamped with the chapter being rendered.
pub struct ChapterUsageSink<'a> {
    glossary: &'a mut Glossary,
    chapter: String,
}

impl<'a> ChapterUsageSink<'a> {
    pub fn new(glossary: &'a mut Glossary, chapter: impl Into<String>) -> Self {
        Self {
            glossary,
            chapter: chapter.into(),
        }
    }
}

impl UsageSink for ChapterUsageSink<'_> {
    fn record(&mut self, mnemonic: &str, line: usize, context: &str) {
        self.glossary.record_usage(
            mnemonic,
            Usage {
                chapter: self.chapter.clone(),
                line,
                context: context.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Glossary {
        let records = vec![
            InstructionRecord {
                mnemonic: String::from("MOV"),
                category: String::from("data-transfer"),
                description: String::from("Copy the source operand into the destination."),
                cross_refs: vec![String::from("XCHG"), String::from("LODSB")],
                difficulty: String::from("beginner"),
                ..Default::default()
            },
            InstructionRecord {
                mnemonic: String::from("MOVSB"),
                category: String::from("string"),
                description: String::from("Copy a byte from [esi] to [edi]."),
                difficulty: String::from("intermediate"),
                ..Default::default()
            },
            InstructionRecord {
                mnemonic: String::from("XCHG"),
                category: String::from("data-transfer"),
                description: String::from("Exchange two operands."),
                difficulty: String::from("beginner"),
                ..Default::default()
            },
            InstructionRecord {
                mnemonic: String::from("ADD"),
                category: String::from("arithmetic"),
                description: String::from("Add source to destination."),
                keywords: vec![String::from("sum")],
                difficulty: String::from("beginner"),
                ..Default::default()
            },
        ];
        Glossary::from_records(records, Vec::new())
    }

    #[test]
    fn test_load_mnemonic_keyed_data_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("glossary.json");
        fs::write(
            &path,
            r#"{
              "instructions": {
                "MOV": {"category": "data-transfer", "syntax": "MOV dest, src",
                        "description": "Copy the source operand into the destination."},
                "add": {"category": "arithmetic",
                        "description": "Add source to destination."}
              }
            }"#,
        )
        .unwrap();

        let g = Glossary::load(&path).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.lookup("mov").unwrap().mnemonic, "MOV");
        // Lowercase map keys are normalized on load.
        assert_eq!(g.lookup("ADD").unwrap().mnemonic, "ADD");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let g = sample();
        assert!(g.lookup("mov").is_some());
        assert!(g.lookup("Mov").is_some());
        assert!(g.lookup("MOV").is_some());
        assert!(g.lookup("NOPE").is_none());
    }

    #[test]
    fn test_lookup_does_not_touch_usage_log() {
        let g = sample();
        let _ = g.lookup("mov");
        let _ = g.lookup("mov");
        assert_eq!(g.usage_count("MOV"), 0);
    }

    #[test]
    fn test_exact_match_outranks_prefix() {
        let g = sample();
        let results = g.search("mov", &SearchOptions::default());
        assert_eq!(results.matches[0].mnemonic, "MOV");
        assert_eq!(results.matches[0].score, 100);
        assert_eq!(results.matches[1].mnemonic, "MOVSB");
        assert_eq!(results.matches[1].score, 80);
    }

    #[test]
    fn test_keyword_search_via_index() {
        let g = sample();
        let results = g.search("sum", &SearchOptions::default());
        assert!(results
            .matches
            .iter()
            .any(|m| m.mnemonic == "ADD" && m.score == 30));
    }

    #[test]
    fn test_category_filter() {
        let g = sample();
        let options = SearchOptions {
            category: Some(String::from("data-transfer")),
            ..Default::default()
        };
        let results = g.search("", &options);
        let names: Vec<_> = results.matches.iter().map(|m| m.mnemonic.as_str()).collect();
        assert_eq!(names, vec!["MOV", "XCHG"]);
    }

    #[test]
    fn test_result_limit_preserves_total() {
        let g = sample();
        let options = SearchOptions {
            limit: 1,
            ..Default::default()
        };
        let results = g.search("", &options);
        assert_eq!(results.matches.len(), 1);
        assert_eq!(results.total, 4);
    }

    #[test]
    fn test_related_skips_dangling_cross_refs() {
        let mut g = sample();
        let related = g.related("mov");
        assert!(related.contains(&String::from("XCHG")));
        assert!(!related.contains(&String::from("LODSB")));
        assert!(related.len() <= 5);
    }

    #[test]
    fn test_usage_sink_records_chapter() {
        let mut g = sample();
        {
            let mut sink = ChapterUsageSink::new(&mut g, "chapter-01");
            sink.record("MOV", 7, "mov eax, 1");
        }
        assert_eq!(g.usage_count("mov"), 1);
        assert_eq!(g.usages("MOV")[0].chapter, "chapter-01");
    }

    #[test]
    fn test_fallback_still_answers() {
        let g = Glossary::fallback();
        assert!(g.lookup("MOV").is_some());
        assert!(g.lookup("ADD").is_some());
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_sort_by_usage() {
        let mut g = sample();
        for _ in 0..3 {
            g.record_usage(
                "ADD",
                Usage {
                    chapter: String::from("c1"),
                    line: 1,
                    context: String::new(),
                },
            );
        }
        let options = SearchOptions {
            sort: SortKey::Usage,
            ..Default::default()
        };
        let results = g.search("", &options);
        assert_eq!(results.matches[0].mnemonic, "ADD");
    }
}

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

/// One verse of the Gita: Sanskrit text, English translation, page in the
/// chapter PDF, chant video identifier, and PDF link.
///
/// The corpus files store each verse as a fixed 5-element array
/// `[sanskrit, english, startPage, videoId, pdfLink]`. That field order is an
/// external contract shared with the PDF and video assets, so serialization
/// goes through a tuple instead of a keyed object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerseTuple {
    pub sanskrit: String,
    pub english: String,
    pub start_page: String,
    pub video_id: String,
    pub pdf_link: String,
}

impl<'de> Deserialize<'de> for VerseTuple {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (sanskrit, english, start_page, video_id, pdf_link) =
            <(String, String, String, String, String)>::deserialize(deserializer)?;
        Ok(Self {
            sanskrit,
            english,
            start_page,
            video_id,
            pdf_link,
        })
    }
}

impl Serialize for VerseTuple {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (
            &self.sanskrit,
            &self.english,
            &self.start_page,
            &self.video_id,
            &self.pdf_link,
        )
            .serialize(serializer)
    }
}

/// One chapter as it appears on the wire: a chapter number and its verses
/// keyed by verse-number strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chapter {
    pub chapter: u32,
    #[serde(rename = "Shloka")]
    pub shloka: HashMap<String, VerseTuple>,
}

/// The full corpus, loaded once at startup and never mutated.
pub struct GitaDb {
    chapters: Vec<Chapter>,
    chapter_keys: Vec<String>,
    verse_keys_by_chapter: HashMap<String, Vec<String>>,
}

impl GitaDb {
    /// Build the corpus from already-deserialized chapters, validating shape
    /// and deriving the ordered key indexes.
    pub fn from_chapters(chapters: Vec<Chapter>) -> Result<Self> {
        ensure!(!chapters.is_empty(), "corpus contains no chapters");
        for chapter in &chapters {
            ensure!(
                chapter.chapter >= 1,
                "chapter number {} is out of range",
                chapter.chapter
            );
        }

        let chapter_keys: Vec<String> =
            chapters.iter().map(|c| c.chapter.to_string()).collect();

        let mut verse_keys_by_chapter = HashMap::new();
        for chapter in &chapters {
            let mut keys: Vec<String> = chapter.shloka.keys().cloned().collect();
            // Verse keys are numeric-looking strings; sort them numerically so
            // the picker lists read 1, 2, ..., 10 rather than 1, 10, 2.
            keys.sort_by_key(|k| (k.parse::<u32>().unwrap_or(u32::MAX), k.clone()));
            verse_keys_by_chapter.insert(chapter.chapter.to_string(), keys);
        }

        Ok(Self {
            chapters,
            chapter_keys,
            verse_keys_by_chapter,
        })
    }

    /// Load the corpus bundled into the binary. A malformed bundled asset is
    /// an unrecoverable startup error.
    pub fn bundled() -> Result<Self> {
        let chapters: Vec<Chapter> = serde_json::from_str(include_str!("../data/gita.json"))
            .context("bundled gita.json is malformed")?;
        Self::from_chapters(chapters)
    }

    /// Load a corpus file with the same shape as the bundled asset.
    pub async fn load_from_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read corpus file {}", path.display()))?;
        let chapters: Vec<Chapter> = serde_json::from_str(&content)
            .with_context(|| format!("corpus file {} is malformed", path.display()))?;
        Self::from_chapters(chapters)
    }

    /// Two exact-match lookups: chapter by stringified-integer equality, then
    /// verse by string key. Pure; a miss is `None`, never an error.
    pub fn lookup(&self, chapter_key: &str, verse_key: &str) -> Option<&VerseTuple> {
        self.chapters
            .iter()
            .find(|c| c.chapter.to_string() == chapter_key)
            .and_then(|c| c.shloka.get(verse_key))
    }

    /// Chapter numbers as strings, in corpus order.
    pub fn chapter_keys(&self) -> &[String] {
        &self.chapter_keys
    }

    /// Verse keys of one chapter, numerically sorted. Unknown chapters yield
    /// an empty slice.
    pub fn verse_keys(&self, chapter_key: &str) -> &[String] {
        self.verse_keys_by_chapter
            .get(chapter_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn verse_count(&self, chapter_key: &str) -> usize {
        self.verse_keys(chapter_key).len()
    }
}

/// Keep the keys containing `query` as a substring, preserving input order.
/// Keys are numeric strings, so matching is case-sensitive by construction.
/// An empty query keeps everything.
pub fn filter_keys(keys: &[String], query: &str) -> Vec<String> {
    keys.iter().filter(|k| k.contains(query)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_db() -> GitaDb {
        let json = r#"[
            {"chapter": 1, "Shloka": {
                "1": ["स्रोतः", "source", "2", "vidA", "https://example.com/1.pdf"],
                "47": ["संस्कृत", "english", "p1", "vid1", "link1"]
            }},
            {"chapter": 2, "Shloka": {
                "2": ["क", "a", "10", "vidB", "https://example.com/2.pdf"],
                "10": ["ख", "b", "11", "vidB", "https://example.com/2.pdf"],
                "3": ["ग", "c", "12", "vidB", "https://example.com/2.pdf"]
            }}
        ]"#;
        let chapters: Vec<Chapter> = serde_json::from_str(json).unwrap();
        GitaDb::from_chapters(chapters).unwrap()
    }

    #[test]
    fn verse_tuple_wire_format_is_a_five_element_array() {
        let json = r#"["sanskrit", "english", "12", "vid", "https://example.com/x.pdf"]"#;
        let tuple: VerseTuple = serde_json::from_str(json).unwrap();
        assert_eq!(tuple.sanskrit, "sanskrit");
        assert_eq!(tuple.english, "english");
        assert_eq!(tuple.start_page, "12");
        assert_eq!(tuple.video_id, "vid");
        assert_eq!(tuple.pdf_link, "https://example.com/x.pdf");

        let round_tripped = serde_json::to_string(&tuple).unwrap();
        assert_eq!(
            round_tripped,
            r#"["sanskrit","english","12","vid","https://example.com/x.pdf"]"#
        );
    }

    #[test]
    fn verse_tuple_rejects_wrong_arity() {
        let json = r#"["sanskrit", "english", "12"]"#;
        assert!(serde_json::from_str::<VerseTuple>(json).is_err());
    }

    #[test]
    fn lookup_is_pure() {
        let db = sample_db();
        let first = db.lookup("1", "47").cloned();
        let second = db.lookup("1", "47").cloned();
        assert_eq!(first, second);
        assert_eq!(first.unwrap().english, "english");
    }

    #[test]
    fn lookup_missing_chapter_returns_none() {
        let db = sample_db();
        assert!(db.lookup("99", "1").is_none());
    }

    #[test]
    fn lookup_missing_verse_returns_none() {
        let db = sample_db();
        assert!(db.lookup("1", "99").is_none());
    }

    #[test]
    fn verse_keys_are_sorted_numerically() {
        let db = sample_db();
        assert_eq!(db.verse_keys("2"), ["2", "3", "10"]);
    }

    #[test]
    fn verse_keys_of_unknown_chapter_are_empty() {
        let db = sample_db();
        assert!(db.verse_keys("42").is_empty());
    }

    #[test]
    fn chapter_keys_preserve_corpus_order() {
        let db = sample_db();
        assert_eq!(db.chapter_keys(), ["1", "2"]);
    }

    #[test]
    fn empty_query_keeps_all_keys() {
        let keys = vec!["1".to_string(), "2".to_string(), "11".to_string()];
        assert_eq!(filter_keys(&keys, ""), keys);
    }

    #[test]
    fn filter_is_substring_match_in_input_order() {
        let keys: Vec<String> = ["1", "2", "11", "21"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter_keys(&keys, "1"), ["1", "11", "21"]);
    }

    #[test]
    fn filter_with_no_matches_is_empty() {
        let keys: Vec<String> = ["1", "2"].iter().map(|s| s.to_string()).collect();
        assert!(filter_keys(&keys, "9").is_empty());
    }

    #[test]
    fn bundled_corpus_loads_and_has_the_default_verse() {
        let db = GitaDb::bundled().unwrap();
        let verse = db.lookup("1", "47").unwrap();
        assert!(!verse.sanskrit.is_empty());
        assert!(!verse.english.is_empty());
    }

    #[tokio::test]
    async fn corpus_file_round_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"[{"chapter": 3, "Shloka": {"9": ["क", "a", "70", "vidC", "link"]}}]"#;
        file.write_all(json.as_bytes()).unwrap();

        let db = GitaDb::load_from_json(file.path()).await.unwrap();
        assert_eq!(db.chapter_keys(), ["3"]);
        assert_eq!(db.lookup("3", "9").unwrap().start_page, "70");
    }

    #[tokio::test]
    async fn malformed_corpus_file_fails_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"chapter": "one", "Shloka": {}}]"#).unwrap();

        assert!(GitaDb::load_from_json(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn missing_corpus_file_fails_loading() {
        assert!(GitaDb::load_from_json("/no/such/corpus.json").await.is_err());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(GitaDb::from_chapters(Vec::new()).is_err());
    }
}

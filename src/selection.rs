use crate::gita::{GitaDb, VerseTuple};

/// The verse shown before the user picks anything.
pub const DEFAULT_CHAPTER: &str = "1";
pub const DEFAULT_VERSE: &str = "47";

/// The single active chapter/verse selection. No history is kept; a new
/// selection replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub chapter: String,
    pub verse: String,
}

/// Result of a selection attempt. A miss is an explicit signal, not an
/// error: callers must not assume every call produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    Changed(VerseTuple),
    Unchanged,
}

/// Owns the corpus, the current selection, and the last published verse.
/// The selection is only ever mutated through `set_selection`, so the
/// published tuple can never go blank once initialized.
pub struct SelectionController {
    db: GitaDb,
    selection: Selection,
    published: VerseTuple,
}

impl SelectionController {
    /// Start at the given default. If that verse does not exist in the
    /// corpus, publish an all-empty placeholder rather than leaving fields
    /// undefined.
    pub fn with_default(db: GitaDb, chapter: &str, verse: &str) -> Self {
        let published = db.lookup(chapter, verse).cloned().unwrap_or_default();
        Self {
            db,
            selection: Selection {
                chapter: chapter.to_string(),
                verse: verse.to_string(),
            },
            published,
        }
    }

    /// Attempt to select `(chapter, verse)`. On a hit the selection and the
    /// published verse are replaced and the new tuple is returned; on a miss
    /// both are left untouched and `Unchanged` is returned.
    pub fn set_selection(&mut self, chapter: &str, verse: &str) -> SelectionUpdate {
        match self.db.lookup(chapter, verse) {
            Some(tuple) => {
                let tuple = tuple.clone();
                self.selection = Selection {
                    chapter: chapter.to_string(),
                    verse: verse.to_string(),
                };
                self.published = tuple.clone();
                SelectionUpdate::Changed(tuple)
            }
            None => SelectionUpdate::Unchanged,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn published(&self) -> &VerseTuple {
        &self.published
    }

    pub fn db(&self) -> &GitaDb {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gita::Chapter;

    fn tuple(sanskrit: &str, english: &str, page: &str, video: &str, pdf: &str) -> VerseTuple {
        VerseTuple {
            sanskrit: sanskrit.to_string(),
            english: english.to_string(),
            start_page: page.to_string(),
            video_id: video.to_string(),
            pdf_link: pdf.to_string(),
        }
    }

    fn sample_db() -> GitaDb {
        let json = r#"[
            {"chapter": 1, "Shloka": {
                "47": ["संस्कृत", "english", "p1", "vid1", "link1"]
            }},
            {"chapter": 2, "Shloka": {
                "47": ["कर्म", "duty", "54", "vid2", "link2"]
            }}
        ]"#;
        let chapters: Vec<Chapter> = serde_json::from_str(json).unwrap();
        GitaDb::from_chapters(chapters).unwrap()
    }

    #[test]
    fn initializes_with_the_default_verse() {
        let controller =
            SelectionController::with_default(sample_db(), DEFAULT_CHAPTER, DEFAULT_VERSE);
        assert_eq!(
            *controller.published(),
            tuple("संस्कृत", "english", "p1", "vid1", "link1")
        );
        assert_eq!(controller.selection().chapter, "1");
        assert_eq!(controller.selection().verse, "47");
    }

    #[test]
    fn falls_back_to_placeholder_when_default_is_missing() {
        let controller = SelectionController::with_default(sample_db(), "9", "9");
        assert_eq!(*controller.published(), VerseTuple::default());
        assert_eq!(controller.selection().chapter, "9");
    }

    #[test]
    fn valid_selection_updates_state_and_returns_the_tuple() {
        let mut controller =
            SelectionController::with_default(sample_db(), DEFAULT_CHAPTER, DEFAULT_VERSE);
        let update = controller.set_selection("2", "47");
        assert_eq!(
            update,
            SelectionUpdate::Changed(tuple("कर्म", "duty", "54", "vid2", "link2"))
        );
        assert_eq!(controller.selection().chapter, "2");
        assert_eq!(controller.published().english, "duty");
    }

    #[test]
    fn invalid_selection_leaves_state_untouched() {
        let mut controller =
            SelectionController::with_default(sample_db(), DEFAULT_CHAPTER, DEFAULT_VERSE);
        let before = controller.published().clone();

        let update = controller.set_selection("2", "99");
        assert_eq!(update, SelectionUpdate::Unchanged);
        assert_eq!(controller.selection().chapter, "1");
        assert_eq!(controller.selection().verse, "47");
        assert_eq!(*controller.published(), before);
    }
}

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::gita::{filter_keys, GitaDb, VerseTuple};
use crate::guide;
use crate::selection::{Selection, SelectionController, SelectionUpdate};

/// How long the guide pretends to think before answering.
pub const REPLY_DELAY: Duration = Duration::from_millis(1000);

const VIDEO_EMBED_URL: &str = "https://www.youtube.com/embed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chapters,
    Verses,
    Content,
    Chat,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Loading screen
    pub load_progress: u8,
    pub tick_count: u64,

    // Pickers: which chapter's verses are listed, the filter inputs, and the
    // filtered key lists. The picker chapter is presentation state; the
    // authoritative selection lives in the controller.
    pub picker_chapter: String,
    pub chapter_filter: String,
    pub verse_filter: String,
    pub filtered_chapters: Vec<String>,
    pub filtered_verses: Vec<String>,
    pub chapter_state: ListState,
    pub verse_state: ListState,

    // Verse content scrolling
    pub content_scroll: u16,
    pub content_height: u16,
    pub total_content_lines: u16,

    // Guide chat
    pub chat_input: String,
    pub chat_cursor: usize,
    pub chat_messages: Vec<ChatMessage>,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub reply_task: Option<JoinHandle<&'static str>>,
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub chapters_area: Option<Rect>,
    pub verses_area: Option<Rect>,
    pub content_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    // Data
    pub controller: SelectionController,
}

impl App {
    pub fn new(db: GitaDb, config: &Config) -> Self {
        let (chapter, verse) = config.default_selection();
        let chapter = chapter.to_string();
        let verse = verse.to_string();

        let controller = SelectionController::with_default(db, &chapter, &verse);
        let filtered_chapters = controller.db().chapter_keys().to_vec();
        let filtered_verses = controller.db().verse_keys(&chapter).to_vec();

        let mut chapter_state = ListState::default();
        if let Some(idx) = filtered_chapters.iter().position(|c| *c == chapter) {
            chapter_state.select(Some(idx));
        } else if !filtered_chapters.is_empty() {
            chapter_state.select(Some(0));
        }

        let mut verse_state = ListState::default();
        if let Some(idx) = filtered_verses.iter().position(|v| *v == verse) {
            verse_state.select(Some(idx));
        } else if !filtered_verses.is_empty() {
            verse_state.select(Some(0));
        }

        Self {
            should_quit: false,
            screen: Screen::Loading,
            input_mode: InputMode::Normal,
            focus: FocusPane::Chapters,

            load_progress: 0,
            tick_count: 0,

            picker_chapter: chapter,
            chapter_filter: String::new(),
            verse_filter: String::new(),
            filtered_chapters,
            filtered_verses,
            chapter_state,
            verse_state,

            content_scroll: 0,
            content_height: 0,
            total_content_lines: 0,

            chat_input: String::new(),
            chat_cursor: 0,
            chat_messages: vec![ChatMessage {
                role: ChatRole::Bot,
                content: guide::GREETING.to_string(),
            }],
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            reply_task: None,
            animation_frame: 0,

            chapters_area: None,
            verses_area: None,
            content_area: None,
            chat_area: None,

            controller,
        }
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    pub fn published(&self) -> &VerseTuple {
        self.controller.published()
    }

    // Picker helpers
    pub fn selected_chapter(&self) -> Option<&String> {
        self.chapter_state
            .selected()
            .and_then(|i| self.filtered_chapters.get(i))
    }

    pub fn selected_verse(&self) -> Option<&String> {
        self.verse_state
            .selected()
            .and_then(|i| self.filtered_verses.get(i))
    }

    pub fn chapters_nav_down(&mut self) {
        let len = self.filtered_chapters.len();
        if len > 0 {
            let i = self.chapter_state.selected().unwrap_or(0);
            self.chapter_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn chapters_nav_up(&mut self) {
        let i = self.chapter_state.selected().unwrap_or(0);
        self.chapter_state.select(Some(i.saturating_sub(1)));
    }

    pub fn chapters_nav_first(&mut self) {
        if !self.filtered_chapters.is_empty() {
            self.chapter_state.select(Some(0));
        }
    }

    pub fn chapters_nav_last(&mut self) {
        let len = self.filtered_chapters.len();
        if len > 0 {
            self.chapter_state.select(Some(len - 1));
        }
    }

    pub fn verses_nav_down(&mut self) {
        let len = self.filtered_verses.len();
        if len > 0 {
            let i = self.verse_state.selected().unwrap_or(0);
            self.verse_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn verses_nav_up(&mut self) {
        let i = self.verse_state.selected().unwrap_or(0);
        self.verse_state.select(Some(i.saturating_sub(1)));
    }

    pub fn verses_nav_first(&mut self) {
        if !self.filtered_verses.is_empty() {
            self.verse_state.select(Some(0));
        }
    }

    pub fn verses_nav_last(&mut self) {
        let len = self.filtered_verses.len();
        if len > 0 {
            self.verse_state.select(Some(len - 1));
        }
    }

    /// Enter on a chapter: list its verses. The displayed verse does not
    /// change until a verse is picked.
    pub fn apply_chapter(&mut self) {
        if let Some(chapter) = self.selected_chapter().cloned() {
            self.picker_chapter = chapter;
            self.verse_filter.clear();
            self.apply_verse_filter();
            self.focus = FocusPane::Verses;
        }
    }

    /// Enter on a verse: route through the selection controller. On a miss
    /// the previously published verse stays on screen.
    pub fn apply_verse(&mut self) -> SelectionUpdate {
        let Some(verse) = self.selected_verse().cloned() else {
            return SelectionUpdate::Unchanged;
        };
        let chapter = self.picker_chapter.clone();
        let update = self.controller.set_selection(&chapter, &verse);
        if matches!(update, SelectionUpdate::Changed(_)) {
            self.content_scroll = 0;
        }
        update
    }

    pub fn apply_chapter_filter(&mut self) {
        self.filtered_chapters =
            filter_keys(self.controller.db().chapter_keys(), &self.chapter_filter);
        self.chapter_state.select(if self.filtered_chapters.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    pub fn apply_verse_filter(&mut self) {
        self.filtered_verses = filter_keys(
            self.controller.db().verse_keys(&self.picker_chapter),
            &self.verse_filter,
        );
        self.verse_state.select(if self.filtered_verses.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    /// Esc on a picker drops its filter. Returns whether anything changed.
    pub fn clear_focused_filter(&mut self) -> bool {
        match self.focus {
            FocusPane::Chapters if !self.chapter_filter.is_empty() => {
                self.chapter_filter.clear();
                self.apply_chapter_filter();
                true
            }
            FocusPane::Verses if !self.verse_filter.is_empty() => {
                self.verse_filter.clear();
                self.apply_verse_filter();
                true
            }
            _ => false,
        }
    }

    // Content scrolling
    pub fn scroll_down(&mut self) {
        if self.content_scroll < self.total_content_lines.saturating_sub(self.content_height) {
            self.content_scroll = self.content_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.content_height / 2;
        let max_scroll = self.total_content_lines.saturating_sub(self.content_height);
        self.content_scroll = (self.content_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.content_height / 2;
        self.content_scroll = self.content_scroll.saturating_sub(half_page);
    }

    // Guide chat
    /// Submit the typed question. While a reply is pending, further submits
    /// are ignored so overlapping sends can never produce two replies.
    /// Returns whether the message was accepted.
    pub fn submit_chat(&mut self) -> bool {
        if self.chat_input.trim().is_empty() || self.reply_task.is_some() {
            return false;
        }

        let question = self.chat_input.clone();
        self.chat_messages.push(ChatMessage {
            role: ChatRole::User,
            content: question.clone(),
        });
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.animation_frame = 0;

        self.reply_task = Some(tokio::spawn(async move {
            tokio::time::sleep(REPLY_DELAY).await;
            guide::respond(&question)
        }));

        self.scroll_chat_to_bottom();
        true
    }

    /// Collect a finished reply, if any. Called from the main loop; the
    /// await is immediate because the task is already finished.
    pub async fn poll_reply(&mut self) {
        if self.reply_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.reply_task.take() {
                let reply = task.await.unwrap_or(guide::FALLBACK);
                self.chat_messages.push(ChatMessage {
                    role: ChatRole::Bot,
                    content: reply.to_string(),
                });
                self.scroll_chat_to_bottom();
            }
        }
    }

    /// Cancel a pending reply on quit.
    pub fn abort_pending_reply(&mut self) {
        if let Some(task) = self.reply_task.take() {
            task.abort();
        }
    }

    pub fn chat_scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn chat_scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    /// Scroll the chat so the newest message (or the thinking indicator) is
    /// visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.chat_messages {
            total_lines += 1; // Role line
            for line in msg.content.lines() {
                // Character count, not byte length, for UTF-8 text
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        // Room for the role line plus "Thinking..."
        total_lines += 2;

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            10
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    // External links: the identifiers are opaque strings passed through
    // unmodified; only the video id is spliced into the fixed embed URL.
    pub fn video_url(&self) -> Option<String> {
        let id = &self.published().video_id;
        if id.is_empty() {
            None
        } else {
            Some(format!("{VIDEO_EMBED_URL}/{id}?rel=0&showinfo=0&controls=1"))
        }
    }

    pub fn open_video(&self) {
        if let Some(url) = self.video_url() {
            let _ = open::that_detached(url);
        }
    }

    pub fn open_pdf(&self) {
        let link = &self.published().pdf_link;
        if !link.is_empty() {
            let _ = open::that_detached(link);
        }
    }

    /// Timer tick: advance the loader, or the thinking animation.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        match self.screen {
            Screen::Loading => {
                if self.load_progress >= 100 {
                    self.screen = Screen::Dashboard;
                } else {
                    self.load_progress = (self.load_progress + 2).min(100);
                }
            }
            Screen::Dashboard => {
                if self.reply_task.is_some() && self.tick_count % 6 == 0 {
                    self.animation_frame = (self.animation_frame + 1) % 3;
                }
            }
        }
    }

    /// Skip the rest of the loading animation.
    pub fn finish_loading(&mut self) {
        self.load_progress = 100;
        self.screen = Screen::Dashboard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gita::Chapter;

    fn test_app() -> App {
        let json = r#"[
            {"chapter": 1, "Shloka": {
                "1": ["श्लोक", "verse one", "2", "vidA", "linkA"],
                "47": ["संस्कृत", "english", "p1", "vid1", "link1"]
            }},
            {"chapter": 2, "Shloka": {
                "47": ["कर्म", "duty", "54", "vid2", "link2"]
            }}
        ]"#;
        let chapters: Vec<Chapter> = serde_json::from_str(json).unwrap();
        let db = GitaDb::from_chapters(chapters).unwrap();
        App::new(db, &Config::new())
    }

    #[test]
    fn starts_on_the_loading_screen_with_the_default_verse_published() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Loading);
        assert_eq!(app.published().english, "english");
        assert_eq!(app.selection().verse, "47");
    }

    #[test]
    fn loader_ticks_through_to_the_dashboard() {
        let mut app = test_app();
        for _ in 0..60 {
            app.tick();
        }
        assert_eq!(app.screen, Screen::Dashboard);
        assert_eq!(app.load_progress, 100);
    }

    #[test]
    fn applying_a_verse_publishes_it() {
        let mut app = test_app();
        app.chapter_state.select(Some(1)); // chapter "2"
        app.apply_chapter();
        assert_eq!(app.picker_chapter, "2");
        assert_eq!(app.filtered_verses, ["47"]);

        let update = app.apply_verse();
        assert!(matches!(update, SelectionUpdate::Changed(_)));
        assert_eq!(app.published().english, "duty");
    }

    #[test]
    fn chapter_filter_narrows_the_picker() {
        let mut app = test_app();
        app.chapter_filter.push('1');
        app.apply_chapter_filter();
        assert_eq!(app.filtered_chapters, ["1"]);

        app.chapter_filter.clear();
        app.apply_chapter_filter();
        assert_eq!(app.filtered_chapters, ["1", "2"]);
    }

    #[test]
    fn video_url_uses_the_fixed_embed_template() {
        let app = test_app();
        assert_eq!(
            app.video_url().unwrap(),
            "https://www.youtube.com/embed/vid1?rel=0&showinfo=0&controls=1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pending_reply_blocks_further_submits() {
        let mut app = test_app();

        app.chat_input = "tell me about karma".to_string();
        assert!(app.submit_chat());
        assert_eq!(app.chat_messages.len(), 2); // greeting + user

        // A second send while the reply is pending is ignored.
        app.chat_input = "dharma".to_string();
        assert!(!app.submit_chat());
        assert_eq!(app.chat_messages.len(), 2);

        tokio::time::sleep(REPLY_DELAY * 2).await;
        app.poll_reply().await;
        assert_eq!(app.chat_messages.len(), 3);
        assert_eq!(
            app.chat_messages.last().unwrap().content,
            guide::respond("tell me about karma")
        );

        // Once the reply landed, sends are accepted again.
        app.chat_input = "dharma".to_string();
        assert!(app.submit_chat());
    }

    #[tokio::test]
    async fn blank_input_is_not_submitted() {
        let mut app = test_app();
        app.chat_input = "   ".to_string();
        assert!(!app.submit_chat());
        assert_eq!(app.chat_messages.len(), 1);
    }
}

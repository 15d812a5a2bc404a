use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string edits.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Any key skips the rest of the loading animation
    if app.screen == Screen::Loading {
        app.finish_loading();
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Focus cycling
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Chapters => FocusPane::Verses,
                FocusPane::Verses => FocusPane::Content,
                FocusPane::Content => FocusPane::Chat,
                FocusPane::Chat => FocusPane::Chapters,
            };
        }
        KeyCode::BackTab => {
            app.focus = match app.focus {
                FocusPane::Chapters => FocusPane::Chat,
                FocusPane::Verses => FocusPane::Chapters,
                FocusPane::Content => FocusPane::Verses,
                FocusPane::Chat => FocusPane::Content,
            };
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Chapters => app.chapters_nav_down(),
            FocusPane::Verses => app.verses_nav_down(),
            FocusPane::Content => app.scroll_down(),
            FocusPane::Chat => app.chat_scroll_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Chapters => app.chapters_nav_up(),
            FocusPane::Verses => app.verses_nav_up(),
            FocusPane::Content => app.scroll_up(),
            FocusPane::Chat => app.chat_scroll_up(),
        },
        KeyCode::Char('g') => match app.focus {
            FocusPane::Chapters => app.chapters_nav_first(),
            FocusPane::Verses => app.verses_nav_first(),
            FocusPane::Content => app.content_scroll = 0,
            FocusPane::Chat => app.chat_scroll = 0,
        },
        KeyCode::Char('G') => match app.focus {
            FocusPane::Chapters => app.chapters_nav_last(),
            FocusPane::Verses => app.verses_nav_last(),
            FocusPane::Content => {
                app.content_scroll = app
                    .total_content_lines
                    .saturating_sub(app.content_height);
            }
            FocusPane::Chat => app.scroll_chat_to_bottom(),
        },

        // Half-page scroll for the verse panel
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus == FocusPane::Content {
                app.scroll_half_page_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus == FocusPane::Content {
                app.scroll_half_page_up();
            }
        }

        // Select
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => match app.focus {
            FocusPane::Chapters => app.apply_chapter(),
            FocusPane::Verses => {
                // A miss keeps the previous verse on screen
                let _ = app.apply_verse();
            }
            FocusPane::Content | FocusPane::Chat => {}
        },

        // Back from the verse list to the chapter list
        KeyCode::Char('h') | KeyCode::Left => {
            if app.focus == FocusPane::Verses {
                app.focus = FocusPane::Chapters;
            }
        }

        // Filter the focused picker
        KeyCode::Char('/') => {
            if matches!(app.focus, FocusPane::Chapters | FocusPane::Verses) {
                app.input_mode = InputMode::Editing;
            }
        }

        // Type a chat message
        KeyCode::Char('i') => {
            app.focus = FocusPane::Chat;
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
        }

        // External references for the displayed verse
        KeyCode::Char('o') => {
            if app.focus == FocusPane::Content {
                app.open_video();
            }
        }
        KeyCode::Char('p') => {
            if app.focus == FocusPane::Content {
                app.open_pdf();
            }
        }

        KeyCode::Esc => {
            app.clear_focused_filter();
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.focus {
        FocusPane::Chapters | FocusPane::Verses => handle_filter_editing(app, key),
        FocusPane::Chat => handle_chat_editing(app, key),
        FocusPane::Content => app.input_mode = InputMode::Normal,
    }
}

/// Picker filters re-apply on every keystroke.
fn handle_filter_editing(app: &mut App, key: KeyEvent) {
    let on_chapters = app.focus == FocusPane::Chapters;
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if on_chapters {
                app.chapter_filter.pop();
                app.apply_chapter_filter();
            } else {
                app.verse_filter.pop();
                app.apply_verse_filter();
            }
        }
        KeyCode::Char(c) => {
            if on_chapters {
                app.chapter_filter.push(c);
                app.apply_chapter_filter();
            } else {
                app.verse_filter.push(c);
                app.apply_verse_filter();
            }
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // Ignored while a reply is pending; the input stays put
            app.submit_chat();
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle.
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen == Screen::Loading {
        return;
    }

    let x = mouse.column;
    let y = mouse.row;

    let in_chapters = app.chapters_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_verses = app.verses_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_content = app.content_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chapters {
                app.chapters_nav_down();
            } else if in_verses {
                app.verses_nav_down();
            } else if in_content {
                app.scroll_down();
                app.scroll_down();
                app.scroll_down();
            } else if in_chat {
                app.chat_scroll = app.chat_scroll.saturating_add(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chapters {
                app.chapters_nav_up();
            } else if in_verses {
                app.verses_nav_up();
            } else if in_content {
                app.scroll_up();
                app.scroll_up();
                app.scroll_up();
            } else if in_chat {
                app.chat_scroll = app.chat_scroll.saturating_sub(3);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gita::{Chapter, GitaDb};

    fn test_app() -> App {
        let json = r#"[
            {"chapter": 1, "Shloka": {
                "1": ["श्लोक", "verse one", "2", "vidA", "linkA"],
                "47": ["संस्कृत", "english", "p1", "vid1", "link1"]
            }}
        ]"#;
        let chapters: Vec<Chapter> = serde_json::from_str(json).unwrap();
        let db = GitaDb::from_chapters(chapters).unwrap();
        let mut app = App::new(db, &Config::new());
        app.finish_loading();
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::from(code));
    }

    #[test]
    fn any_key_skips_the_loader() {
        let json = r#"[{"chapter": 1, "Shloka": {"1": ["क", "a", "2", "v", "l"]}}]"#;
        let chapters: Vec<Chapter> = serde_json::from_str(json).unwrap();
        let mut app = App::new(GitaDb::from_chapters(chapters).unwrap(), &Config::new());

        assert_eq!(app.screen, Screen::Loading);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn tab_cycles_every_pane() {
        let mut app = test_app();
        assert_eq!(app.focus, FocusPane::Chapters);
        for expected in [
            FocusPane::Verses,
            FocusPane::Content,
            FocusPane::Chat,
            FocusPane::Chapters,
        ] {
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.focus, expected);
        }
    }

    #[test]
    fn slash_edits_the_focused_picker_filter() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Editing);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.chapter_filter, "1");
        assert_eq!(app.filtered_chapters, ["1"]);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn escape_clears_a_picker_filter() {
        let mut app = test_app();
        app.chapter_filter = "9".to_string();
        app.apply_chapter_filter();
        assert!(app.filtered_chapters.is_empty());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.filtered_chapters, ["1"]);
    }

    #[test]
    fn chat_editing_keeps_the_cursor_on_char_boundaries() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        for c in "धर्म?".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.chat_input, "धर्म?");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.chat_input, "धर्");
    }
}

use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Gauge, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
    Frame,
};

use crate::app::{App, ChatRole, FocusPane, InputMode, Screen};

/// Petal glyphs cycled by the loader and the chat spinner.
const PETALS: &[&str] = &["✻", "✼", "❋", "✽"];

const QUOTE_SANSKRIT: &str = "\"कर्मण्येवाधिकारस्ते मा फलेषु कदाचन।\"";
const QUOTE_ENGLISH: &str = "\"You have a right to perform your prescribed duties, \
    but you are not entitled to the fruits of your actions.\"";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    if app.screen == Screen::Loading {
        render_loading(app, frame, area);
        return;
    }

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_dashboard(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(10),
        Constraint::Min(0),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(64),
        Constraint::Min(0),
    ])
    .areas(middle);

    let [text_area, gauge_area] =
        Layout::vertical([Constraint::Length(8), Constraint::Length(1)]).areas(center);

    let petal = PETALS[(app.tick_count as usize / 3) % PETALS.len()];
    let ring = format!("{petal}  {petal}   ॐ   {petal}  {petal}");

    let lines = vec![
        Line::from(Span::styled(
            "भगवद्गीता",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Bhagavad Gita Dashboard",
            Style::default().fg(Color::Yellow),
        )),
        Line::default(),
        Line::from(Span::styled(ring, Style::default().fg(Color::LightYellow))),
        Line::default(),
        Line::from(Span::styled(
            QUOTE_SANSKRIT,
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            QUOTE_ENGLISH,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let welcome = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(welcome, text_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
        .ratio(f64::from(app.load_progress) / 100.0)
        .label(format!("{}%", app.load_progress));
    frame.render_widget(gauge, gauge_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let selection = app.selection();
    let title = Line::from(vec![
        Span::styled(
            " भगवद्गीता ",
            Style::default().fg(Color::Yellow).bold(),
        ),
        Span::styled("Bhagavad Gita Dashboard ", Style::default().fg(Color::White)),
        Span::styled(
            format!("Chapter {} • Verse {} ", selection.chapter, selection.verse),
            Style::default().fg(Color::Black),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Chat) => " ASK ",
        (InputMode::Editing, _) => " FILTER ",
        (InputMode::Normal, _) => " BROWSE ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Chat) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (InputMode::Editing, _) => vec![
            Span::styled(" type ", key_style),
            Span::styled(" filter ", label_style),
            Span::styled(" Enter/Esc ", key_style),
            Span::styled(" done ", label_style),
        ],
        (InputMode::Normal, focus) => {
            let mut hints = vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(
                    match focus {
                        FocusPane::Chapters | FocusPane::Verses => " nav ",
                        FocusPane::Content | FocusPane::Chat => " scroll ",
                    },
                    label_style,
                ),
            ];
            match focus {
                FocusPane::Chapters | FocusPane::Verses => {
                    hints.extend(vec![
                        Span::styled(" Enter ", key_style),
                        Span::styled(" select ", label_style),
                        Span::styled(" / ", key_style),
                        Span::styled(" filter ", label_style),
                    ]);
                }
                FocusPane::Content => {
                    hints.extend(vec![
                        Span::styled(" o ", key_style),
                        Span::styled(" video ", label_style),
                        Span::styled(" p ", key_style),
                        Span::styled(" PDF ", label_style),
                    ]);
                }
                FocusPane::Chat => {}
            }
            hints.extend(vec![
                Span::styled(" i ", key_style),
                Span::styled(" ask ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [pickers_area, main_area] =
        Layout::horizontal([Constraint::Length(24), Constraint::Min(0)]).areas(area);
    let [chapters_area, verses_area] =
        Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(pickers_area);
    let [content_area, chat_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(12)]).areas(main_area);

    // Store areas for mouse hit-testing
    app.chapters_area = Some(chapters_area);
    app.verses_area = Some(verses_area);
    app.content_area = Some(content_area);
    app.chat_area = Some(chat_area);

    render_chapter_picker(app, frame, chapters_area);
    render_verse_picker(app, frame, verses_area);
    render_verse_panel(app, frame, content_area);
    render_chat(app, frame, chat_area);
}

fn picker_title(name: &str, filter: &str, editing: bool) -> String {
    if editing {
        format!(" {name} /{filter}▌ ")
    } else if !filter.is_empty() {
        format!(" {name} /{filter} ")
    } else {
        format!(" {name} ")
    }
}

fn render_chapter_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Chapters;
    let editing = focused && app.input_mode == InputMode::Editing;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let items: Vec<ListItem> = app
        .filtered_chapters
        .iter()
        .map(|c| ListItem::new(format!("Chapter {c}")))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(picker_title("Chapters", &app.chapter_filter, editing)),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.chapter_state);
}

fn render_verse_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Verses;
    let editing = focused && app.input_mode == InputMode::Editing;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let name = format!("Verses (Ch {})", app.picker_chapter);
    let items: Vec<ListItem> = app
        .filtered_verses
        .iter()
        .map(|v| ListItem::new(format!("Verse {v}")))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(picker_title(&name, &app.verse_filter, editing)),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.verse_state);
}

fn render_verse_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Content;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    let selection = app.selection().clone();
    let verse = app.published().clone();

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "Sanskrit",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    if verse.sanskrit.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no verse loaded)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for text_line in verse.sanskrit.lines() {
            lines.push(Line::raw(text_line.to_string()));
        }
    }
    lines.push(Line::default());

    lines.push(Line::from(Span::styled(
        "English Translation",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    if verse.english.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no translation loaded)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for text_line in verse.english.lines() {
            lines.push(Line::raw(text_line.to_string()));
        }
    }
    lines.push(Line::default());

    let mut refs: Vec<Span> = Vec::new();
    if !verse.start_page.is_empty() {
        refs.push(Span::styled(
            format!("Page {}", verse.start_page),
            Style::default().fg(Color::Gray),
        ));
    }
    if !verse.video_id.is_empty() {
        if !refs.is_empty() {
            refs.push(Span::raw("   "));
        }
        refs.push(Span::styled("♪ chant video (o)", Style::default().fg(Color::Cyan)));
    }
    if !verse.pdf_link.is_empty() {
        if !refs.is_empty() {
            refs.push(Span::raw("   "));
        }
        refs.push(Span::styled("PDF (p)", Style::default().fg(Color::Cyan)));
    }
    if !refs.is_empty() {
        lines.push(Line::from(refs));
    }

    // Estimate wrapped height so scrolling can clamp to the real extent
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let mut total: u16 = 0;
    for line in &lines {
        let char_count = line.width();
        if char_count == 0 {
            total += 1;
        } else {
            total += ((char_count / inner_width) + 1) as u16;
        }
    }
    app.total_content_lines = total;
    app.content_height = area.height.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(
            " Sacred Scripture  Chapter {} • Verse {} ",
            selection.chapter, selection.verse
        ));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll, 0));

    frame.render_widget(paragraph, area);

    if app.total_content_lines > app.content_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.total_content_lines as usize)
            .position(app.content_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Chat;
    let editing = focused && app.input_mode == InputMode::Editing;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat dimensions for scroll calculations (inner size minus borders)
    app.chat_height = messages_area.height.saturating_sub(2);
    app.chat_width = messages_area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.chat_messages {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
            }
            ChatRole::Bot => {
                lines.push(Line::from(Span::styled(
                    "Guide:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
            }
        }
        for text_line in msg.content.lines() {
            lines.push(Line::raw(text_line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.reply_task.is_some() {
        lines.push(Line::from(Span::styled(
            "Guide:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{dots}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let messages = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Gita Guide "),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(messages, messages_area);

    // Input line with horizontal scrolling so the cursor stays visible
    let input_border = if editing { Color::Yellow } else { Color::DarkGray };
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(input_border))
                .title(" Ask about the Gita (i to type) "),
        );

    frame.render_widget(input, input_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

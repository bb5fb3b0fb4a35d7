use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, ChatRole, FocusPane, InputMode, LoginField, NoticeKind, Screen};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    match app.screen {
        Screen::Login => render_login_screen(app, frame, area),
        Screen::Workspace => render_workspace(app, frame, area),
    }
}

fn render_login_screen(app: &App, frame: &mut Frame, area: Rect) {
    let card_width = 46.min(area.width.saturating_sub(4));
    let card_height = 9u16.min(area.height.saturating_sub(2));

    let card_x = (area.width.saturating_sub(card_width)) / 2;
    let card_y = (area.height.saturating_sub(card_height)) / 2;
    let card_area = Rect::new(card_x, card_y, card_width, card_height);

    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Insights ");

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let intro = Paragraph::new("Sign in to your analytics workspace")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(intro, Rect::new(inner.x, inner.y, inner.width, 1));

    let field_style = |field: LoginField| {
        if app.login_field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let username_line = Line::from(vec![
        Span::styled("Username: ", field_style(LoginField::Username)),
        Span::styled(app.username_input.as_str(), Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(
        Paragraph::new(username_line),
        Rect::new(inner.x, inner.y + 2, inner.width, 1),
    );

    // Never echo the password itself
    let masked = "*".repeat(app.password_input.chars().count());
    let password_line = Line::from(vec![
        Span::styled("Password: ", field_style(LoginField::Password)),
        Span::styled(masked, Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(
        Paragraph::new(password_line),
        Rect::new(inner.x, inner.y + 4, inner.width, 1),
    );

    let hints = Paragraph::new("Enter sign in | Tab switch field | Ctrl-C quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, Rect::new(inner.x, inner.y + 6, inner.width, 1));

    // Cursor at the end of the focused field
    let (cursor_row, cursor_col) = match app.login_field {
        LoginField::Username => (inner.y + 2, app.username_input.chars().count() as u16),
        LoginField::Password => (inner.y + 4, app.password_input.chars().count() as u16),
    };
    frame.set_cursor_position((inner.x + 10 + cursor_col, cursor_row));

    // Login outcome notice below the card
    if let Some(notice) = &app.notice {
        let notice_y = card_y + card_height + 1;
        if notice_y < area.height {
            let style = notice_style(notice.kind);
            let text = Paragraph::new(notice.text.as_str())
                .style(style)
                .centered();
            frame.render_widget(text, Rect::new(area.x, notice_y, area.width, 1));
        }
    }
}

fn render_workspace(app: &mut App, frame: &mut Frame, area: Rect) {
    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // Body: chat panel with the drive sidebar on the right
    let [chat_area, files_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(34),
    ])
    .areas(body_area);

    render_chat_panel(app, frame, chat_area);
    render_files_sidebar(app, frame, files_area);
    render_footer(app, frame, footer_area);

    if app.show_upload_input {
        render_upload_prompt(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let file_count = app.files.len();
    let files_indicator = if file_count > 0 {
        format!(" [{} files]", file_count)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" Insights ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(files_indicator, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_area_height = history_area.height.saturating_sub(2);
    app.chat_area_width = history_area.width.saturating_sub(2);

    let chat_focused = app.focus == FocusPane::Chat && app.input_mode == InputMode::Normal;
    let chat_border_color = if chat_focused { Color::Cyan } else { Color::DarkGray };

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(chat_border_color))
        .title(" Chat ");

    let chat_text = if app.chat_messages.is_empty() && !app.chat_pending {
        let mut lines = vec![
            Line::from(Span::styled(
                "Ask anything about your data...",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        if !app.suggestions.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Suggestions:",
                Style::default().fg(Color::DarkGray),
            )));
            for (i, question) in app.suggestions.iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {}. ", i + 1),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(question.as_str()),
                ]));
            }
        }
        Text::from(lines)
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.chat_messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Assistant:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                }
            }
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.chat_pending {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, history_area);

    // Input line at the bottom
    let input_border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message ('i' to type, Enter to send) ");

    // Calculate visible portion of input with horizontal scrolling
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
        .block(input_block);

    frame.render_widget(input, input_area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_files_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let files_focused = app.focus == FocusPane::Files && app.input_mode == InputMode::Normal;
    let border_color = if files_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Drive Files ({}) ", app.files.len()));

    if app.files_pending {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        let loading = Paragraph::new(format!("Working{}", dots))
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if app.files.is_empty() {
        let placeholder = Paragraph::new("No files found.\n\n'u' upload, 'r' refresh")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .files
        .iter()
        .map(|file| ListItem::new(format!(" {} ", file.name)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.files_state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // A live notice takes the footer over until it expires
    if let Some(notice) = &app.notice {
        let footer = Paragraph::new(notice.text.as_str()).style(notice_style(notice.kind));
        frame.render_widget(footer, area);
        return;
    }

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.show_upload_input {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else if app.input_mode == InputMode::Editing {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ]
    } else {
        let mut hints = vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(" refresh ", label_style),
            Span::styled(" u ", key_style),
            Span::styled(" upload ", label_style),
        ];
        if app.chat_messages.is_empty() && !app.suggestions.is_empty() {
            hints.extend(vec![
                Span::styled(" 1-3 ", key_style),
                Span::styled(" ask ", label_style),
            ]);
        }
        hints.extend(vec![
            Span::styled(" L ", key_style),
            Span::styled(" logout ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]);
        hints
    };

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}

fn render_upload_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Upload file ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Path to the file. Enter to upload, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input = Paragraph::new(app.upload_input.as_str())
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, Rect::new(inner.x, inner.y + 2, inner.width, 1));

    let cursor_x = app.upload_input.chars().count().min(inner.width as usize) as u16;
    frame.set_cursor_position((inner.x + cursor_x, inner.y + 2));
}

fn notice_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Info => Style::default().fg(Color::Green),
        NoticeKind::Error => Style::default().fg(Color::Red),
    }
}

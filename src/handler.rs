use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, FilesJob, FilesOutcome, FocusPane, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Login => handle_login_key(app, key),
        Screen::Workspace => handle_workspace_key(app, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    use crate::app::LoginField;

    match key.code {
        KeyCode::Esc => {
            app.dismiss_notice();
        }
        KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
            app.login_field = match app.login_field {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
        }
        KeyCode::Enter => {
            if app.attempt_login() {
                // Initial listing for the fresh session
                spawn_list(app);
            }
        }
        KeyCode::Backspace => {
            match app.login_field {
                LoginField::Username => {
                    app.username_input.pop();
                }
                LoginField::Password => {
                    app.password_input.pop();
                }
            };
        }
        KeyCode::Char(c) => match app.login_field {
            LoginField::Username => app.username_input.push(c),
            LoginField::Password => app.password_input.push(c),
        },
        _ => {}
    }
}

fn handle_workspace_key(app: &mut App, key: KeyEvent) {
    // Upload path prompt takes priority while open
    if app.show_upload_input {
        handle_upload_prompt(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_workspace_normal(app, key),
        InputMode::Editing => handle_chat_editing(app, key),
    }
}

fn handle_workspace_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Dismiss notice early
        KeyCode::Esc => app.dismiss_notice(),

        // Tab switches between chat and the drive sidebar
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Chat => FocusPane::Files,
                FocusPane::Files => FocusPane::Chat,
            };
        }

        // Enter editing mode for the chat input
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.focus = FocusPane::Chat;
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
        }

        // Scroll / navigate based on focus
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Chat => app.scroll_chat_down(),
            FocusPane::Files => app.files_nav_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Chat => app.scroll_chat_up(),
            FocusPane::Files => app.files_nav_up(),
        },
        KeyCode::Char('g') => {
            if app.focus == FocusPane::Chat {
                app.chat_scroll = 0;
            }
        }
        KeyCode::Char('G') => {
            if app.focus == FocusPane::Chat {
                app.scroll_chat_to_bottom();
            }
        }

        // Drive sidebar actions
        KeyCode::Char('r') => spawn_refresh(app),
        KeyCode::Char('u') => {
            if !app.files_pending {
                app.show_upload_input = true;
            }
        }

        // Suggested questions while the chat is empty
        KeyCode::Char(c @ '1'..='3') => {
            if app.chat_messages.is_empty() {
                let idx = (c as usize) - ('1' as usize);
                if let Some(question) = app.suggestions.get(idx).cloned() {
                    app.chat_input = question;
                    submit_chat(app);
                }
            }
        }

        // End the session
        KeyCode::Char('L') => app.logout(),

        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit_chat(app);
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

fn handle_upload_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_upload_input = false;
            app.upload_input.clear();
        }
        KeyCode::Enter => {
            if let Some(path) = app.begin_upload() {
                let api = app.api.clone();
                app.files_task = Some(tokio::spawn(async move {
                    let (confirmation, files) = api.upload_and_list(&path).await?;
                    Ok(FilesOutcome::Uploaded {
                        confirmation,
                        files,
                    })
                }));
            }
        }
        KeyCode::Backspace => {
            app.upload_input.pop();
        }
        KeyCode::Char(c) => {
            app.upload_input.push(c);
        }
        _ => {}
    }
}

/// Send the current chat input if accepted by the single-flight guard.
fn submit_chat(app: &mut App) {
    if let Some(text) = app.begin_chat_send() {
        let api = app.api.clone();
        app.chat_task = Some(tokio::spawn(async move { api.chat(&text).await }));
    }
}

fn spawn_list(app: &mut App) {
    if app.begin_files_job(FilesJob::List) {
        let api = app.api.clone();
        app.files_task = Some(tokio::spawn(async move {
            api.list_files().await.map(FilesOutcome::Listed)
        }));
    }
}

fn spawn_refresh(app: &mut App) {
    if app.begin_files_job(FilesJob::Refresh) {
        let api = app.api.clone();
        app.files_task = Some(tokio::spawn(async move {
            api.refresh_files().await.map(FilesOutcome::Refreshed)
        }));
    }
}

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use rand::seq::SliceRandom;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::{ApiClient, RemoteFile};
use crate::auth;

/// Pool of suggested questions; three are shown while the chat is empty.
pub const SUGGESTED_QUESTIONS: [&str; 12] = [
    "What are the key insights from the latest report?",
    "How is sales performance this month?",
    "Analyze recent market trends",
    "Which products are performing best?",
    "Show a summary of the financial data",
    "Identify growth opportunities",
    "Compare results with the previous quarter",
    "What are the main challenges identified?",
    "Analyze customer behavior",
    "Suggest improvements based on the data",
    "What is the forecast for the next period?",
    "Show the key performance indicators",
];

/// How many ticks a notice stays visible (ticks arrive every ~300ms).
const NOTICE_TICKS: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient, dismissible status line shown in the footer.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    ticks_left: u8,
}

/// The drive operation currently occupying the single files task slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesJob {
    List,
    Refresh,
    Upload,
}

/// Result of a finished drive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesOutcome {
    Listed(Vec<RemoteFile>),
    Refreshed(Vec<RemoteFile>),
    Uploaded {
        confirmation: String,
        /// None when the relist after a completed upload failed; the
        /// current snapshot stays as-is in that case.
        files: Option<Vec<RemoteFile>>,
    },
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Session gate state
    pub authenticated: bool,
    pub username_input: String,
    pub password_input: String,
    pub login_field: LoginField,

    // Chat state
    pub chat_messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input (chars)
    pub chat_pending: bool,
    pub chat_task: Option<JoinHandle<Result<String>>>,
    pub chat_scroll: u16,
    pub chat_area_height: u16, // Height of chat area for scroll calculations
    pub chat_area_width: u16,  // Width of chat area for wrap calculations
    pub suggestions: Vec<String>,

    // Drive sidebar state
    pub files: Vec<RemoteFile>,
    pub files_state: ListState,
    pub files_pending: bool,
    pub files_job: Option<FilesJob>,
    pub files_task: Option<JoinHandle<Result<FilesOutcome>>>,
    pub show_upload_input: bool,
    pub upload_input: String,

    // Transient notice
    pub notice: Option<Notice>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend client
    pub api: ApiClient,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Login,
            input_mode: InputMode::Normal,
            focus: FocusPane::Chat,

            authenticated: false,
            username_input: String::new(),
            password_input: String::new(),
            login_field: LoginField::Username,

            chat_messages: Vec::new(),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_pending: false,
            chat_task: None,
            chat_scroll: 0,
            chat_area_height: 0,
            chat_area_width: 0,
            suggestions: Vec::new(),

            files: Vec::new(),
            files_state: ListState::default(),
            files_pending: false,
            files_job: None,
            files_task: None,
            show_upload_input: false,
            upload_input: String::new(),

            notice: None,

            animation_frame: 0,

            api,
        }
    }

    // Session gate

    /// Attempt the placeholder login. On success the workspace opens and the
    /// caller should trigger the initial file listing.
    pub fn attempt_login(&mut self) -> bool {
        if auth::check_credentials(&self.username_input, &self.password_input) {
            self.authenticated = true;
            self.screen = Screen::Workspace;
            self.password_input.clear();
            self.pick_suggestions();
            self.notify(NoticeKind::Info, "Logged in");
            info!("session opened for {}", self.username_input);
            true
        } else {
            info!("login rejected");
            self.notify(NoticeKind::Error, auth::LOGIN_HINT);
            false
        }
    }

    /// End the session: abort in-flight request tasks and reset all
    /// session-scoped state (messages, file snapshot, inputs).
    pub fn logout(&mut self) {
        if let Some(task) = self.chat_task.take() {
            task.abort();
        }
        if let Some(task) = self.files_task.take() {
            task.abort();
        }

        let api = self.api.clone();
        *self = Self::new(api);
        self.notify(NoticeKind::Info, "Logged out");
        info!("session closed");
    }

    fn pick_suggestions(&mut self) {
        let mut rng = rand::thread_rng();
        self.suggestions = SUGGESTED_QUESTIONS
            .choose_multiple(&mut rng, 3)
            .map(|question| (*question).to_string())
            .collect();
    }

    // Chat session

    /// Accept the current chat input for sending: append the user message,
    /// clear the input, and mark the request pending. Returns the text to
    /// send, or None when the input is blank or a request is in flight
    /// (further sends are ignored, not queued).
    pub fn begin_chat_send(&mut self) -> Option<String> {
        if self.chat_pending {
            return None;
        }

        let text = self.chat_input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.chat_messages.push(ChatMessage {
            role: ChatRole::User,
            content: text.clone(),
        });
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.chat_pending = true;
        self.scroll_chat_to_bottom();
        Some(text)
    }

    /// Record the outcome of a chat request. The pending flag clears on
    /// every path; a failure appends nothing and raises a notice.
    pub fn finish_chat_send(&mut self, result: Result<String>) {
        self.chat_pending = false;
        match result {
            Ok(reply) => {
                self.chat_messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: reply,
                });
                self.scroll_chat_to_bottom();
            }
            Err(e) => {
                error!("chat request failed: {e:#}");
                self.notify(NoticeKind::Error, "Failed to send message. Try again.");
            }
        }
    }

    // Drive sidebar

    /// Claim the files task slot for a listing or refresh job. Returns false
    /// while another drive operation is in flight.
    pub fn begin_files_job(&mut self, job: FilesJob) -> bool {
        if self.files_pending {
            return false;
        }
        self.files_pending = true;
        self.files_job = Some(job);
        true
    }

    /// Take the upload path input and claim the task slot. The input is
    /// cleared whenever a path was entered, so the same selection cannot be
    /// silently resubmitted after either outcome.
    pub fn begin_upload(&mut self) -> Option<PathBuf> {
        if self.files_pending {
            return None;
        }

        let path = self.upload_input.trim().to_string();
        self.upload_input.clear();
        self.show_upload_input = false;
        if path.is_empty() {
            return None;
        }

        self.files_pending = true;
        self.files_job = Some(FilesJob::Upload);
        Some(PathBuf::from(path))
    }

    /// Apply a finished drive operation. Failures never touch the current
    /// snapshot; successes replace it wholesale.
    pub fn finish_files_job(&mut self, result: Result<FilesOutcome>) {
        self.files_pending = false;
        let job = self.files_job.take();

        match result {
            Ok(FilesOutcome::Listed(files)) => {
                self.replace_files(files);
            }
            Ok(FilesOutcome::Refreshed(files)) => {
                self.replace_files(files);
                self.notify(NoticeKind::Info, "Cache cleared");
            }
            Ok(FilesOutcome::Uploaded {
                confirmation,
                files,
            }) => match files {
                Some(files) => {
                    self.replace_files(files);
                    self.notify(NoticeKind::Info, &confirmation);
                }
                // The upload itself completed; only the relist failed.
                None => {
                    self.notify(
                        NoticeKind::Error,
                        "Uploaded, but failed to refresh the file list",
                    );
                }
            },
            Err(e) => {
                error!("drive operation failed: {e:#}");
                let text = match job {
                    Some(FilesJob::Refresh) => "Failed to refresh file list",
                    Some(FilesJob::Upload) => "Failed to upload file",
                    _ => "Failed to load drive files",
                };
                self.notify(NoticeKind::Error, text);
            }
        }
    }

    fn replace_files(&mut self, files: Vec<RemoteFile>) {
        self.files = files;
        if self.files.is_empty() {
            self.files_state.select(None);
        } else {
            let i = self
                .files_state
                .selected()
                .unwrap_or(0)
                .min(self.files.len() - 1);
            self.files_state.select(Some(i));
        }
    }

    pub fn files_nav_down(&mut self) {
        let len = self.files.len();
        if len > 0 {
            let i = self.files_state.selected().unwrap_or(0);
            self.files_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn files_nav_up(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = self.files_state.selected().unwrap_or(0);
        self.files_state.select(Some(i.saturating_sub(1)));
    }

    // Background task polling

    /// Drain finished request tasks into state transitions. Taking the
    /// handle before inspecting the result means every outcome, including a
    /// task panic, clears the corresponding pending flag.
    pub async fn poll_pending_tasks(&mut self) {
        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow!("chat task failed: {e}")),
                };
                self.finish_chat_send(result);
            }
        }

        if self.files_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.files_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow!("drive task failed: {e}")),
                };
                self.finish_files_job(result);
            }
        }
    }

    // Notices

    pub fn notify(&mut self, kind: NoticeKind, text: &str) {
        self.notice = Some(Notice {
            kind,
            text: text.to_string(),
            ticks_left: NOTICE_TICKS,
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Advance spinner and notice lifetimes (driven by the tick event).
    pub fn tick(&mut self) {
        if self.chat_pending || self.files_pending {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        if let Some(notice) = &mut self.notice {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }
    }

    // Chat scrolling

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    /// Scroll the chat so the latest message (or the pending indicator) is
    /// visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_area_width > 0 {
            self.chat_area_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.chat_messages {
            total_lines += 1; // Role line ("You:" or "Assistant:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat_pending {
            total_lines += 2; // "Assistant:" + "Thinking..."
        }

        let visible_height = if self.chat_area_height > 0 {
            self.chat_area_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

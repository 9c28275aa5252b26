use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use validator_core::{
    request_reply, spawn_reveal, ChatTransport, Config, IdeaSubmission, JudgementEntry,
    PendingSubmission, ProxyTransport, Reply, RevealEvent, RevealHandle, Session, SubmitError,
    ToneLevel, REVEAL_INTERVAL,
};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Tone,
    Submit,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Tone,
            FormField::Tone => FormField::Submit,
            FormField::Submit => FormField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Submit,
            FormField::Description => FormField::Title,
            FormField::Tone => FormField::Description,
            FormField::Submit => FormField::Tone,
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Editable text with a cursor counted in characters.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// (line, column) of the cursor, both in characters.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.value.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
        (line, col)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub focus: FormField,

    // Form state
    pub title: TextInput,
    pub description: TextInput,
    pub tone: ToneLevel,

    // Submission state
    pub session: Session,
    pub transport: Arc<dyn ChatTransport>,
    pub in_flight: Option<PendingSubmission>,

    // Typewriter state
    pub reveal_enabled: bool,
    pub reveal: Option<RevealHandle>,
    pub typing_text: String,

    // Result screen state
    pub history_state: ListState,
    pub transcript_scroll: u16,
    pub transcript_area: Option<Rect>,
    pub history_area: Option<Rect>,
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, events: UnboundedSender<AppEvent>) -> Self {
        let transport = Arc::new(ProxyTransport::new(&config.proxy_url()));
        Self::with_transport(config, transport, events)
    }

    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn ChatTransport>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Form,
            focus: FormField::Title,

            title: TextInput::default(),
            description: TextInput::default(),
            tone: ToneLevel::default(),

            session: Session::new(config.request_settings()),
            transport,
            in_flight: None,

            reveal_enabled: config.reveal_enabled(),
            reveal: None,
            typing_text: String::new(),

            history_state: ListState::default(),
            transcript_scroll: 0,
            transcript_area: None,
            history_area: None,
            status: None,

            animation_frame: 0,

            events,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Validates the form and sends it in the background. The outcome comes
    /// back as [`AppEvent::Completed`] as soon as the request resolves.
    ///
    /// Ignored while a request is in flight, like a disabled submit button.
    pub fn submit(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        self.status = None;
        self.cancel_reveal();

        let submission = IdeaSubmission::new(self.title.value(), self.description.value());
        let pending = match self.session.begin(&submission, self.tone) {
            Ok(pending) => pending,
            Err(e) => {
                debug!(error = %e, "submission not started");
                self.screen = Screen::Form;
                return;
            }
        };

        let transport = Arc::clone(&self.transport);
        let request = pending.request().clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = request_reply(transport.as_ref(), &request).await;
            if tx.send(AppEvent::Completed(outcome)).is_err() {
                debug!("event loop gone, dropping reply");
            }
        });

        self.in_flight = Some(pending);
        self.screen = Screen::Result;
        self.transcript_scroll = 0;
    }

    /// Records the outcome of the in-flight request.
    pub fn complete_submission(&mut self, outcome: Result<Reply, SubmitError>) {
        let Some(pending) = self.in_flight.take() else {
            debug!("completion without a request in flight");
            return;
        };

        let completed = self
            .session
            .complete(pending, outcome)
            .map(|entry| (entry.id, entry.reply_text.clone()));

        match completed {
            Ok((id, text)) => {
                self.history_state.select(Some(0));
                if self.reveal_enabled {
                    self.start_reveal(id, &text);
                } else {
                    self.session.finish_reveal(id);
                }
            }
            Err(_) => {
                // The error is shown under the form.
                self.screen = Screen::Form;
            }
        }
    }

    fn start_reveal(&mut self, id: i64, text: &str) {
        let tx = self.events.clone();
        self.typing_text.clear();
        self.reveal = Some(spawn_reveal(id, text, REVEAL_INTERVAL, move |event| {
            tx.send(AppEvent::Reveal(event)).is_ok()
        }));
    }

    fn cancel_reveal(&mut self) {
        if let Some(reveal) = self.reveal.take() {
            reveal.cancel();
            self.session.finish_reveal(reveal.id());
            self.typing_text.clear();
        }
    }

    /// Shows the reply being typed in full.
    pub fn skip_reveal(&mut self) {
        self.cancel_reveal();
        self.session.finish_all_reveals();
    }

    /// Applies a typewriter tick. Events from a cancelled reveal are ignored.
    pub fn apply_reveal(&mut self, event: RevealEvent) {
        let active = self.reveal.as_ref().map(|r| r.id());
        match event {
            RevealEvent::Progress { id, visible } if active == Some(id) => {
                self.typing_text = visible;
            }
            RevealEvent::Finished { id } if active == Some(id) => {
                self.session.finish_reveal(id);
                self.reveal = None;
                self.typing_text.clear();
            }
            stale => {
                debug!(?stale, "ignoring event from a cancelled reveal");
            }
        }
    }

    /// "Nova consulta": back to an empty form with no history.
    ///
    /// Ignored while a request is in flight, since it cannot be cancelled.
    pub fn start_new(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        self.cancel_reveal();
        self.session.start_new();
        self.title.clear();
        self.description.clear();
        self.typing_text.clear();
        self.history_state.select(None);
        self.transcript_scroll = 0;
        self.status = None;
        self.screen = Screen::Form;
        self.focus = FormField::Title;
    }

    /// Back to the form keeping history, to judge another idea.
    pub fn edit_form(&mut self) {
        self.screen = Screen::Form;
        self.focus = FormField::Title;
        self.status = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn selected_entry(&self) -> Option<&JudgementEntry> {
        self.history_state
            .selected()
            .and_then(|i| self.session.history().nth(i))
    }

    pub fn history_nav_down(&mut self) {
        let len = self.session.history().len();
        if len > 0 {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn history_nav_up(&mut self) {
        let i = self.history_state.selected().unwrap_or(0);
        self.history_state.select(Some(i.saturating_sub(1)));
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }
}

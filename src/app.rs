use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

use crate::api::{ApiClient, Complaint};
use crate::board::{ComplaintBoard, FormError, RequestPhase};

/// How long a status message stays on the info line
const STATUS_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Title,
    Body,
    Submit,
    List,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Title => Focus::Body,
            Focus::Body => Focus::Submit,
            Focus::Submit => Focus::List,
            Focus::List => Focus::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Title => Focus::List,
            Focus::Body => Focus::Title,
            Focus::Submit => Focus::Body,
            Focus::List => Focus::Submit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub board: ComplaintBoard,
    pub focus: Focus,
    pub popup: Popup,

    // List selection, tracked by render key so refreshes don't move it
    pub selected: usize,
    selected_key: Option<String>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Drives the progress bar animation
    pub frame_count: u64,
    pub should_quit: bool,

    last_save_phase: RequestPhase,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        Self {
            board: ComplaintBoard::new(client),
            focus: Focus::Title,
            popup: Popup::None,
            selected: 0,
            selected_key: None,
            status_message: None,
            status_message_time: None,
            frame_count: 0,
            should_quit: false,
            last_save_phase: RequestPhase::Idle,
        }
    }

    /// Mount the board, which starts the initial load
    pub fn start(&mut self) {
        self.board.mount();
    }

    /// Unmount the board, cancelling anything still in flight
    pub fn shutdown(&mut self) {
        self.board.unmount();
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
                self.popup = Popup::None;
            }
            return;
        }

        // Global keys, regardless of focus
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::F(1) => {
                self.popup = Popup::Help;
                return;
            }
            KeyCode::F(5) => {
                self.refresh();
                return;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Title => self.handle_title_key(key),
            Focus::Body => self.handle_body_key(key),
            Focus::Submit => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.submit();
                }
            }
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.focus = Focus::Body,
            KeyCode::Backspace => {
                self.board.form.title.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.board.form.title.push(c);
            }
            _ => {}
        }
    }

    fn handle_body_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.board.form.body.push('\n'),
            KeyCode::Backspace => {
                self.board.form.body.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.board.form.body.push(c);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    fn move_down(&mut self) {
        let len = self.board.complaints().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
        self.remember_selection();
    }

    fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.remember_selection();
    }

    fn remember_selection(&mut self) {
        // The list stays populated while a refresh is in flight
        self.selected_key = self
            .board
            .complaints()
            .get(self.selected)
            .map(|c| c.render_key(self.selected));
    }

    fn submit(&mut self) {
        match self.board.submit_complaint() {
            Ok(ticket) => {
                tracing::debug!("Submitted complaint as request #{}", ticket);
                self.last_save_phase = RequestPhase::InFlight;
            }
            Err(e) => {
                match e {
                    FormError::MissingTitle => self.focus = Focus::Title,
                    FormError::MissingBody => self.focus = Focus::Body,
                    FormError::SaveInFlight | FormError::NotMounted => {}
                }
                self.set_status(e.to_string());
            }
        }
    }

    /// Reload the list under the board's lifetime token
    fn refresh(&mut self) {
        if !self.board.is_mounted() {
            return;
        }
        self.board.load_complaints(self.board.lifetime_token());
        self.set_status("Refreshing complaints");
    }

    pub fn tick(&mut self) {
        self.frame_count = self.frame_count.wrapping_add(1);

        if self.board.drain_events() > 0 {
            self.selected = reselect(
                self.board.complaints(),
                self.selected_key.as_deref(),
                self.selected,
            );

            let phase = self.board.save_phase();
            if phase != self.last_save_phase && phase == RequestPhase::Completed {
                self.set_status("Complaint submitted");
                self.focus = Focus::Title;
            }
            self.last_save_phase = phase;
        }

        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

/// Find the entry with `key` in a freshly loaded list, falling back to the
/// old index clamped to the new length
fn reselect(complaints: &[Complaint], key: Option<&str>, fallback: usize) -> usize {
    if let Some(key) = key {
        if let Some(pos) = complaints
            .iter()
            .enumerate()
            .position(|(i, c)| c.render_key(i) == key)
        {
            return pos;
        }
    }
    fallback.min(complaints.len().saturating_sub(1))
}

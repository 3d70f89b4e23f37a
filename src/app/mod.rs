use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::store::NoteStore;
use crate::ui;

pub mod state;

pub use state::{AppState, EventModal, ModalField, ModalKind, SubmitOutcome};

enum Action {
    Quit,
    PreviousMonth,
    NextMonth,
    MoveDay(i16),
    JumpToday,
    CycleNote(isize),
    OpenCreate,
    OpenEdit,
    DeleteNote,
    ClearDay,
}

pub struct App {
    pub config: Arc<AppConfig>,
    state: AppState,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(config: Arc<AppConfig>, store: NoteStore) -> Self {
        let mut state = AppState::new(store);
        state.set_status_message(Some(
            "Enter add note • e edit • d delete • x clear day • q quit",
        ));
        Self {
            config,
            state,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| ui::draw_app(frame, &self.state, &self.config))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // next draw adapts to the new size
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_modal_key(key) {
            return;
        }
        if self.handle_confirm_key(key) {
            return;
        }

        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('p') | KeyCode::PageUp => Some(Action::PreviousMonth),
            KeyCode::Char('n') | KeyCode::PageDown => Some(Action::NextMonth),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::MoveDay(-1)),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::MoveDay(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveDay(-7)),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDay(7)),
            KeyCode::Char('t') => Some(Action::JumpToday),
            KeyCode::Tab => Some(Action::CycleNote(1)),
            KeyCode::BackTab => Some(Action::CycleNote(-1)),
            KeyCode::Enter | KeyCode::Char('a') => Some(Action::OpenCreate),
            KeyCode::Char('e') => Some(Action::OpenEdit),
            KeyCode::Char('d') => Some(Action::DeleteNote),
            KeyCode::Char('x') => Some(Action::ClearDay),
            _ => None,
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::PreviousMonth => {
                self.state.previous_month();
                self.state.set_status_message(None::<String>);
            }
            Action::NextMonth => {
                self.state.next_month();
                self.state.set_status_message(None::<String>);
            }
            Action::MoveDay(delta) => self.state.move_day(delta),
            Action::JumpToday => self.state.jump_to_today(),
            Action::CycleNote(delta) => self.state.cycle_note(delta),
            Action::OpenCreate => {
                self.state.open_create_modal();
                self.state
                    .set_status_message(Some("New event: Tab switches field • Enter saves"));
            }
            Action::OpenEdit => {
                if self.state.open_edit_modal() {
                    self.state
                        .set_status_message(Some("Editing event: Enter saves • Esc cancels"));
                } else {
                    self.state
                        .set_status_message(Some("No note on this day to edit"));
                }
            }
            Action::DeleteNote => self.handle_delete_note(),
            Action::ClearDay => {
                if self.config.confirm_clear_day {
                    self.state.request_clear_day();
                    if self.state.confirm_clear.is_some() {
                        self.state
                            .set_status_message(Some("Clear day: Enter confirm • Esc cancel"));
                    } else {
                        self.state.set_status_message(Some("Nothing to clear"));
                    }
                } else {
                    self.state.request_clear_day();
                    self.confirm_clear_day();
                }
            }
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> bool {
        if self.state.modal.is_none() {
            return false;
        }
        match key.code {
            KeyCode::Esc => {
                self.state.close_modal();
                self.state.set_status_message(Some("Canceled"));
            }
            KeyCode::Enter => self.submit_modal(),
            KeyCode::Tab | KeyCode::BackTab => {
                if let Some(modal) = self.state.modal.as_mut() {
                    modal.toggle_field();
                }
            }
            KeyCode::Backspace => {
                if let Some(modal) = self.state.modal.as_mut() {
                    modal.pop_char();
                }
            }
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) =>
            {
                if let Some(modal) = self.state.modal.as_mut() {
                    modal.push_char(ch);
                }
            }
            _ => {}
        }
        true
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> bool {
        if self.state.confirm_clear.is_none() {
            return false;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') => {
                self.state.cancel_clear_day();
                self.state.set_status_message(Some("Clear canceled"));
            }
            KeyCode::Enter | KeyCode::Char('y') => self.confirm_clear_day(),
            _ => {}
        }
        true
    }

    fn submit_modal(&mut self) {
        let was_edit = self
            .state
            .modal
            .as_ref()
            .map(|modal| modal.is_edit())
            .unwrap_or(false);
        match self.state.submit_modal() {
            Ok(SubmitOutcome::Saved) => {
                let message = if was_edit {
                    "Note updated"
                } else {
                    "Note added"
                };
                self.state.set_status_message(Some(message));
            }
            Ok(SubmitOutcome::Rejected) => {
                // modal stays open and carries its own error text
            }
            Ok(SubmitOutcome::TargetMissing) => {
                self.state
                    .set_status_message(Some("That note no longer exists"));
            }
            Err(err) => {
                tracing::error!(?err, "failed to persist note");
                self.state
                    .set_status_message(Some("Failed to save note; see logs"));
            }
        }
    }

    fn handle_delete_note(&mut self) {
        match self.state.delete_selected_note() {
            Ok(true) => self.state.set_status_message(Some("Note deleted")),
            Ok(false) => self
                .state
                .set_status_message(Some("No note on this day to delete")),
            Err(err) => {
                tracing::error!(?err, "failed to delete note");
                self.state
                    .set_status_message(Some("Failed to delete note; see logs"));
            }
        }
    }

    fn confirm_clear_day(&mut self) {
        match self.state.confirm_clear_day() {
            Ok(0) => self.state.set_status_message(Some("Nothing to clear")),
            Ok(removed) => {
                let label = if removed == 1 { "note" } else { "notes" };
                self.state
                    .set_status_message(Some(format!("Cleared {removed} {label}")));
            }
            Err(err) => {
                tracing::error!(?err, "failed to clear day");
                self.state
                    .set_status_message(Some("Failed to clear day; see logs"));
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}

use anyhow::Result;

use crate::calendar::{DayDate, MonthCursor, MonthGrid};
use crate::store::{Note, NoteId, NoteStore};

/// Which field of the event modal owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalField {
    Title,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Create,
    Edit { note_id: NoteId },
}

/// The open modal. `None` on the state is the Closed state; creating and
/// editing share the same draft shape, differing only in where a submit is
/// routed. Closing discards the draft wholesale.
#[derive(Debug, Clone)]
pub struct EventModal {
    pub kind: ModalKind,
    pub title: String,
    pub date_input: String,
    pub field: ModalField,
    pub error: Option<String>,
}

impl EventModal {
    fn create(date: DayDate) -> Self {
        Self {
            kind: ModalKind::Create,
            title: String::new(),
            date_input: date.to_string(),
            field: ModalField::Title,
            error: None,
        }
    }

    fn edit(note: &Note) -> Self {
        Self {
            kind: ModalKind::Edit { note_id: note.id },
            title: note.title.clone(),
            date_input: note.date.to_string(),
            field: ModalField::Title,
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.kind, ModalKind::Edit { .. })
    }

    pub fn push_char(&mut self, ch: char) {
        self.error = None;
        match self.field {
            ModalField::Title => {
                if self.title.len() < 120 {
                    self.title.push(ch);
                }
            }
            ModalField::Date => {
                if self.date_input.len() < 16 {
                    self.date_input.push(ch);
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        self.error = None;
        match self.field {
            ModalField::Title => {
                self.title.pop();
            }
            ModalField::Date => {
                self.date_input.pop();
            }
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            ModalField::Title => ModalField::Date,
            ModalField::Date => ModalField::Title,
        };
    }
}

/// What a submit attempt did to the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Note written, modal closed.
    Saved,
    /// Draft invalid (empty title, bad date); modal stays open.
    Rejected,
    /// Edit target vanished from the store; modal closed, nothing changed.
    TargetMissing,
}

pub struct AppState {
    pub cursor: MonthCursor,
    pub selected_day: u8,
    pub note_cursor: usize,
    pub today: DayDate,
    pub store: NoteStore,
    pub modal: Option<EventModal>,
    pub confirm_clear: Option<DayDate>,
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(store: NoteStore) -> Self {
        let today = DayDate::today();
        Self {
            cursor: MonthCursor::containing(today),
            selected_day: today.day(),
            note_cursor: 0,
            today,
            store,
            modal: None,
            confirm_clear: None,
            status_message: None,
        }
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::for_month(self.cursor)
    }

    pub fn selected_date(&self) -> DayDate {
        // selected_day is clamped on every month change, so this resolves
        self.cursor
            .date_of(self.selected_day)
            .unwrap_or_else(|| self.cursor.date_of(1).unwrap_or(self.today))
    }

    pub fn selected_notes(&self) -> Vec<&Note> {
        self.store.notes_on(self.selected_date())
    }

    pub fn selected_note(&self) -> Option<&Note> {
        let notes = self.selected_notes();
        if notes.is_empty() {
            return None;
        }
        notes.get(self.note_cursor.min(notes.len() - 1)).copied()
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    // --- month navigation -------------------------------------------------

    pub fn previous_month(&mut self) {
        self.cursor = self.cursor.previous();
        self.after_month_change();
    }

    pub fn next_month(&mut self) {
        self.cursor = self.cursor.next();
        self.after_month_change();
    }

    pub fn jump_to_today(&mut self) {
        self.today = DayDate::today();
        self.cursor = MonthCursor::containing(self.today);
        self.selected_day = self.today.day();
        self.note_cursor = 0;
    }

    fn after_month_change(&mut self) {
        self.selected_day = self.selected_day.min(self.cursor.days_in_month());
        self.note_cursor = 0;
    }

    /// Moves the day selection, rolling into the adjacent month when the
    /// step crosses the first or last day.
    pub fn move_day(&mut self, delta: i16) {
        let days = self.cursor.days_in_month() as i16;
        let target = self.selected_day as i16 + delta;
        if target < 1 {
            self.cursor = self.cursor.previous();
            let days = self.cursor.days_in_month() as i16;
            self.selected_day = (days + target).clamp(1, days) as u8;
        } else if target > days {
            let overflow = target - days;
            self.cursor = self.cursor.next();
            let days = self.cursor.days_in_month() as i16;
            self.selected_day = overflow.clamp(1, days) as u8;
        } else {
            self.selected_day = target as u8;
        }
        self.note_cursor = 0;
    }

    pub fn cycle_note(&mut self, delta: isize) {
        let count = self.store.count_on(self.selected_date());
        if count == 0 {
            self.note_cursor = 0;
            return;
        }
        let count = count as isize;
        let current = (self.note_cursor as isize).min(count - 1);
        self.note_cursor = (current + delta).rem_euclid(count) as usize;
    }

    // --- modal state machine ----------------------------------------------

    pub fn open_create_modal(&mut self) {
        if self.modal.is_some() {
            return;
        }
        self.modal = Some(EventModal::create(self.selected_date()));
    }

    /// Opens the modal pre-filled from the selected note. No-op when the
    /// day has no notes.
    pub fn open_edit_modal(&mut self) -> bool {
        if self.modal.is_some() {
            return false;
        }
        let Some(note) = self.selected_note().cloned() else {
            return false;
        };
        self.modal = Some(EventModal::edit(&note));
        true
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Validates the draft and routes it to the store: create appends, edit
    /// mutates the original note through its id.
    pub fn submit_modal(&mut self) -> Result<SubmitOutcome> {
        let Some(modal) = self.modal.as_mut() else {
            return Ok(SubmitOutcome::Rejected);
        };

        if modal.title.trim().is_empty() {
            modal.error = Some("Title cannot be empty".into());
            return Ok(SubmitOutcome::Rejected);
        }
        let date: DayDate = match modal.date_input.parse() {
            Ok(date) => date,
            Err(err) => {
                modal.error = Some(err.to_string());
                return Ok(SubmitOutcome::Rejected);
            }
        };
        let title = modal.title.clone();
        let kind = modal.kind;

        let outcome = match kind {
            ModalKind::Create => {
                self.store.add(date, &title)?;
                SubmitOutcome::Saved
            }
            ModalKind::Edit { note_id } => {
                if self.store.rename(note_id, date, &title)? {
                    SubmitOutcome::Saved
                } else {
                    SubmitOutcome::TargetMissing
                }
            }
        };

        self.modal = None;
        if self.cursor.contains(date) {
            self.selected_day = date.day();
        }
        self.note_cursor = 0;
        Ok(outcome)
    }

    // --- deletion ----------------------------------------------------------

    pub fn delete_selected_note(&mut self) -> Result<bool> {
        let Some(id) = self.selected_note().map(|note| note.id) else {
            return Ok(false);
        };
        let removed = self.store.remove(id)?;
        self.cycle_note(0);
        Ok(removed)
    }

    pub fn request_clear_day(&mut self) {
        if self.store.count_on(self.selected_date()) > 0 {
            self.confirm_clear = Some(self.selected_date());
        }
    }

    pub fn cancel_clear_day(&mut self) {
        self.confirm_clear = None;
    }

    pub fn confirm_clear_day(&mut self) -> Result<usize> {
        let Some(date) = self.confirm_clear.take() else {
            return Ok(0);
        };
        let removed = self.store.clear_day(date)?;
        self.note_cursor = 0;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::store::MemorySlot;

    fn date(raw: &str) -> DayDate {
        raw.parse().expect("test date")
    }

    fn state_at(year: i32, month: u8, day: u8) -> AppState {
        let store = NoteStore::open(Box::new(MemorySlot::new())).expect("open store");
        let mut state = AppState::new(store);
        state.cursor = MonthCursor::new(year, month).expect("valid month");
        state.selected_day = day;
        state
    }

    #[test]
    fn note_survives_month_round_trip() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.store.add(date("2024-3-15"), "Meeting")?;

        state.next_month();
        assert_eq!(state.cursor.month(), 4);
        state.previous_month();
        assert_eq!((state.cursor.year(), state.cursor.month()), (2024, 3));

        let notes = state.store.notes_on(date("2024-3-15"));
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Meeting");
        Ok(())
    }

    #[test]
    fn day_selection_clamps_when_the_month_shrinks() {
        let mut state = state_at(2024, 3, 31);
        state.next_month(); // April has 30 days
        assert_eq!(state.selected_day, 30);
    }

    #[test]
    fn day_movement_rolls_across_month_edges() {
        let mut state = state_at(2024, 3, 1);
        state.move_day(-1);
        assert_eq!((state.cursor.month(), state.selected_day), (2, 29));

        state.move_day(1);
        assert_eq!((state.cursor.month(), state.selected_day), (3, 1));

        let mut state = state_at(2024, 3, 31);
        state.move_day(7);
        assert_eq!((state.cursor.month(), state.selected_day), (4, 7));
    }

    #[test]
    fn create_modal_opens_on_selected_day_and_cancel_discards() {
        let mut state = state_at(2024, 3, 15);
        state.open_create_modal();
        let modal = state.modal.as_ref().expect("modal open");
        assert_matches!(modal.kind, ModalKind::Create);
        assert_eq!(modal.date_input, "2024-3-15");

        state.modal.as_mut().unwrap().title.push_str("draft");
        state.close_modal();
        assert!(state.modal.is_none());
        assert!(state.store.is_empty());

        // reopening starts from a clean draft
        state.open_create_modal();
        assert!(state.modal.as_ref().unwrap().title.is_empty());
    }

    #[test]
    fn empty_title_submit_keeps_modal_open_and_store_untouched() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.open_create_modal();
        state.modal.as_mut().unwrap().title = "   ".into();

        assert_eq!(state.submit_modal()?, SubmitOutcome::Rejected);
        assert!(state.modal.is_some());
        assert!(state.modal.as_ref().unwrap().error.is_some());
        assert!(state.store.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_date_submit_is_rejected() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.open_create_modal();
        let modal = state.modal.as_mut().unwrap();
        modal.title = "Meeting".into();
        modal.date_input = "2024-13-40".into();

        assert_eq!(state.submit_modal()?, SubmitOutcome::Rejected);
        assert!(state.modal.is_some());
        assert!(state.store.is_empty());
        Ok(())
    }

    #[test]
    fn create_submit_appends_and_closes() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.open_create_modal();
        state.modal.as_mut().unwrap().title = "Meeting".into();

        assert_eq!(state.submit_modal()?, SubmitOutcome::Saved);
        assert!(state.modal.is_none());
        assert_eq!(state.store.notes_on(date("2024-3-15")).len(), 1);
        Ok(())
    }

    #[test]
    fn edit_submit_mutates_instead_of_duplicating() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.store.add(date("2024-3-15"), "Meeting")?;

        assert!(state.open_edit_modal());
        {
            let modal = state.modal.as_mut().unwrap();
            assert!(modal.is_edit());
            assert_eq!(modal.title, "Meeting");
            modal.title = "Standup".into();
        }

        assert_eq!(state.submit_modal()?, SubmitOutcome::Saved);
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.store.notes()[0].title, "Standup");
        Ok(())
    }

    #[test]
    fn edit_of_vanished_note_reports_missing_target() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        let id = state.store.add(date("2024-3-15"), "Meeting")?;

        assert!(state.open_edit_modal());
        state.store.remove(id)?;
        state.modal.as_mut().unwrap().title = "Ghost".into();

        assert_eq!(state.submit_modal()?, SubmitOutcome::TargetMissing);
        assert!(state.modal.is_none());
        assert!(state.store.is_empty());
        Ok(())
    }

    #[test]
    fn edit_can_move_a_note_to_another_date() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.store.add(date("2024-3-15"), "Meeting")?;

        assert!(state.open_edit_modal());
        state.modal.as_mut().unwrap().date_input = "2024-3-20".into();

        assert_eq!(state.submit_modal()?, SubmitOutcome::Saved);
        assert!(state.store.notes_on(date("2024-3-15")).is_empty());
        assert_eq!(state.store.notes_on(date("2024-3-20")).len(), 1);
        assert_eq!(state.selected_day, 20);
        Ok(())
    }

    #[test]
    fn edit_modal_does_not_open_on_an_empty_day() {
        let mut state = state_at(2024, 3, 15);
        assert!(!state.open_edit_modal());
        assert!(state.modal.is_none());
    }

    #[test]
    fn note_cursor_cycles_through_the_days_notes() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.store.add(date("2024-3-15"), "first")?;
        state.store.add(date("2024-3-15"), "second")?;

        assert_eq!(state.selected_note().unwrap().title, "first");
        state.cycle_note(1);
        assert_eq!(state.selected_note().unwrap().title, "second");
        state.cycle_note(1);
        assert_eq!(state.selected_note().unwrap().title, "first");
        state.cycle_note(-1);
        assert_eq!(state.selected_note().unwrap().title, "second");
        Ok(())
    }

    #[test]
    fn clear_day_flow_requires_confirmation() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.store.add(date("2024-3-15"), "first")?;
        state.store.add(date("2024-3-15"), "second")?;
        state.store.add(date("2024-3-16"), "other")?;

        state.request_clear_day();
        assert_eq!(state.confirm_clear, Some(date("2024-3-15")));

        state.cancel_clear_day();
        assert_eq!(state.store.len(), 3);

        state.request_clear_day();
        assert_eq!(state.confirm_clear_day()?, 2);
        assert!(state.store.notes_on(date("2024-3-15")).is_empty());
        assert_eq!(state.store.notes_on(date("2024-3-16")).len(), 1);
        Ok(())
    }

    #[test]
    fn clear_request_on_an_empty_day_is_ignored() {
        let mut state = state_at(2024, 3, 15);
        state.request_clear_day();
        assert!(state.confirm_clear.is_none());
    }

    #[test]
    fn delete_selected_note_targets_the_cursor() -> Result<()> {
        let mut state = state_at(2024, 3, 15);
        state.store.add(date("2024-3-15"), "first")?;
        state.store.add(date("2024-3-15"), "second")?;

        state.cycle_note(1);
        assert!(state.delete_selected_note()?);
        let remaining = state.store.notes_on(date("2024-3-15"));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "first");

        assert!(state.delete_selected_note()?);
        assert!(!state.delete_selected_note()?);
        Ok(())
    }
}

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use crate::app::state::{AppState, EventModal, ModalField};
use crate::calendar::{GridCell, WEEKDAY_LABELS, WEEK_COLUMNS};
use crate::config::themes::Theme;
use crate::config::AppConfig;
use crate::store::Note;

pub fn draw_app(frame: &mut Frame, state: &AppState, config: &AppConfig) {
    let theme = Theme::resolve(&config.theme);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(7),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_month_header(frame, state, theme, vertical[0]);
    draw_weekday_row(frame, theme, vertical[1]);
    draw_grid(frame, state, config, theme, vertical[2]);
    draw_footer(frame, state, theme, vertical[3]);

    if state.confirm_clear.is_some() {
        draw_confirm_overlay(frame, state, theme);
    }
    if let Some(modal) = &state.modal {
        draw_modal(frame, modal, theme);
    }
}

fn draw_month_header(frame: &mut Frame, state: &AppState, theme: Theme, area: Rect) {
    let title = format!(
        "◀  {} {}  ▶",
        state.cursor.month_name(),
        state.cursor.year()
    );
    let header = Paragraph::new(Line::from(Span::styled(title, theme.header)))
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(header, area);
}

fn draw_weekday_row(frame: &mut Frame, theme: Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, WEEK_COLUMNS as u32); WEEK_COLUMNS])
        .split(area);
    for (label, column) in WEEKDAY_LABELS.iter().zip(columns.iter()) {
        let cell = Paragraph::new(Line::from(Span::styled(*label, theme.weekday_row)))
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(cell, *column);
    }
}

fn draw_grid(frame: &mut Frame, state: &AppState, config: &AppConfig, theme: Theme, area: Rect) {
    let grid = state.grid();
    let row_count = grid.cells().len() / WEEK_COLUMNS;
    if row_count == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
        .split(area);

    for (row_cells, row_area) in grid.rows().zip(rows.iter()) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, WEEK_COLUMNS as u32); WEEK_COLUMNS])
            .split(*row_area);

        for (cell, cell_area) in row_cells.iter().zip(columns.iter()) {
            draw_day_cell(frame, state, config, theme, *cell, *cell_area);
        }
    }
}

fn draw_day_cell(
    frame: &mut Frame,
    state: &AppState,
    config: &AppConfig,
    theme: Theme,
    cell: GridCell,
    area: Rect,
) {
    let GridCell::Day(day) = cell else {
        let blank = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.blank_cell);
        frame.render_widget(blank, area);
        return;
    };

    let date = state.cursor.date_of(day);
    let is_selected = day == state.selected_day;
    let is_today = date.map(|d| d == state.today).unwrap_or(false);

    let border_style = if is_selected {
        theme.selected
    } else if is_today {
        theme.today
    } else {
        Style::default()
    };

    let number_style = if is_today {
        theme.today
    } else {
        theme.day_number
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let mut lines = vec![Line::from(Span::styled(day.to_string(), number_style))];
    if let Some(date) = date {
        let notes = state.store.notes_on(date);
        let note_rows = inner_height.saturating_sub(1);
        let (shown, hidden) = visible_note_split(notes.len(), config.cell_note_limit, note_rows);
        for (idx, note) in notes.iter().take(shown).enumerate() {
            lines.push(note_line(note, idx, state, is_selected, theme, inner_width));
        }
        if hidden > 0 && note_rows > shown {
            lines.push(Line::from(Span::styled(
                format!("+{hidden} more"),
                theme.overflow,
            )));
        }
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);
}

fn note_line<'a>(
    note: &Note,
    index: usize,
    state: &AppState,
    cell_selected: bool,
    theme: Theme,
    width: usize,
) -> Line<'a> {
    let style = if cell_selected && index == state.note_cursor {
        theme.note_selected
    } else {
        theme.note_line
    };
    Line::from(Span::styled(truncate_to_width(&note.title, width), style))
}

/// How many notes fit in a cell and how many stay hidden. A configured limit
/// of zero means "show everything the cell has room for"; a non-zero limit
/// caps the count even when more rows are available.
fn visible_note_split(total: usize, limit: usize, rows: usize) -> (usize, usize) {
    let cap = if limit == 0 { rows } else { limit.min(rows) };
    let shown = total.min(cap);
    (shown, total - shown)
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let glyph = ch.width().unwrap_or(0);
        if used + glyph > width {
            // drop the last glyph for an ellipsis when anything was cut
            while let Some(last) = out.pop() {
                used -= last.width().unwrap_or(0);
                if used + 1 <= width {
                    break;
                }
            }
            out.push('…');
            return out;
        }
        out.push(ch);
        used += glyph;
    }
    out
}

fn draw_footer(frame: &mut Frame, state: &AppState, theme: Theme, area: Rect) {
    let selected = state.selected_date();
    let count = state.store.count_on(selected);
    let mut status_spans = vec![
        Span::raw(format!("{selected}")),
        Span::raw(" | "),
        Span::styled(
            format!("{count} note{}", if count == 1 { "" } else { "s" }),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(note) = state.selected_note() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(note.title.clone(), theme.note_line));
    }
    if let Some(message) = &state.status_message {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), theme.status));
    }

    let lines = vec![
        Line::from(status_spans),
        Line::from(Span::styled(
            "Keys: h/j/k/l move • p/n month • t today • Tab cycle notes",
            theme.help,
        )),
        Line::from(Span::styled(
            "      Enter/a add • e edit • d delete • x clear day • q quit",
            theme.help,
        )),
    ];
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn draw_modal(frame: &mut Frame, modal: &EventModal, theme: Theme) {
    let area = centered_rect(60, 40, frame.size());
    frame.render_widget(Clear, area);

    let heading = if modal.is_edit() {
        "Edit Event"
    } else {
        "New Event"
    };

    let mut title_display = modal.title.clone();
    let mut date_display = modal.date_input.clone();
    match modal.field {
        ModalField::Title => title_display.push('▌'),
        ModalField::Date => date_display.push('▌'),
    }

    let field_label = |label: &str, active: bool| {
        let style = if active {
            theme.header
        } else {
            theme.help
        };
        Span::styled(format!("{label}: "), style)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            heading,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            field_label("Title", modal.field == ModalField::Title),
            Span::raw(title_display),
        ]),
        Line::from(vec![
            field_label("Date ", modal.field == ModalField::Date),
            Span::raw(date_display),
        ]),
        Line::from(""),
    ];
    if let Some(error) = &modal.error {
        lines.push(Line::from(Span::styled(error.clone(), theme.modal_error)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter save • Tab switch field • Esc cancel",
        theme.help,
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(heading)
                .borders(Borders::ALL)
                .border_style(theme.modal_border),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_confirm_overlay(frame: &mut Frame, state: &AppState, theme: Theme) {
    let Some(date) = state.confirm_clear else {
        return;
    };
    let count = state.store.count_on(date);
    let area = centered_rect(50, 30, frame.size());
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            "Clear Day",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Delete all {count} note{} on {date}?",
            if count == 1 { "" } else { "s" }
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter or y confirm • Esc cancel",
            theme.help,
        )),
    ])
    .block(
        Block::default()
            .title("Confirm")
            .borders(Borders::ALL)
            .border_style(theme.confirm_border),
    )
    .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("Meeting", 10), "Meeting");
        assert_eq!(truncate_to_width("Quarterly review", 9), "Quarterl…");
        assert_eq!(truncate_to_width("anything", 0), "");
    }

    #[test]
    fn wide_glyphs_count_double() {
        // each CJK glyph occupies two columns
        let truncated = truncate_to_width("会議の予定", 6);
        assert!(truncated.ends_with('…'));
        let width: usize = truncated.chars().filter_map(|ch| ch.width()).sum();
        assert!(width <= 6);
    }

    #[test]
    fn zero_limit_shows_as_many_notes_as_fit() {
        assert_eq!(visible_note_split(5, 0, 10), (5, 0));
        assert_eq!(visible_note_split(5, 0, 3), (3, 2));
    }

    #[test]
    fn explicit_limit_caps_visible_notes() {
        assert_eq!(visible_note_split(5, 3, 10), (3, 2));
        assert_eq!(visible_note_split(2, 3, 10), (2, 0));
        assert_eq!(visible_note_split(5, 3, 2), (2, 3));
    }

    #[test]
    fn overlay_rect_is_centered_inside_its_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let overlay = centered_rect(60, 40, parent);
        assert!(overlay.x > 0 && overlay.y > 0);
        assert!(overlay.right() < parent.right());
        assert!(overlay.bottom() < parent.bottom());
    }
}

use std::collections::HashSet;

use ratatui::style::{Color, Modifier, Style};

use super::ThemeName;

/// Resolved style palette for the calendar surface. Every widget pulls its
/// styling from here so a theme swap never touches rendering code.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub header: Style,
    pub weekday_row: Style,
    pub day_number: Style,
    pub blank_cell: Style,
    pub today: Style,
    pub selected: Style,
    pub note_line: Style,
    pub note_selected: Style,
    pub overflow: Style,
    pub status: Style,
    pub help: Style,
    pub modal_border: Style,
    pub modal_error: Style,
    pub confirm_border: Style,
}

impl Theme {
    pub fn resolve(name: &ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
            ThemeName::HighContrast => Self::high_contrast(),
        }
    }

    fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            weekday_row: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            day_number: Style::default().add_modifier(Modifier::BOLD),
            blank_cell: Style::default().fg(Color::DarkGray),
            today: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            note_line: Style::default().fg(Color::Green),
            note_selected: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            overflow: Style::default().fg(Color::DarkGray),
            status: Style::default().fg(Color::Cyan),
            help: Style::default().fg(Color::DarkGray),
            modal_border: Style::default().fg(Color::Cyan),
            modal_error: Style::default().fg(Color::Red),
            confirm_border: Style::default().fg(Color::Red),
        }
    }

    fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            weekday_row: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            day_number: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            blank_cell: Style::default().fg(Color::Gray),
            today: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            note_line: Style::default().fg(Color::Blue),
            note_selected: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            overflow: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::Blue),
            help: Style::default().fg(Color::Gray),
            modal_border: Style::default().fg(Color::Blue),
            modal_error: Style::default().fg(Color::Red),
            confirm_border: Style::default().fg(Color::Red),
        }
    }

    fn high_contrast() -> Self {
        Self {
            header: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            weekday_row: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            day_number: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            blank_cell: Style::default().fg(Color::Gray),
            today: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .bg(Color::White)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            note_line: Style::default().fg(Color::White),
            note_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            overflow: Style::default().fg(Color::White),
            status: Style::default().fg(Color::White),
            help: Style::default().fg(Color::Gray),
            modal_border: Style::default().fg(Color::White),
            modal_error: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            confirm_border: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    names: HashSet<ThemeName>,
}

impl ThemeRegistry {
    pub fn contains(&self, theme: &ThemeName) -> bool {
        self.names.contains(theme)
    }

    pub fn all(&self) -> impl Iterator<Item = &ThemeName> {
        self.names.iter()
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let names = [ThemeName::Dark, ThemeName::Light, ThemeName::HighContrast]
            .into_iter()
            .collect();
        Self { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_every_resolvable_theme() {
        let registry = ThemeRegistry::default();
        for name in registry.all() {
            // resolve must not fall through for a registered theme
            let _ = Theme::resolve(name);
        }
        assert_eq!(registry.all().count(), 3);
    }
}

use super::Component;
use crate::event::AppMsg;
use crate::model::options::{
    ColorFilter, DEFAULT_OVERLAY_TEXT, TransitionStyle, VideoOptions, parse_transition_secs,
};
use crate::pipeline::fs_ops::display_name;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionRow {
    Transition,
    Duration,
    Caption,
    Filter,
    Music,
}

impl OptionRow {
    pub fn all() -> [OptionRow; 5] {
        [
            OptionRow::Transition,
            OptionRow::Duration,
            OptionRow::Caption,
            OptionRow::Filter,
            OptionRow::Music,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            OptionRow::Transition => "Transition",
            OptionRow::Duration => "Duration (s)",
            OptionRow::Caption => "Caption",
            OptionRow::Filter => "Filter",
            OptionRow::Music => "Music",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OptionRow::Duration | OptionRow::Caption)
    }
}

pub struct OptionsPanelState {
    pub transition: TransitionStyle,
    pub duration_input: String,
    pub overlay_text: String,
    pub filter: ColorFilter,
    pub music: Option<PathBuf>,
    pub selected: usize,
}

impl Default for OptionsPanelState {
    fn default() -> Self {
        let defaults = VideoOptions::default();
        Self {
            transition: defaults.transition,
            duration_input: defaults.transition_secs.to_string(),
            overlay_text: DEFAULT_OVERLAY_TEXT.to_string(),
            filter: defaults.filter,
            music: None,
            selected: 0,
        }
    }
}

impl OptionsPanelState {
    pub fn current_row(&self) -> OptionRow {
        OptionRow::all()[self.selected]
    }

    /// True when keystrokes go into a text field.
    pub fn is_editing(&self) -> bool {
        self.current_row().is_text()
    }

    /// Snapshot handed to a video job.
    pub fn options(&self) -> VideoOptions {
        VideoOptions {
            transition: self.transition,
            transition_secs: parse_transition_secs(&self.duration_input),
            overlay_text: self.overlay_text.clone(),
            filter: self.filter,
            music: self.music.clone(),
        }
    }

    fn text_field(&mut self) -> Option<&mut String> {
        match self.current_row() {
            OptionRow::Duration => Some(&mut self.duration_input),
            OptionRow::Caption => Some(&mut self.overlay_text),
            _ => None,
        }
    }

    fn cycle(&mut self, forward: bool) {
        match self.current_row() {
            OptionRow::Transition => self.transition = self.transition.next(),
            OptionRow::Filter => {
                self.filter = if forward {
                    self.filter.next()
                } else {
                    self.filter.prev()
                }
            }
            _ => {}
        }
    }
}

impl Component for OptionsPanelState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::MusicSelected(path) => {
                self.music = Some(path.clone());
            }
            AppMsg::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return None;
                }
                let rows = OptionRow::all().len();
                match key.code {
                    KeyCode::Up => {
                        self.selected = (self.selected + rows - 1) % rows;
                    }
                    KeyCode::Down => {
                        self.selected = (self.selected + 1) % rows;
                    }
                    KeyCode::Left => self.cycle(false),
                    KeyCode::Right => self.cycle(true),
                    KeyCode::Enter if self.current_row() == OptionRow::Music => {
                        return Some(AppMsg::BrowseMusic);
                    }
                    KeyCode::Delete if self.current_row() == OptionRow::Music => {
                        if self.music.take().is_some() {
                            return Some(AppMsg::LogMessage(
                                "Background music cleared.".to_string(),
                            ));
                        }
                    }
                    KeyCode::Backspace => {
                        if let Some(field) = self.text_field() {
                            field.pop();
                        }
                    }
                    KeyCode::Char(c) => {
                        if let Some(field) = self.text_field() {
                            field.push(c);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let block = focused_block("Options", is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let music = self
            .music
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| "(none)".to_string());

        let mut lines: Vec<Line> = OptionRow::all()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let value = match row {
                    OptionRow::Transition => format!("< {} >", self.transition.name()),
                    OptionRow::Duration => self.duration_input.clone(),
                    OptionRow::Caption => self.overlay_text.clone(),
                    OptionRow::Filter => format!("< {} >", self.filter.name()),
                    OptionRow::Music => music.clone(),
                };
                let value_style = if i == self.selected && is_focused {
                    Style::default()
                        .fg(theme.background)
                        .bg(theme.text_highlight)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text_primary)
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:<13}", row.label()),
                        Style::default().fg(theme.text_secondary),
                    ),
                    Span::styled(value, value_style),
                ])
            })
            .collect();

        let help = match self.current_row() {
            OptionRow::Music => "Enter: browse  Del: clear",
            row if row.is_text() => "Type to edit",
            _ => "←→: change",
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("↑↓: navigate  {}", help),
            Style::default().fg(theme.text_secondary),
        )));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> AppMsg {
        AppMsg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_defaults_produce_default_options() {
        assert_eq!(OptionsPanelState::default().options(), VideoOptions::default());
    }

    #[test]
    fn test_edit_duration_and_cycle_filter() {
        let mut panel = OptionsPanelState::default();
        panel.update(&key(KeyCode::Down));
        assert!(panel.is_editing());
        for _ in 0..3 {
            panel.update(&key(KeyCode::Backspace));
        }
        for c in "1.5".chars() {
            panel.update(&key(KeyCode::Char(c)));
        }
        panel.update(&key(KeyCode::Down));
        panel.update(&key(KeyCode::Down));
        panel.update(&key(KeyCode::Right));
        panel.update(&key(KeyCode::Right));

        let options = panel.options();
        assert_eq!(options.transition_secs, 1.5);
        assert_eq!(options.filter, ColorFilter::Bright);
    }

    #[test]
    fn test_music_row_browse_and_clear() {
        let mut panel = OptionsPanelState::default();
        panel.update(&key(KeyCode::Up));
        assert_eq!(panel.current_row(), OptionRow::Music);
        assert!(matches!(
            panel.update(&key(KeyCode::Enter)),
            Some(AppMsg::BrowseMusic)
        ));

        panel.update(&AppMsg::MusicSelected(PathBuf::from("song.mp3")));
        assert_eq!(panel.options().music, Some(PathBuf::from("song.mp3")));
        assert!(panel.update(&key(KeyCode::Delete)).is_some());
        assert_eq!(panel.music, None);
        // Typing does nothing on non-text rows.
        panel.update(&key(KeyCode::Char('x')));
        assert_eq!(panel.overlay_text, DEFAULT_OVERLAY_TEXT);
    }
}

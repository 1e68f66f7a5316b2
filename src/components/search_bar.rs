use super::Component;
use crate::event::AppMsg;
use crate::pipeline::search::SearchEngine;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct SearchBarState {
    pub input: String,
    pub engine: SearchEngine,
    /// Set while a search thread is running; Enter is ignored meanwhile.
    pub searching: bool,
}

impl SearchBarState {
    pub fn keywords(&self) -> &str {
        self.input.trim()
    }
}

impl Component for SearchBarState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        if let AppMsg::Key(key) = msg {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return None;
            }
            match key.code {
                KeyCode::Char(c) => self.input.push(c),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Left => self.engine = self.engine.prev(),
                KeyCode::Right => self.engine = self.engine.next(),
                KeyCode::Enter if !self.searching => {
                    return Some(AppMsg::StartSearch(self.keywords().to_string()));
                }
                _ => {}
            }
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let block = focused_block("Search", is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(30)])
            .split(inner);

        let cursor = if is_focused { "█" } else { "" };
        let input = Paragraph::new(Line::from(vec![
            Span::styled("Keywords: ", Style::default().fg(theme.text_secondary)),
            Span::styled(self.input.as_str(), Style::default().fg(theme.text_primary)),
            Span::styled(cursor, Style::default().fg(theme.text_highlight)),
        ]));
        input.render(chunks[0], buf);

        let (button, button_style) = if self.searching {
            ("Searching...", Style::default().fg(theme.status_running))
        } else {
            (
                "[Enter] Search",
                Style::default()
                    .fg(theme.status_completed)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let engine = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("< {} > ", self.engine.name()),
                Style::default().fg(theme.text_highlight),
            ),
            Span::styled(button, button_style),
        ]));
        engine.render(chunks[1], buf);
    }
}

use super::Component;
use crate::event::AppMsg;
use crate::widgets::theme::get_theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

pub const READY_TEXT: &str = "Ready. Enter keywords and press Enter to search.";
const HINTS: &str =
    "Tab: focus  Enter: search/select  Ctrl+V/F5: make video  Ctrl+C/q: quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

impl ActivityStatus {
    fn classify(text: &str) -> Self {
        if text.contains("Error") || text.contains("ERROR") {
            ActivityStatus::Failed
        } else if text.starts_with("Success") || text.starts_with("Found") {
            ActivityStatus::Completed
        } else if text.ends_with("...") || text.ends_with('%') {
            ActivityStatus::Running
        } else {
            ActivityStatus::Idle
        }
    }
}

pub struct StatusBarState {
    pub text: String,
    pub status: ActivityStatus,
    pub counter: String,
    /// Export progress while a video job is writing.
    pub progress: Option<u8>,
}

impl Default for StatusBarState {
    fn default() -> Self {
        Self {
            text: READY_TEXT.to_string(),
            status: ActivityStatus::Idle,
            counter: "0 images selected".to_string(),
            progress: None,
        }
    }
}

impl StatusBarState {
    pub fn set_counter(&mut self, counter: String) {
        self.counter = counter;
    }
}

impl Component for StatusBarState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::Status(text) => {
                self.status = ActivityStatus::classify(text);
                self.text = text.clone();
            }
            AppMsg::VideoProgress(percent) => {
                self.progress = Some(*percent);
            }
            AppMsg::VideoFinished(result) => {
                self.progress = None;
                self.status = match result {
                    Ok(_) => ActivityStatus::Completed,
                    Err(_) => ActivityStatus::Failed,
                };
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _is_focused: bool) {
        let theme = get_theme();
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.border_unfocused));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(20),
                Constraint::Length(20),
            ])
            .split(rows[0]);

        let color = match self.status {
            ActivityStatus::Idle => theme.text_primary,
            ActivityStatus::Running => theme.status_running,
            ActivityStatus::Completed => theme.status_completed,
            ActivityStatus::Failed => theme.status_failed,
        };
        Paragraph::new(Span::styled(self.text.as_str(), Style::default().fg(color)))
            .render(top[0], buf);

        if let Some(percent) = self.progress {
            Gauge::default()
                .gauge_style(Style::default().fg(theme.status_running))
                .percent(percent.min(100) as u16)
                .render(top[1], buf);
        }

        Paragraph::new(Span::styled(
            self.counter.as_str(),
            Style::default()
                .fg(theme.text_highlight)
                .add_modifier(Modifier::BOLD),
        ))
        .render(top[2], buf);

        Paragraph::new(Line::from(Span::styled(
            HINTS,
            Style::default().fg(theme.text_secondary),
        )))
        .render(rows[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_classification() {
        let mut bar = StatusBarState::default();
        assert_eq!(bar.text, READY_TEXT);

        bar.update(&AppMsg::Status("Searching Bing for 'cats'...".to_string()));
        assert_eq!(bar.status, ActivityStatus::Running);
        bar.update(&AppMsg::Status("Error during Bing search: x".to_string()));
        assert_eq!(bar.status, ActivityStatus::Failed);
        bar.update(&AppMsg::Status("Found 3 potential thumbnails (Bing).".to_string()));
        assert_eq!(bar.status, ActivityStatus::Completed);
    }

    #[test]
    fn test_progress_cleared_when_finished() {
        let mut bar = StatusBarState::default();
        bar.update(&AppMsg::VideoProgress(40));
        assert_eq!(bar.progress, Some(40));
        bar.update(&AppMsg::VideoFinished(Ok(PathBuf::from("v.mp4"))));
        assert_eq!(bar.progress, None);
        assert_eq!(bar.status, ActivityStatus::Completed);
    }
}

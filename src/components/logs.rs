use super::Component;
use crate::event::AppMsg;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};

#[derive(Debug)]
pub struct LogsState {
    pub logs: Vec<String>,
    scroll_state: ScrollbarState,
    scroll_offset: u16,
    stick_to_bottom: bool,
}

impl Default for LogsState {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            scroll_state: ScrollbarState::default(),
            scroll_offset: 0,
            stick_to_bottom: true,
        }
    }
}

fn line_style(line: &str) -> Style {
    let theme = get_theme();
    if line.contains("ERROR") || line.contains("Error") {
        Style::default().fg(theme.status_failed)
    } else if line.contains("Warning") {
        Style::default().fg(theme.status_idle)
    } else if line.contains("Success") || line.contains("Saved:") {
        Style::default().fg(theme.status_completed)
    } else {
        Style::default().fg(theme.text_primary)
    }
}

impl LogsState {
    pub fn add_log(&mut self, message: String) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push(format!("{} - {}", stamp, message));
    }

    fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);
    }
}

impl Component for LogsState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::LogMessage(msg) | AppMsg::Status(msg) => {
                self.add_log(msg.clone());
            }
            AppMsg::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1),
                KeyCode::PageUp => self.scroll_up(10),
                KeyCode::PageDown => self.scroll_down(10),
                KeyCode::End => self.stick_to_bottom = true,
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let block = focused_block("Logs", is_focused);

        let inner_area = block.inner(area);
        block.render(area, buf);

        let width = (inner_area.width as usize).saturating_sub(2);
        if width == 0 {
            return;
        }

        // Wrap first so scrolling works in screen lines.
        let mut styled_lines: Vec<Line> = Vec::new();
        for log in &self.logs {
            let style = line_style(log);
            for line in textwrap::wrap(log, width) {
                styled_lines.push(Line::from(Span::styled(line.to_string(), style)));
            }
        }
        let total_height = styled_lines.len();

        let viewport_height = inner_area.height as usize;
        let max_scroll = total_height.saturating_sub(viewport_height);

        self.scroll_state = self.scroll_state.content_length(total_height);

        if self.stick_to_bottom {
            self.scroll_offset = max_scroll as u16;
        } else if self.scroll_offset as usize >= max_scroll {
            self.scroll_offset = max_scroll as u16;
            self.stick_to_bottom = true;
        }
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);

        Paragraph::new(styled_lines)
            .scroll((self.scroll_offset, 0))
            .render(inner_area, buf);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        StatefulWidget::render(scrollbar, inner_area, buf, &mut self.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn render(logs: &mut LogsState, height: u16) {
        let area = Rect::new(0, 0, 40, height);
        let mut buf = Buffer::empty(area);
        logs.render(area, &mut buf, false);
    }

    #[test]
    fn test_lines_are_timestamped() {
        let mut logs = LogsState::default();
        logs.update(&AppMsg::LogMessage("hello".to_string()));
        logs.update(&AppMsg::Status("busy".to_string()));
        let line = &logs.logs[0];
        assert!(line.ends_with(" - hello"));
        let stamp = &line[..8];
        assert_eq!(stamp.matches(':').count(), 2);
        assert_eq!(logs.logs.len(), 2);
    }

    #[test]
    fn test_scroll_up_unsticks_and_bottom_resticks() {
        let mut logs = LogsState::default();
        for i in 0..30 {
            logs.add_log(format!("line {}", i));
        }
        render(&mut logs, 10);
        assert!(logs.stick_to_bottom);
        let bottom = logs.scroll_offset;
        assert!(bottom > 0);

        logs.update(&AppMsg::Key(KeyEvent::from(KeyCode::PageUp)));
        render(&mut logs, 10);
        assert!(!logs.stick_to_bottom);
        assert_eq!(logs.scroll_offset, bottom - 10);

        logs.update(&AppMsg::Key(KeyEvent::from(KeyCode::PageDown)));
        logs.update(&AppMsg::Key(KeyEvent::from(KeyCode::PageDown)));
        render(&mut logs, 10);
        assert!(logs.stick_to_bottom);
        assert_eq!(logs.scroll_offset, bottom);
    }

    #[test]
    fn test_error_lines_are_red() {
        assert_eq!(
            line_style("12:00:00 - Error during Bing search: x").fg,
            Some(get_theme().status_failed)
        );
        assert_eq!(
            line_style("12:00:00 - Success! Video saved as a.mp4").fg,
            Some(get_theme().status_completed)
        );
    }
}

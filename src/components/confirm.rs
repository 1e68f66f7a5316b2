use super::Component;
use crate::event::AppMsg;
use crate::widgets::common::{centered_rect, popup_block};
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Clear, Paragraph, Widget, Wrap},
};

/// Yes/no popup shown before a video job starts.
pub struct ConfirmState {
    pub message: String,
}

impl ConfirmState {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl Component for ConfirmState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        let AppMsg::Key(key) = msg else {
            return None;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Some(AppMsg::ConfirmVideo(true))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(AppMsg::ConfirmVideo(false))
            }
            _ => None,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _is_focused: bool) {
        let theme = get_theme();
        let popup = centered_rect(50, 30, area);
        Clear.render(popup, buf);

        let block = popup_block("Confirm");
        let mut lines: Vec<Line> = self
            .message
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::styled(
            "[y/Enter] Yes    [n/Esc] No",
            Style::default().fg(theme.text_secondary),
        ));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn test_answers() {
        let mut confirm = ConfirmState::new("Create video?".to_string());
        let answer = |c: &mut ConfirmState, code: KeyCode| c.update(&AppMsg::Key(KeyEvent::from(code)));
        assert!(matches!(answer(&mut confirm, KeyCode::Char('y')), Some(AppMsg::ConfirmVideo(true))));
        assert!(matches!(answer(&mut confirm, KeyCode::Esc), Some(AppMsg::ConfirmVideo(false))));
        assert!(answer(&mut confirm, KeyCode::Char('x')).is_none());
    }
}

// Season multi-select sidebar: checkbox list with a movable cursor.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the season selection list.
///
/// Selected seasons show `[x]`; the cursor row is highlighted. Selection
/// order is what drives the panel order, so the checkbox list itself stays
/// in ascending season order.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines: Vec<Line> = if state.seasons.is_empty() {
        vec![Line::from(Span::styled(
            "No seasons found",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        state
            .seasons
            .iter()
            .enumerate()
            .map(|(i, season)| {
                let checked = state.selected.contains(season);
                let marker = if checked { "[x]" } else { "[ ]" };
                let mut style = if checked {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                if i == state.cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(format!(" {marker} {season}"), style))
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                "Seasons",
                Style::default().add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(24, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        format!("{:?}", terminal.backend().buffer())
    }

    #[test]
    fn render_does_not_panic_empty() {
        let state = ViewState::default();
        let rendered = render_to_string(&state);
        assert!(rendered.contains("No seasons found"));
    }

    #[test]
    fn selected_seasons_are_checked() {
        let state = ViewState {
            seasons: vec![2019, 2020],
            selected: vec![2020],
            ..ViewState::default()
        };
        let rendered = render_to_string(&state);
        assert!(rendered.contains("[ ] 2019"));
        assert!(rendered.contains("[x] 2020"));
    }
}

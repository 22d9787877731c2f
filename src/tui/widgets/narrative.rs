// Streaming season narrative panel.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::protocol::LlmStatus;
use crate::tui::NarrativeView;

fn status_indicator(status: LlmStatus) -> Span<'static> {
    match status {
        LlmStatus::Idle => Span::styled("waiting", Style::default().fg(Color::DarkGray)),
        LlmStatus::Streaming => Span::styled("streaming...", Style::default().fg(Color::Yellow)),
        LlmStatus::Complete => Span::styled("complete", Style::default().fg(Color::Green)),
        LlmStatus::Error => Span::styled("error", Style::default().fg(Color::Red)),
    }
}

fn border_style(status: LlmStatus) -> Style {
    match status {
        LlmStatus::Error => Style::default().fg(Color::Red),
        LlmStatus::Streaming => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    }
}

/// Render the narrative panel for one season.
///
/// Text accumulates token by token while streaming; the view auto-scrolls to
/// keep the newest lines visible, then stays put once the stream completes.
pub fn render(frame: &mut Frame, area: Rect, season: u16, view: &NarrativeView) {
    let title = ratatui::text::Line::from(vec![
        Span::raw(format!("{season} recap [")),
        status_indicator(view.status),
        Span::raw("]"),
    ]);

    let text = if view.text.is_empty() {
        match view.status {
            LlmStatus::Idle => "Waiting for narrative...".to_string(),
            LlmStatus::Streaming => String::new(),
            LlmStatus::Complete => "(empty response)".to_string(),
            LlmStatus::Error => "Narrative failed.".to_string(),
        }
    } else {
        view.text.clone()
    };

    // Scroll so the tail stays visible while tokens stream in.
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let scroll = if view.status == LlmStatus::Streaming {
        let wrapped_lines: usize = text
            .lines()
            .map(|line| line.chars().count().div_ceil(inner_width).max(1))
            .sum();
        wrapped_lines.saturating_sub(inner_height) as u16
    } else {
        0
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(view.status))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(season: u16, view: &NarrativeView) -> String {
        let backend = ratatui::backend::TestBackend::new(40, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), season, view))
            .unwrap();
        format!("{:?}", terminal.backend().buffer())
    }

    #[test]
    fn idle_shows_placeholder() {
        let view = NarrativeView::default();
        let rendered = render_to_string(2020, &view);
        assert!(rendered.contains("Waiting for narrative"));
        assert!(rendered.contains("waiting"));
    }

    #[test]
    fn streaming_shows_partial_text() {
        let view = NarrativeView {
            text: "Flamengo dominated".to_string(),
            status: LlmStatus::Streaming,
        };
        let rendered = render_to_string(2020, &view);
        assert!(rendered.contains("Flamengo dominated"));
        assert!(rendered.contains("streaming"));
    }

    #[test]
    fn error_shows_message() {
        let view = NarrativeView {
            text: "Network error: timed out".to_string(),
            status: LlmStatus::Error,
        };
        let rendered = render_to_string(2019, &view);
        assert!(rendered.contains("Network error"));
        assert!(rendered.contains("error"));
    }

    #[test]
    fn title_names_the_season() {
        let view = NarrativeView {
            text: "Done.".to_string(),
            status: LlmStatus::Complete,
        };
        let rendered = render_to_string(2018, &view);
        assert!(rendered.contains("2018 recap"));
        assert!(rendered.contains("complete"));
    }
}

// League-wide mean attendance per season, rendered as a bar chart.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use ratatui::Frame;

use crate::db::SeasonAttendance;

/// Render the per-season attendance overview.
///
/// One bar per season across the full history, independent of the current
/// selection.
pub fn render(frame: &mut Frame, area: Rect, chart: &[SeasonAttendance]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "Mean attendance by season",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    if chart.is_empty() {
        let empty = Paragraph::new("No attendance data").block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar> = chart
        .iter()
        .map(|row| {
            Bar::default()
                .value(u64::from(row.avg_attendance))
                .label(row.season.to_string())
                .style(Style::default().fg(Color::Yellow))
        })
        .collect();

    // Width chosen so year labels stay readable.
    let bar_chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1);

    frame.render_widget(bar_chart, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_does_not_panic_empty() {
        let backend = ratatui::backend::TestBackend::new(80, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &[]))
            .unwrap();
    }

    #[test]
    fn render_shows_season_labels() {
        let chart = vec![
            SeasonAttendance {
                season: 2019,
                avg_attendance: 15_000,
            },
            SeasonAttendance {
                season: 2020,
                avg_attendance: 18_000,
            },
        ];

        let backend = ratatui::backend::TestBackend::new(80, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &chart))
            .unwrap();

        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("2019"));
        assert!(rendered.contains("2020"));
    }
}

// Mean home attendance table for one season panel.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::Frame;

use crate::protocol::SeasonPanels;

/// Render the per-team mean home attendance table.
///
/// The leading team's row is highlighted. A season with no matches renders
/// an inline notice instead of an empty table.
pub fn render(frame: &mut Frame, area: Rect, panel: &SeasonPanels) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Home attendance");

    let table = match &panel.stats {
        Ok(highlights) => &highlights.attendance,
        Err(_) => {
            let notice = Paragraph::new(format!(
                "No matches recorded for {}",
                panel.season
            ))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
            frame.render_widget(notice, area);
            return;
        }
    };

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|row| {
            let style = if row.team == table.leader.team {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                row.team.clone(),
                format!("{:>9.0}", row.mean_attendance),
                format!("{:>3}", row.matches),
            ])
            .style(style)
        })
        .collect();

    let widget = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(4),
        ],
    )
    .header(
        Row::new(vec!["Team", "Mean att.", "M"])
            .style(Style::default().add_modifier(Modifier::UNDERLINED)),
    )
    .block(block);

    frame.render_widget(widget, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

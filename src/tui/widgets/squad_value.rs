// Combined squad-value score table for one season panel.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::Frame;

use crate::protocol::SeasonPanels;

/// Render the per-team combined squad-value table.
///
/// Mirrors the attendance table: leader highlighted, empty seasons render
/// an inline notice.
pub fn render(frame: &mut Frame, area: Rect, panel: &SeasonPanels) {
    let block = Block::default().borders(Borders::ALL).title("Squad value");

    let table = match &panel.stats {
        Ok(highlights) => &highlights.squad_value,
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
            Row::new(vec![row.team.clone(), format!("{:>8.2}", row.combined_value)]).style(style)
        })
        .collect();

    let widget = Table::new(rows, [Constraint::Min(12), Constraint::Length(9)])
        .header(
            Row::new(vec!["Team", "Score"])
                .style(Style::default().add_modifier(Modifier::UNDERLINED)),
        )
        .block(block);

    frame.render_widget(widget, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MatchRecord;
    use crate::protocol::SeasonHighlights;
    use crate::stats::attendance::attendance_by_team;
    use crate::stats::squad_value::squad_value_by_team;
    use crate::stats::StatsError;

    #[test]
    fn renders_scores() {
        let matches = vec![MatchRecord {
            season: 2020,
            home_team: "Gremio".to_string(),
            away_team: "Santos".to_string(),
            attendance: 20_000,
            home_squad_value: 70.0,
            away_squad_value: 56.0,
            home_goals: 1,
            away_goals: 1,
            champion: None,
        }];
        let panel = SeasonPanels {
            season: 2020,
            champion: None,
            stats: Ok(SeasonHighlights {
                attendance: attendance_by_team(&matches, 2020).unwrap(),
                squad_value: squad_value_by_team(&matches, 2020, 14).unwrap(),
            }),
        };

        let backend = ratatui::backend::TestBackend::new(40, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &panel))
            .unwrap();

        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("Gremio"));
        // 70 / 14 = 5.00
        assert!(rendered.contains("5.00"));
    }

    #[test]
    fn empty_season_shows_notice() {
        let panel = SeasonPanels {
            season: 2001,
            champion: None,
            stats: Err(StatsError::EmptySeason { season: 2001 }),
        };

        let backend = ratatui::backend::TestBackend::new(40, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &panel))
            .unwrap();

        let rendered = format!("{:?}", terminal.backend().buffer());
        assert!(rendered.contains("No matches recorded for 2001"));
    }
}

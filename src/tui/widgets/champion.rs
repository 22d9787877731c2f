// Champion panel for one season.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::assets;
use crate::protocol::SeasonPanels;

/// Shown when the champions table has no row for the season.
const CHAMPION_UNKNOWN: &str = "unavailable";

/// Render the champion panel.
///
/// Shows the champion's name and its badge path when the champion is known,
/// or a neutral sentinel when it is not. A missing champion is a data gap,
/// not an error, so the panel renders normally either way.
pub fn render(frame: &mut Frame, area: Rect, panel: &SeasonPanels, image_dir: &str) {
    let lines = match &panel.champion {
        Some(team) => {
            let badge = assets::badge_path(image_dir, team);
            vec![
                Line::from(Span::styled(
                    team.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    badge.display().to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        None => vec![Line::from(Span::styled(
            CHAMPION_UNKNOWN,
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} champion", panel.season)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

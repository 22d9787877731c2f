// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the season dashboard:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +----------+---------------------------------------+
// | Seasons  | Attendance Chart (10 rows)             |
// | sidebar  +---------------------------------------+
// | (24 col) | Season panels (fill, one row each)     |
// +----------+---------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: league name and selection summary.
    pub status_bar: Rect,
    /// Left column: season multi-select list.
    pub sidebar: Rect,
    /// Right column top: league-wide mean attendance bar chart.
    pub chart: Rect,
    /// Right column rest: one row per selected season.
    pub panels: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
///
/// Fixed heights for the status bar, chart, and help bar; the season panel
/// area takes whatever remains.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // middle section (sidebar + chart + panels)
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let middle = vertical[1];
    let help_bar = vertical[2];

    // Horizontal: season sidebar (24 cols) | content
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(20)])
        .split(middle);

    let sidebar = horizontal[0];
    let content = horizontal[1];

    // Content vertical: chart (10 rows) | season panels (fill)
    let content_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(5)])
        .split(content);

    let chart = content_sections[0];
    let panels = content_sections[1];

    AppLayout {
        status_bar,
        sidebar,
        chart,
        panels,
        help_bar,
    }
}

/// Split the panel area into one horizontal band per selected season.
///
/// Every season gets an equal share. With no selection the area is returned
/// whole so a hint can be rendered into it.
pub fn split_season_rows(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return vec![area];
    }
    let share = (100 / count as u16).max(1);
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Percentage(share)).collect();
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

/// Split one season band into its four panels:
/// champion | attendance table | squad-value table | narrative.
pub fn split_season_panels(area: Rect) -> [Rect; 4] {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(18), // champion
            Constraint::Percentage(26), // attendance
            Constraint::Percentage(26), // squad value
            Constraint::Percentage(30), // narrative
        ])
        .split(area);
    [columns[0], columns[1], columns[2], columns[3]]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors relevant parts of the application
// state. The app orchestrator pushes `UiUpdate` messages over an mpsc channel;
// the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::db::SeasonAttendance;
use crate::protocol::{LlmStatus, SeasonPanels, UiUpdate, UserCommand};

use layout::{build_layout, split_season_panels, split_season_rows, AppLayout};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// One panel's narrative stream as accumulated for display.
#[derive(Debug, Clone, Default)]
pub struct NarrativeView {
    /// Streamed tokens so far, or the error message after a failure.
    pub text: String,
    pub status: LlmStatus,
}

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the dashboard.
pub struct ViewState {
    /// League name for the status bar.
    pub league_name: String,
    /// Directory holding team badge images.
    pub image_dir: String,
    /// All seasons available for selection, ascending.
    pub seasons: Vec<u16>,
    /// Seasons currently selected, in toggle order. Mirrors the
    /// orchestrator's selection via `UiUpdate::Panels`.
    pub selected: Vec<u16>,
    /// Sidebar cursor position (index into `seasons`).
    pub cursor: usize,
    /// League-wide mean attendance per season for the overview chart.
    pub chart: Vec<SeasonAttendance>,
    /// One entry per selected season, in selection order.
    pub panels: Vec<SeasonPanels>,
    /// Narrative stream per panel, indexed like `panels`.
    pub narratives: Vec<NarrativeView>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            league_name: String::new(),
            image_dir: String::new(),
            seasons: Vec::new(),
            selected: Vec::new(),
            cursor: 0,
            chart: Vec::new(),
            panels: Vec::new(),
            narratives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Tables(snapshot) => {
            state.seasons = snapshot.seasons;
            state.chart = snapshot.chart;
            if state.cursor >= state.seasons.len() {
                state.cursor = state.seasons.len().saturating_sub(1);
            }
        }
        UiUpdate::Panels(panels) => {
            state.selected = panels.iter().map(|p| p.season).collect();
            state.narratives = vec![NarrativeView::default(); panels.len()];
            state.panels = panels;
        }
        UiUpdate::NarrativeToken { ordinal, text } => {
            if let Some(narrative) = state.narratives.get_mut(ordinal) {
                narrative.text.push_str(&text);
                narrative.status = LlmStatus::Streaming;
            }
        }
        UiUpdate::NarrativeComplete { ordinal } => {
            if let Some(narrative) = state.narratives.get_mut(ordinal) {
                narrative.status = LlmStatus::Complete;
            }
        }
        UiUpdate::NarrativeError {
            ordinal, message, ..
        } => {
            if let Some(narrative) = state.narratives.get_mut(ordinal) {
                narrative.text = message;
                narrative.status = LlmStatus::Error;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    render_status_bar(frame, &layout, state);
    widgets::season_select::render(frame, layout.sidebar, state);
    widgets::chart::render(frame, layout.chart, &state.chart);
    render_panels(frame, &layout, state);
    render_help_bar(frame, &layout);
}

fn render_status_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let text = format!(
        " {} | {} seasons | {} selected",
        state.league_name,
        state.seasons.len(),
        state.selected.len()
    );
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.status_bar);
}

fn render_panels(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    if state.panels.is_empty() {
        let hint = Paragraph::new("Select one or more seasons to compare.").block(
            Block::default().borders(Borders::ALL).title("Seasons"),
        );
        frame.render_widget(hint, layout.panels);
        return;
    }

    let rows = split_season_rows(layout.panels, state.panels.len());
    for (i, panel) in state.panels.iter().enumerate() {
        let Some(row) = rows.get(i) else { break };
        let [champion, attendance, squad_value, narrative] = split_season_panels(*row);

        widgets::champion::render(frame, champion, panel, &state.image_dir);
        widgets::attendance::render(frame, attendance, panel);
        widgets::squad_value::render(frame, squad_value, panel);

        let default_view = NarrativeView::default();
        let view = state.narratives.get(i).unwrap_or(&default_view);
        widgets::narrative::render(frame, narrative, panel.season, view);
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text = " q:Quit | j/k:Move | Space:Toggle season | r:Refresh";
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    league_name: String,
    image_dir: String,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal on crash; chain our hook before the original.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState {
        league_name,
        image_dir,
        ..ViewState::default()
    };

    let mut event_stream = EventStream::new();

    // Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update);
                    }
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse events, resize events, etc.
                    }
                    Some(Err(_)) | None => {
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI and
// streaming narrative events from the LLM task. Maintains the loaded match
// data and the current season selection, and pushes UI updates to the TUI
// render loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{Database, SeasonAttendance};
use crate::llm::client::LlmClient;
use crate::llm::prompt;
use crate::protocol::{
    LlmEvent, SeasonHighlights, SeasonPanels, TablesSnapshot, UiUpdate, UserCommand,
};
use crate::stats::attendance::attendance_by_team;
use crate::stats::squad_value::squad_value_by_team;
use crate::db::MatchRecord;

// ---------------------------------------------------------------------------
// Panel assembly
// ---------------------------------------------------------------------------

/// Build the per-season panel data for every selected season, in selection
/// order.
///
/// Each panel carries the season's champion (when recorded) and the two
/// aggregate tables. A season with no matches yields `Err` in `stats` so the
/// UI can render a notice instead of tables; one empty season never blocks
/// the others.
pub fn assemble_panels(
    matches: &[MatchRecord],
    selected: &[u16],
    round_size: u32,
) -> Vec<SeasonPanels> {
    selected
        .iter()
        .map(|&season| {
            let champion = matches
                .iter()
                .find(|m| m.season == season)
                .and_then(|m| m.champion.clone());

            let stats = attendance_by_team(matches, season).and_then(|attendance| {
                let squad_value = squad_value_by_team(matches, season, round_size)?;
                Ok(SeasonHighlights {
                    attendance,
                    squad_value,
                })
            });

            SeasonPanels {
                season,
                champion,
                stats,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    /// Every match across all seasons, loaded once and refreshed on demand.
    pub matches: Vec<MatchRecord>,
    /// League-wide mean attendance per season, for the overview chart.
    pub chart: Vec<SeasonAttendance>,
    /// All seasons present in the database, ascending.
    pub seasons: Vec<u16>,
    /// Currently selected seasons, in the order the user toggled them on.
    pub selected: Vec<u16>,
    /// Handle of the in-flight narrative task, if any.
    pub current_narrative_task: Option<tokio::task::JoinHandle<()>>,
    /// Monotonically increasing counter identifying the current narrative
    /// task. Incremented each time a new task is spawned. Events from stale
    /// generations are discarded in `handle_llm_event`.
    pub narrative_generation: u64,
    /// LLM client for streaming Claude API calls. Wrapped in Arc for
    /// sharing with spawned tasks.
    pub llm_client: Arc<LlmClient>,
    /// Sender for LLM events; the spawned task uses a clone of this sender
    /// to stream tokens back to the main event loop.
    pub llm_tx: mpsc::Sender<LlmEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        llm_client: LlmClient,
        llm_tx: mpsc::Sender<LlmEvent>,
    ) -> Self {
        AppState {
            config,
            db,
            matches: Vec::new(),
            chart: Vec::new(),
            seasons: Vec::new(),
            selected: Vec::new(),
            current_narrative_task: None,
            narrative_generation: 0,
            llm_client: Arc::new(llm_client),
            llm_tx,
        }
    }

    /// Load (or reload) all three query results from the database.
    ///
    /// Always re-queries everything; refresh is unconditional so the UI
    /// never shows a mix of old and new data.
    pub fn load_tables(&mut self) -> anyhow::Result<()> {
        self.matches = self.db.load_matches()?;
        self.chart = self.db.load_attendance_by_season()?;
        self.seasons = self.db.load_seasons()?;

        // Drop selected seasons that vanished from the database.
        self.selected.retain(|s| self.seasons.contains(s));

        info!(
            matches = self.matches.len(),
            seasons = self.seasons.len(),
            "Loaded match data"
        );
        Ok(())
    }

    /// Snapshot of the season list and chart data for the TUI.
    pub fn tables_snapshot(&self) -> TablesSnapshot {
        TablesSnapshot {
            seasons: self.seasons.clone(),
            chart: self.chart.clone(),
        }
    }

    /// Cancel the current narrative task if one is running.
    pub fn cancel_narrative_task(&mut self) {
        if let Some(handle) = self.current_narrative_task.take() {
            handle.abort();
            info!("Cancelled previous narrative task");
        }
    }

    /// Rebuild panels for the current selection and restart narrative
    /// streaming.
    ///
    /// Cancels any in-flight narrative task, bumps the generation counter so
    /// its remaining events are discarded, and spawns one task that walks the
    /// selected seasons in order, streaming each summary before starting the
    /// next. Sequential requests keep panel narratives arriving in selection
    /// order.
    pub fn rebuild_selection(&mut self) -> Vec<SeasonPanels> {
        self.cancel_narrative_task();

        let panels = assemble_panels(&self.matches, &self.selected, self.config.league.round_size);

        self.narrative_generation += 1;
        let generation = self.narrative_generation;

        // Collect the prompt inputs for seasons that have data; empty seasons
        // get no narrative request.
        let requests: Vec<(usize, String)> = panels
            .iter()
            .enumerate()
            .filter_map(|(ordinal, panel)| {
                let highlights = panel.stats.as_ref().ok()?;
                let season_matches: Vec<MatchRecord> = self
                    .matches
                    .iter()
                    .filter(|m| m.season == panel.season)
                    .cloned()
                    .collect();
                let user_content =
                    prompt::build_season_summary_prompt(panel.season, &season_matches, highlights);
                Some((ordinal, user_content))
            })
            .collect();

        if requests.is_empty() {
            return panels;
        }

        let system = prompt::system_prompt(&self.config.league.name);
        let max_tokens = self.config.llm.summary_max_tokens;
        let client = Arc::clone(&self.llm_client);
        let tx = self.llm_tx.clone();

        let handle = tokio::spawn(async move {
            for (ordinal, user_content) in requests {
                if let Err(e) = client
                    .stream_summary(&system, &user_content, max_tokens, tx.clone(), ordinal, generation)
                    .await
                {
                    warn!(ordinal, "Narrative task failed: {}", e);
                }
            }
        });

        self.current_narrative_task = Some(handle);
        info!(
            selected = self.selected.len(),
            generation, "Rebuilt season selection"
        );

        panels
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Narrative streaming events from the LLM task
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Send the initial season list and chart to the TUI.
    let _ = ui_tx
        .send(UiUpdate::Tables(Box::new(state.tables_snapshot())))
        .await;

    // Track whether the LLM channel is still open. When it closes we stop
    // polling it so tokio::select! never spins on a closed channel.
    let mut llm_open = true;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Narrative events (only poll while channel is open) ---
            llm_event = llm_rx.recv(), if llm_open => {
                match llm_event {
                    Some(event) => {
                        handle_llm_event(&mut state, event, &ui_tx).await;
                    }
                    None => {
                        info!("Narrative channel closed");
                        llm_open = false;
                    }
                }
            }
        }
    }

    // Cleanup
    state.cancel_narrative_task();
    info!("Application event loop exiting");
    Ok(())
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::ToggleSeason(season) => {
            if !state.seasons.contains(&season) {
                warn!(season, "Toggle for unknown season ignored");
                return;
            }
            if let Some(pos) = state.selected.iter().position(|&s| s == season) {
                state.selected.remove(pos);
                info!(season, "Season deselected");
            } else {
                state.selected.push(season);
                info!(season, "Season selected");
            }
            let panels = state.rebuild_selection();
            let _ = ui_tx.send(UiUpdate::Panels(panels)).await;
        }
        UserCommand::Refresh => {
            info!("Refreshing from database");
            if let Err(e) = state.load_tables() {
                warn!("Refresh failed: {:#}", e);
                return;
            }
            let _ = ui_tx
                .send(UiUpdate::Tables(Box::new(state.tables_snapshot())))
                .await;
            let panels = state.rebuild_selection();
            let _ = ui_tx.send(UiUpdate::Panels(panels)).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Handle a narrative streaming event.
///
/// Every event carries the generation counter set when its task was spawned.
/// If the event's generation doesn't match `state.narrative_generation`, it
/// is a stale event from a cancelled task and is silently discarded, so
/// leftover tokens from a previous selection never bleed into a newer one.
async fn handle_llm_event(state: &mut AppState, event: LlmEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    let event_generation = match &event {
        LlmEvent::Token { generation, .. } => *generation,
        LlmEvent::Complete { generation, .. } => *generation,
        LlmEvent::Error { generation, .. } => *generation,
    };

    if event_generation != state.narrative_generation {
        debug!(
            event_generation,
            current = state.narrative_generation,
            "Discarding stale narrative event"
        );
        return;
    }

    match event {
        LlmEvent::Token { ordinal, text, .. } => {
            let _ = ui_tx.send(UiUpdate::NarrativeToken { ordinal, text }).await;
        }
        LlmEvent::Complete { ordinal, .. } => {
            let _ = ui_tx.send(UiUpdate::NarrativeComplete { ordinal }).await;
        }
        LlmEvent::Error {
            ordinal,
            kind,
            message,
            ..
        } => {
            warn!(ordinal, ?kind, "Narrative error: {}", message);
            let _ = ui_tx
                .send(UiUpdate::NarrativeError {
                    ordinal,
                    kind,
                    message,
                })
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CredentialsConfig, LeagueConfig, LlmConfig};
    use crate::protocol::NarrativeErrorKind;
    use crate::stats::StatsError;
    use rusqlite::Connection;

    fn test_config() -> Config {
        Config {
            league: LeagueConfig {
                name: "Test League".to_string(),
                round_size: 14,
            },
            llm: LlmConfig {
                model: "test".to_string(),
                summary_max_tokens: 100,
            },
            credentials: CredentialsConfig::default(),
            db_path: ":memory:".to_string(),
            image_dir: "image".to_string(),
        }
    }

    fn record(season: u16, home: &str, away: &str, champion: Option<&str>) -> MatchRecord {
        MatchRecord {
            season,
            home_team: home.to_string(),
            away_team: away.to_string(),
            attendance: 10_000,
            home_squad_value: 50.0,
            away_squad_value: 40.0,
            home_goals: 1,
            away_goals: 0,
            champion: champion.map(|c| c.to_string()),
        }
    }

    fn test_db() -> Database {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE matches (
                 season INTEGER NOT NULL,
                 home_team TEXT NOT NULL,
                 away_team TEXT NOT NULL,
                 attendance INTEGER NOT NULL,
                 home_squad_value REAL NOT NULL,
                 away_squad_value REAL NOT NULL,
                 home_goals INTEGER NOT NULL,
                 away_goals INTEGER NOT NULL
             );
             CREATE TABLE champions (
                 season INTEGER NOT NULL,
                 team TEXT NOT NULL
             );
             INSERT INTO matches VALUES
                 (2019, 'Santos', 'Gremio', 20000, 55.0, 45.0, 2, 2),
                 (2020, 'Flamengo', 'Santos', 45000, 120.0, 80.0, 3, 1),
                 (2020, 'Santos', 'Flamengo', 30000, 80.0, 120.0, 0, 0);
             INSERT INTO champions VALUES (2020, 'Flamengo');",
        )
        .unwrap();
        Database::from_connection(conn)
    }

    fn test_state() -> AppState {
        let (llm_tx, _llm_rx) = mpsc::channel(32);
        AppState::new(test_config(), test_db(), LlmClient::Disabled, llm_tx)
    }

    // ---- assemble_panels ----

    #[test]
    fn panels_follow_selection_order() {
        let matches = vec![
            record(2019, "A", "B", None),
            record(2020, "A", "B", Some("A")),
            record(2021, "A", "B", None),
        ];

        let panels = assemble_panels(&matches, &[2021, 2019], 14);
        let order: Vec<u16> = panels.iter().map(|p| p.season).collect();
        assert_eq!(order, vec![2021, 2019]);
    }

    #[test]
    fn panel_carries_champion_when_recorded() {
        let matches = vec![record(2020, "A", "B", Some("A"))];

        let panels = assemble_panels(&matches, &[2020], 14);
        assert_eq!(panels[0].champion.as_deref(), Some("A"));
    }

    #[test]
    fn panel_champion_is_none_without_record() {
        let matches = vec![record(2020, "A", "B", None)];

        let panels = assemble_panels(&matches, &[2020], 14);
        assert!(panels[0].champion.is_none());
    }

    #[test]
    fn empty_season_yields_error_panel_without_blocking_others() {
        let matches = vec![record(2020, "A", "B", Some("A"))];

        let panels = assemble_panels(&matches, &[2020, 1999], 14);

        assert!(panels[0].stats.is_ok());
        assert_eq!(
            panels[1].stats,
            Err(StatsError::EmptySeason { season: 1999 })
        );
    }

    #[test]
    fn panel_stats_carry_both_tables() {
        let matches = vec![
            record(2020, "A", "B", None),
            record(2020, "B", "A", None),
        ];

        let panels = assemble_panels(&matches, &[2020], 14);
        let stats = panels[0].stats.as_ref().unwrap();
        assert_eq!(stats.attendance.rows.len(), 2);
        assert_eq!(stats.squad_value.rows.len(), 2);
    }

    // ---- AppState ----

    #[test]
    fn load_tables_populates_state() {
        let mut state = test_state();
        state.load_tables().unwrap();

        assert_eq!(state.seasons, vec![2019, 2020]);
        assert_eq!(state.matches.len(), 3);
        assert_eq!(state.chart.len(), 2);
    }

    #[test]
    fn load_tables_drops_vanished_selection() {
        let mut state = test_state();
        state.load_tables().unwrap();
        state.selected = vec![2020, 2022];

        state.load_tables().unwrap();
        assert_eq!(state.selected, vec![2020]);
    }

    #[tokio::test]
    async fn rebuild_selection_bumps_generation() {
        let mut state = test_state();
        state.load_tables().unwrap();
        state.selected = vec![2020];

        let before = state.narrative_generation;
        let _ = state.rebuild_selection();
        assert_eq!(state.narrative_generation, before + 1);

        state.cancel_narrative_task();
    }

    #[tokio::test]
    async fn toggle_adds_then_removes_season() {
        let mut state = test_state();
        state.load_tables().unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::ToggleSeason(2020), &ui_tx).await;
        assert_eq!(state.selected, vec![2020]);
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Panels(panels) => assert_eq!(panels.len(), 1),
            other => panic!("expected Panels, got {other:?}"),
        }

        handle_user_command(&mut state, UserCommand::ToggleSeason(2020), &ui_tx).await;
        assert!(state.selected.is_empty());
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Panels(panels) => assert!(panels.is_empty()),
            other => panic!("expected Panels, got {other:?}"),
        }

        state.cancel_narrative_task();
    }

    #[tokio::test]
    async fn toggle_preserves_selection_order() {
        let mut state = test_state();
        state.load_tables().unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::ToggleSeason(2020), &ui_tx).await;
        handle_user_command(&mut state, UserCommand::ToggleSeason(2019), &ui_tx).await;
        assert_eq!(state.selected, vec![2020, 2019]);

        let _ = ui_rx.recv().await;
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Panels(panels) => {
                let order: Vec<u16> = panels.iter().map(|p| p.season).collect();
                assert_eq!(order, vec![2020, 2019]);
            }
            other => panic!("expected Panels, got {other:?}"),
        }

        state.cancel_narrative_task();
    }

    #[tokio::test]
    async fn toggle_for_unknown_season_is_ignored() {
        let mut state = test_state();
        state.load_tables().unwrap();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::ToggleSeason(1850), &ui_tx).await;
        assert!(state.selected.is_empty());
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn refresh_sends_tables_then_panels() {
        let mut state = test_state();
        state.load_tables().unwrap();
        state.selected = vec![2020];
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::Refresh, &ui_tx).await;

        match ui_rx.recv().await.unwrap() {
            UiUpdate::Tables(snapshot) => {
                assert_eq!(snapshot.seasons, vec![2019, 2020]);
            }
            other => panic!("expected Tables, got {other:?}"),
        }
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Panels(panels) => assert_eq!(panels.len(), 1),
            other => panic!("expected Panels, got {other:?}"),
        }

        state.cancel_narrative_task();
    }

    // ---- LLM event routing ----

    #[tokio::test]
    async fn stale_generation_events_are_discarded() {
        let mut state = test_state();
        state.narrative_generation = 5;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_llm_event(
            &mut state,
            LlmEvent::Token {
                ordinal: 0,
                text: "stale".to_string(),
                generation: 4,
            },
            &ui_tx,
        )
        .await;

        assert!(ui_rx.try_recv().is_err(), "stale event must not reach UI");
    }

    #[tokio::test]
    async fn current_generation_events_are_forwarded() {
        let mut state = test_state();
        state.narrative_generation = 5;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_llm_event(
            &mut state,
            LlmEvent::Token {
                ordinal: 1,
                text: "fresh".to_string(),
                generation: 5,
            },
            &ui_tx,
        )
        .await;
        handle_llm_event(
            &mut state,
            LlmEvent::Complete {
                ordinal: 1,
                generation: 5,
            },
            &ui_tx,
        )
        .await;
        handle_llm_event(
            &mut state,
            LlmEvent::Error {
                ordinal: 2,
                kind: NarrativeErrorKind::Transient,
                message: "rate limited".to_string(),
                generation: 5,
            },
            &ui_tx,
        )
        .await;

        match ui_rx.recv().await.unwrap() {
            UiUpdate::NarrativeToken { ordinal, text } => {
                assert_eq!(ordinal, 1);
                assert_eq!(text, "fresh");
            }
            other => panic!("expected NarrativeToken, got {other:?}"),
        }
        match ui_rx.recv().await.unwrap() {
            UiUpdate::NarrativeComplete { ordinal } => assert_eq!(ordinal, 1),
            other => panic!("expected NarrativeComplete, got {other:?}"),
        }
        match ui_rx.recv().await.unwrap() {
            UiUpdate::NarrativeError { ordinal, kind, .. } => {
                assert_eq!(ordinal, 2);
                assert_eq!(kind, NarrativeErrorKind::Transient);
            }
            other => panic!("expected NarrativeError, got {other:?}"),
        }
    }
}

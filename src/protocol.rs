// Message types exchanged between the TUI, the orchestrator, and the
// narrative task. The three mpsc channels in main.rs carry exactly these.

use crate::db::SeasonAttendance;
use crate::stats::attendance::AttendanceTable;
use crate::stats::squad_value::SquadValueTable;
use crate::stats::StatsError;

/// Commands flowing from the TUI input handler to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Add or remove a season from the current selection.
    ToggleSeason(u16),
    /// Re-query the database and rebuild every panel.
    Refresh,
    /// Shut down the application.
    Quit,
}

/// Lifecycle of one panel's narrative stream, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Error,
}

/// How a narrative request failed. Transient failures are retryable
/// (rate limits, upstream outages, network drops); permanent ones are not
/// (bad credentials, malformed requests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeErrorKind {
    Transient,
    Permanent,
}

/// Streaming progress of one season's narrative summary.
///
/// `ordinal` is the index of the season within the current selection, so the
/// UI routes tokens to the right panel. `generation` stamps the selection the
/// event belongs to; the orchestrator drops events from superseded
/// selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmEvent {
    Token {
        ordinal: usize,
        text: String,
        generation: u64,
    },
    Complete {
        ordinal: usize,
        generation: u64,
    },
    Error {
        ordinal: usize,
        kind: NarrativeErrorKind,
        message: String,
        generation: u64,
    },
}

/// The two per-season aggregate tables, computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonHighlights {
    pub attendance: AttendanceTable,
    pub squad_value: SquadValueTable,
}

/// Everything the UI renders for one selected season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonPanels {
    pub season: u16,
    /// `None` when the champions table has no row for the season.
    pub champion: Option<String>,
    /// `Err` when the season has no matches; the UI renders a notice in
    /// place of the tables.
    pub stats: Result<SeasonHighlights, StatsError>,
}

/// Season list and overview chart data, refreshed together from the
/// database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablesSnapshot {
    pub seasons: Vec<u16>,
    pub chart: Vec<SeasonAttendance>,
}

/// State updates flowing from the orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Fresh season list and chart data.
    Tables(Box<TablesSnapshot>),
    /// Rebuilt panel set for the current selection, in selection order.
    Panels(Vec<SeasonPanels>),
    /// A narrative text fragment for the panel at `ordinal`.
    NarrativeToken { ordinal: usize, text: String },
    /// The narrative for the panel at `ordinal` finished streaming.
    NarrativeComplete { ordinal: usize },
    /// The narrative for the panel at `ordinal` failed.
    NarrativeError {
        ordinal: usize,
        kind: NarrativeErrorKind,
        message: String,
    },
}

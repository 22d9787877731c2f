// Per-season aggregate statistics over the match table.

pub mod attendance;
pub mod squad_value;

use thiserror::Error;

/// Failure modes of the aggregation functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The requested season has no matches, so no maximum row exists.
    /// Callers decide the recovery policy (skip, placeholder, abort).
    #[error("season {season} has no matches to aggregate")]
    EmptySeason { season: u16 },
}

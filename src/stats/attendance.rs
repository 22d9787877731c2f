// Mean home attendance per team within a season, plus the leading row.

use std::collections::BTreeMap;

use crate::db::MatchRecord;
use crate::stats::StatsError;

/// One aggregate row: a home team's mean attendance for a season.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRow {
    pub season: u16,
    pub team: String,
    /// Arithmetic mean of attendance over the team's home matches.
    pub mean_attendance: f64,
    /// Number of home matches the mean was taken over.
    pub matches: u32,
}

/// The full per-team table for one season together with the flagged maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceTable {
    /// One row per distinct home team, ordered by team name.
    pub rows: Vec<AttendanceRow>,
    /// The row with the highest mean attendance. Ties go to the
    /// lexicographically smallest team name.
    pub leader: AttendanceRow,
}

/// Compute mean home attendance per team for `season`.
///
/// Filters `matches` to the season, groups by home team, and averages the
/// attendance per group. Grouping uses a `BTreeMap`, so the output ordering
/// is deterministic and two runs over identical input produce identical
/// tables.
///
/// Returns `StatsError::EmptySeason` when the season has no matches: the
/// maximum of an empty table is undefined and this fails loudly rather than
/// inventing a placeholder.
pub fn attendance_by_team(
    matches: &[MatchRecord],
    season: u16,
) -> Result<AttendanceTable, StatsError> {
    let mut groups: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.season == season) {
        let entry = groups.entry(m.home_team.as_str()).or_insert((0, 0));
        entry.0 += u64::from(m.attendance);
        entry.1 += 1;
    }

    let rows: Vec<AttendanceRow> = groups
        .into_iter()
        .map(|(team, (total, count))| AttendanceRow {
            season,
            team: team.to_string(),
            mean_attendance: total as f64 / count as f64,
            matches: count,
        })
        .collect();

    // Reversed name comparison inside max_by breaks value ties in favor of
    // the lexicographically smallest team.
    let Some(leader) = rows
        .iter()
        .max_by(|a, b| {
            a.mean_attendance
                .partial_cmp(&b.mean_attendance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.team.cmp(&a.team))
        })
        .cloned()
    else {
        return Err(StatsError::EmptySeason { season });
    };

    Ok(AttendanceTable { rows, leader })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

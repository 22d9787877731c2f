// Combined squad-value score per team within a season, plus the leading row.
//
// A team's score joins its best home-squad value with its best away-squad
// value and divides by the league round size. The divisor is a fixed
// normalization constant, not the team's match count.

use std::collections::BTreeMap;

use crate::db::MatchRecord;
use crate::stats::StatsError;

/// One aggregate row: a team's combined squad-value score for a season.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadValueRow {
    pub season: u16,
    pub team: String,
    /// (max home-squad value + max away-squad value) / round_size, with a
    /// missing side counted as zero.
    pub combined_value: f64,
}

/// The full per-team table for one season together with the flagged maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadValueTable {
    /// One row per team that appeared home or away, ordered by team name.
    pub rows: Vec<SquadValueRow>,
    /// The row with the highest combined score. Ties go to the
    /// lexicographically smallest team name.
    pub leader: SquadValueRow,
}

/// Compute the combined squad-value score per team for `season`.
///
/// The home and away maxima are grouped independently and merged with a full
/// outer join on team name: a team that only hosted (or only visited) still
/// gets a row, with the absent side contributing zero.
///
/// Returns `StatsError::EmptySeason` when the season has no matches.
pub fn squad_value_by_team(
    matches: &[MatchRecord],
    season: u16,
    round_size: u32,
) -> Result<SquadValueTable, StatsError> {
    // (max home value, max away value) per team; either side may stay 0.0.
    let mut sides: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.season == season) {
        let home = sides.entry(m.home_team.as_str()).or_insert((0.0, 0.0));
        home.0 = home.0.max(m.home_squad_value);
        let away = sides.entry(m.away_team.as_str()).or_insert((0.0, 0.0));
        away.1 = away.1.max(m.away_squad_value);
    }

    let divisor = f64::from(round_size);
    let rows: Vec<SquadValueRow> = sides
        .into_iter()
        .map(|(team, (home_max, away_max))| SquadValueRow {
            season,
            team: team.to_string(),
            combined_value: (home_max + away_max) / divisor,
        })
        .collect();

    let Some(leader) = rows
        .iter()
        .max_by(|a, b| {
            a.combined_value
                .partial_cmp(&b.combined_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.team.cmp(&a.team))
        })
        .cloned()
    else {
        return Err(StatsError::EmptySeason { season });
    };

    Ok(SquadValueTable { rows, leader })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

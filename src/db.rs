// SQLite data access for historical league seasons.
//
// All queries are fixed, parameterized statements. Nothing in this module
// interpolates identifiers or values into SQL text.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// One historical match, joined with the champion of its season when the
/// champions table knows one.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub season: u16,
    pub home_team: String,
    pub away_team: String,
    pub attendance: u32,
    pub home_squad_value: f64,
    pub away_squad_value: f64,
    pub home_goals: u8,
    pub away_goals: u8,
    /// `None` when the season has no champion row.
    pub champion: Option<String>,
}

/// League-wide mean attendance for one season, backing the overview chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonAttendance {
    pub season: u16,
    /// Mean attendance over every match of the season, truncated to whole
    /// spectators.
    pub avg_attendance: u32,
}

/// Read-only handle to the dashboard database.
///
/// The connection is wrapped in a `Mutex` so the handle can be shared across
/// the orchestrator and spawned tasks.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Wrap an existing connection. Used by tests and tooling that build
    /// their own schema.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Load every match across all seasons, each row carrying its season's
    /// champion when one is recorded.
    ///
    /// The ordering clause makes the result deterministic so downstream
    /// aggregation sees the same input on every refresh.
    pub fn load_matches(&self) -> Result<Vec<MatchRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))?;

        let mut stmt = conn
            .prepare(
                "SELECT m.season, m.home_team, m.away_team, m.attendance,
                        m.home_squad_value, m.away_squad_value,
                        m.home_goals, m.away_goals, c.team
                 FROM matches m
                 LEFT JOIN champions c ON c.season = m.season
                 ORDER BY m.season, m.home_team, m.away_team",
            )
            .context("failed to prepare match query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(MatchRecord {
                    season: row.get(0)?,
                    home_team: row.get(1)?,
                    away_team: row.get(2)?,
                    attendance: row.get(3)?,
                    home_squad_value: row.get(4)?,
                    away_squad_value: row.get(5)?,
                    home_goals: row.get(6)?,
                    away_goals: row.get(7)?,
                    champion: row.get(8)?,
                })
            })
            .context("failed to query matches")?;

        let mut matches = Vec::new();
        for row in rows {
            matches.push(row.context("failed to read match row")?);
        }
        Ok(matches)
    }

    /// Load the league-wide mean attendance per season, ascending by season.
    pub fn load_attendance_by_season(&self) -> Result<Vec<SeasonAttendance>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))?;

        let mut stmt = conn
            .prepare(
                "SELECT season, CAST(AVG(attendance) AS INTEGER)
                 FROM matches
                 GROUP BY season
                 ORDER BY season",
            )
            .context("failed to prepare season attendance query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SeasonAttendance {
                    season: row.get(0)?,
                    avg_attendance: row.get(1)?,
                })
            })
            .context("failed to query season attendance")?;

        let mut seasons = Vec::new();
        for row in rows {
            seasons.push(row.context("failed to read season attendance row")?);
        }
        Ok(seasons)
    }

    /// Load the distinct seasons present in the match table, ascending.
    pub fn load_seasons(&self) -> Result<Vec<u16>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT season FROM matches ORDER BY season")
            .context("failed to prepare season list query")?;

        let rows = stmt
            .query_map([], |row| row.get::<_, u16>(0))
            .context("failed to query season list")?;

        let mut seasons = Vec::new();
        for row in rows {
            seasons.push(row.context("failed to read season row")?);
        }
        Ok(seasons)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Prompt templates for season narrative summaries.
//
// Constructs compact, structured prompts for the Claude API to narrate one
// season of a league. Each prompt includes pre-computed numbers so the LLM
// focuses on storytelling rather than arithmetic.

use std::collections::BTreeMap;

use crate::db::MatchRecord;
use crate::protocol::SeasonHighlights;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt for all season summary calls.
pub fn system_prompt(league_name: &str) -> String {
    format!(
        "You are a football analyst writing short season recaps for the {league_name}.\n\
         \n\
         You will receive pre-computed facts about one season: the champion, goal\n\
         and attendance figures, squad values, the biggest scoreline, and the draw\n\
         percentage.\n\
         \n\
         Write a recap that covers, in order:\n\
         1. Who the champion was\n\
         2. Which team scored the most home goals\n\
         3. Which team drew the highest average home attendance\n\
         4. The biggest scoreline of the season and the fixture it happened in\n\
         5. What share of matches ended in a draw\n\
         Close with one curiosity about the season worth knowing.\n\
         \n\
         Be concise and direct. Use the pre-computed numbers as given \u{2014} do NOT\n\
         do arithmetic. One short paragraph per point."
    )
}

// ---------------------------------------------------------------------------
// Season summary prompt
// ---------------------------------------------------------------------------

/// Build the user prompt for one season's narrative summary.
///
/// `matches` must already be filtered to the season; `highlights` carries the
/// two aggregate tables computed from the same rows.
pub fn build_season_summary_prompt(
    season: u16,
    matches: &[MatchRecord],
    highlights: &SeasonHighlights,
) -> String {
    let mut prompt = String::with_capacity(1024);

    // Section 1: SEASON header
    let champion = matches
        .iter()
        .find_map(|m| m.champion.as_deref())
        .unwrap_or("unavailable");
    prompt.push_str(&format!(
        "## SEASON {season}\n\
         Champion: {champion}\n\
         Matches played: {}\n\n",
        matches.len(),
    ));

    // Section 2: HOME GOALS
    prompt.push_str("## HOME GOALS (top 3 teams)\n");
    for (team, goals) in top_home_scorers(matches, 3) {
        prompt.push_str(&format!("  {team}: {goals} home goals\n"));
    }
    prompt.push('\n');

    // Section 3: ATTENDANCE
    let att = &highlights.attendance.leader;
    prompt.push_str(&format!(
        "## ATTENDANCE\n\
         Highest average home attendance: {} with {:.0} over {} home matches\n\n",
        att.team, att.mean_attendance, att.matches,
    ));

    // Section 4: SQUAD VALUE
    let sv = &highlights.squad_value.leader;
    prompt.push_str(&format!(
        "## SQUAD VALUE\n\
         Highest combined squad-value score: {} at {:.2}\n\n",
        sv.team, sv.combined_value,
    ));

    // Section 5: BIGGEST SCORELINE
    if let Some(m) = biggest_scoreline(matches) {
        prompt.push_str(&format!(
            "## BIGGEST SCORELINE\n\
             {} {} x {} {}\n\n",
            m.home_team, m.home_goals, m.away_goals, m.away_team,
        ));
    }

    // Section 6: DRAWS
    prompt.push_str(&format!(
        "## DRAWS\n\
         {:.1}% of matches ended in a draw\n\n",
        draw_percentage(matches),
    ));

    // Section 7: Closing instruction
    prompt.push_str("## WRITE THE RECAP\n\
         Cover the five points in order, then close with one curiosity.");

    prompt
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Total home goals per team, descending, truncated to `count`.
/// Ties keep team-name order from the underlying map.
fn top_home_scorers(matches: &[MatchRecord], count: usize) -> Vec<(String, u32)> {
    let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
    for m in matches {
        *totals.entry(m.home_team.as_str()).or_insert(0) += u32::from(m.home_goals);
    }

    let mut scorers: Vec<(String, u32)> = totals
        .into_iter()
        .map(|(team, goals)| (team.to_string(), goals))
        .collect();
    scorers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scorers.truncate(count);
    scorers
}

/// The match with the largest total goal count; goal difference breaks ties.
fn biggest_scoreline(matches: &[MatchRecord]) -> Option<&MatchRecord> {
    matches.iter().max_by_key(|m| {
        let total = u16::from(m.home_goals) + u16::from(m.away_goals);
        let diff = u16::from(m.home_goals.abs_diff(m.away_goals));
        (total, diff)
    })
}

/// Share of matches that ended level, as a percentage. Zero for no matches.
fn draw_percentage(matches: &[MatchRecord]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    let draws = matches
        .iter()
        .filter(|m| m.home_goals == m.away_goals)
        .count();
    draws as f64 / matches.len() as f64 * 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::attendance::attendance_by_team;
    use crate::stats::squad_value::squad_value_by_team;

    fn record(
        home: &str,
        away: &str,
        hg: u8,
        ag: u8,
        attendance: u32,
        champion: Option<&str>,
    ) -> MatchRecord {
        MatchRecord {
            season: 2020,
            home_team: home.to_string(),
            away_team: away.to_string(),
            attendance,
            home_squad_value: 50.0,
            away_squad_value: 40.0,
            home_goals: hg,
            away_goals: ag,
            champion: champion.map(|c| c.to_string()),
        }
    }

    fn highlights(matches: &[MatchRecord]) -> SeasonHighlights {
        SeasonHighlights {
            attendance: attendance_by_team(matches, 2020).unwrap(),
            squad_value: squad_value_by_team(matches, 2020, 14).unwrap(),
        }
    }

    // ---- System prompt tests ----

    #[test]
    fn system_prompt_names_league_and_questions() {
        let sp = system_prompt("Campeonato Brasileiro");
        assert!(sp.contains("Campeonato Brasileiro"), "should name the league");
        assert!(sp.contains("champion"), "should ask about the champion");
        assert!(sp.contains("home goals"), "should ask about home goals");
        assert!(sp.contains("attendance"), "should ask about attendance");
        assert!(sp.contains("scoreline"), "should ask about the scoreline");
        assert!(sp.contains("draw"), "should ask about draws");
        assert!(sp.contains("curiosity"), "should ask for a curiosity");
    }

    // ---- Summary prompt tests ----

    #[test]
    fn summary_prompt_contains_sections() {
        let matches = vec![
            record("Flamengo", "Santos", 3, 1, 50_000, Some("Flamengo")),
            record("Santos", "Flamengo", 1, 1, 30_000, Some("Flamengo")),
        ];
        let hl = highlights(&matches);

        let prompt = build_season_summary_prompt(2020, &matches, &hl);

        assert!(prompt.contains("## SEASON 2020"), "should have season header");
        assert!(prompt.contains("Champion: Flamengo"), "should name the champion");
        assert!(prompt.contains("## HOME GOALS"), "should have home goals section");
        assert!(prompt.contains("## ATTENDANCE"), "should have attendance section");
        assert!(prompt.contains("## SQUAD VALUE"), "should have squad value section");
        assert!(prompt.contains("## BIGGEST SCORELINE"), "should have scoreline section");
        assert!(prompt.contains("## DRAWS"), "should have draws section");
        assert!(prompt.contains("WRITE THE RECAP"), "should have closing instruction");
    }

    #[test]
    fn summary_prompt_uses_sentinel_when_champion_unknown() {
        let matches = vec![record("A", "B", 1, 0, 10_000, None)];
        let hl = highlights(&matches);

        let prompt = build_season_summary_prompt(2020, &matches, &hl);
        assert!(prompt.contains("Champion: unavailable"));
    }

    #[test]
    fn summary_prompt_includes_precomputed_numbers() {
        let matches = vec![
            record("Flamengo", "Santos", 4, 0, 60_000, Some("Flamengo")),
            record("Santos", "Flamengo", 0, 0, 20_000, Some("Flamengo")),
        ];
        let hl = highlights(&matches);

        let prompt = build_season_summary_prompt(2020, &matches, &hl);

        assert!(prompt.contains("Flamengo: 4 home goals"));
        assert!(prompt.contains("Flamengo with 60000 over 1 home matches"));
        assert!(prompt.contains("Flamengo 4 x 0 Santos"));
        assert!(prompt.contains("50.0% of matches ended in a draw"));
    }

    // ---- Helper tests ----

    #[test]
    fn top_home_scorers_sorts_descending_with_name_tiebreak() {
        let matches = vec![
            record("Zebra", "A", 2, 0, 1, None),
            record("Alpha", "B", 2, 0, 1, None),
            record("Mid", "C", 5, 0, 1, None),
        ];

        let scorers = top_home_scorers(&matches, 3);
        assert_eq!(
            scorers,
            vec![
                ("Mid".to_string(), 5),
                ("Alpha".to_string(), 2),
                ("Zebra".to_string(), 2),
            ]
        );
    }

    #[test]
    fn top_home_scorers_truncates() {
        let matches = vec![
            record("A", "X", 1, 0, 1, None),
            record("B", "X", 2, 0, 1, None),
            record("C", "X", 3, 0, 1, None),
        ];
        assert_eq!(top_home_scorers(&matches, 2).len(), 2);
    }

    #[test]
    fn biggest_scoreline_prefers_total_then_margin() {
        let matches = vec![
            record("A", "B", 3, 3, 1, None),
            record("C", "D", 5, 1, 1, None),
            record("E", "F", 2, 0, 1, None),
        ];

        let m = biggest_scoreline(&matches).unwrap();
        assert_eq!(m.home_team, "C");
    }

    #[test]
    fn draw_percentage_counts_level_matches() {
        let matches = vec![
            record("A", "B", 1, 1, 1, None),
            record("C", "D", 0, 0, 1, None),
            record("E", "F", 2, 1, 1, None),
            record("G", "H", 3, 0, 1, None),
        ];

        assert!((draw_percentage(&matches) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn draw_percentage_is_zero_for_no_matches() {
        assert_eq!(draw_percentage(&[]), 0.0);
    }
}

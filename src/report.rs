//! Plain-text reporting for finished schedules and failed searches.

use rustc_hash::FxHashMap;

use crate::models::Schedule;
use crate::scheduler::ExhaustionReport;

fn team_column_width(ids: &[String]) -> usize {
    ids.iter().map(String::len).max().unwrap_or(4).max(4)
}

fn sorted_participants(schedule: &Schedule) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for game in &schedule.games {
        for team in [&game.home, &game.away] {
            if !ids.contains(team) {
                ids.push(team.clone());
            }
        }
    }
    ids.sort();
    ids
}

/// Per-team totals: games, home games, away games.
pub fn season_summary(schedule: &Schedule) -> String {
    let ids = sorted_participants(schedule);
    let width = team_column_width(&ids);
    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$}  {:>5}  {:>4}  {:>4}\n",
        "Team", "Games", "Home", "Away"
    ));
    for id in &ids {
        let total = schedule.games_for_team(id).count();
        let home = schedule.games_for_team(id).filter(|g| &g.home == id).count();
        out.push_str(&format!(
            "{:<width$}  {:>5}  {:>4}  {:>4}\n",
            id,
            total,
            home,
            total - home
        ));
    }
    out
}

/// Per-team count of dates with two games.
pub fn doubleheader_summary(schedule: &Schedule) -> String {
    let ids = sorted_participants(schedule);
    let width = team_column_width(&ids);
    let mut out = String::new();
    out.push_str(&format!("{:<width$}  {}\n", "Team", "Doubleheader days"));
    for id in &ids {
        let mut per_date: FxHashMap<chrono::NaiveDate, u32> = FxHashMap::default();
        for game in schedule.games_for_team(id) {
            *per_date.entry(game.date).or_insert(0) += 1;
        }
        let days = per_date.values().filter(|&&count| count == 2).count();
        out.push_str(&format!("{:<width$}  {}\n", id, days));
    }
    out
}

/// Symmetric meeting-count matrix over all participating teams.
pub fn matchup_matrix(schedule: &Schedule) -> String {
    let ids = sorted_participants(schedule);
    let width = team_column_width(&ids);
    let mut counts: FxHashMap<(&str, &str), u32> = FxHashMap::default();
    for game in &schedule.games {
        *counts.entry((&game.home, &game.away)).or_insert(0) += 1;
        *counts.entry((&game.away, &game.home)).or_insert(0) += 1;
    }

    let mut out = String::new();
    out.push_str(&format!("{:<width$}", ""));
    for id in &ids {
        out.push_str(&format!("  {id:>width$}"));
    }
    out.push('\n');
    for row in &ids {
        out.push_str(&format!("{row:<width$}"));
        for col in &ids {
            let count = counts
                .get(&(row.as_str(), col.as_str()))
                .copied()
                .unwrap_or(0);
            out.push_str(&format!("  {count:>width$}"));
        }
        out.push('\n');
    }
    out
}

/// Operator-facing summary of a search that ran out of retries.
pub fn exhaustion_summary(report: &ExhaustionReport) -> String {
    let mut out = format!(
        "No complete schedule within {} attempts; best attempt placed {} games.\n",
        report.attempts, report.best_placed
    );
    if !report.unplaced.is_empty() {
        out.push_str("Unplaced matchups:\n");
        for (first, second, count) in &report.unplaced {
            out.push_str(&format!("  {first} vs {second}: {count} meeting(s)\n"));
        }
    }
    if !report.teams_below_target.is_empty() {
        out.push_str("Teams short of their season total:\n");
        for (team, placed) in &report.teams_below_target {
            out.push_str(&format!("  {team}: {placed} game(s) placed\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Game;
    use chrono::{NaiveDate, NaiveTime};

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn game(date: NaiveDate, time: NaiveTime, home: &str, away: &str) -> Game {
        Game {
            date,
            time,
            field: "Field 1".to_string(),
            home: home.to_string(),
            away: away.to_string(),
        }
    }

    fn schedule() -> Schedule {
        Schedule::new(vec![
            game(d(2025, 5, 4), t(10, 0), "A1", "A2"),
            game(d(2025, 5, 4), t(12, 0), "A3", "A1"),
            game(d(2025, 5, 11), t(10, 0), "A2", "A3"),
        ])
    }

    #[test]
    fn test_season_summary_counts() {
        let summary = season_summary(&schedule());
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("A1"));
        assert!(lines[1].contains('2')); // two games
        assert!(lines[1].ends_with('1')); // one away game
    }

    #[test]
    fn test_doubleheader_summary_counts() {
        let summary = doubleheader_summary(&schedule());
        let a1_line = summary.lines().find(|l| l.starts_with("A1")).unwrap();
        assert!(a1_line.trim_end().ends_with('1'));
        let a2_line = summary.lines().find(|l| l.starts_with("A2")).unwrap();
        assert!(a2_line.trim_end().ends_with('0'));
    }

    #[test]
    fn test_matchup_matrix_symmetry() {
        let matrix = matchup_matrix(&schedule());
        let lines: Vec<&str> = matrix.lines().collect();
        // Header plus one row per team.
        assert_eq!(lines.len(), 4);
        // A1 met A2 once; the diagonal stays zero.
        let a1_cells: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(a1_cells, vec!["A1", "0", "1", "1"]);
    }

    #[test]
    fn test_exhaustion_summary_lists_shortfalls() {
        let report = ExhaustionReport {
            attempts: 3,
            best_placed: 5,
            unplaced: vec![("A1".to_string(), "A2".to_string(), 2)],
            teams_below_target: vec![("A1".to_string(), 4)],
        };
        let summary = exhaustion_summary(&report);
        assert!(summary.contains("3 attempts"));
        assert!(summary.contains("A1 vs A2: 2 meeting(s)"));
        assert!(summary.contains("A1: 4 game(s) placed"));
    }
}

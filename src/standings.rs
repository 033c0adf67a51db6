use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ServiceResult;
use crate::provider::{Provider, ProviderError};

/// Leagues served by `/standings`, keyed by display name.
pub const STANDINGS_LEAGUES: [(&str, u32); 4] = [
    ("Premier League", 39),
    ("LaLiga", 140),
    ("SerieA", 135),
    ("Bundesliga", 78),
];

const MAX_ROWS: usize = 20;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StandingRow {
    pub rank: u32,
    pub name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
    pub last_five: String,
    pub standing: String,
}

#[derive(Debug, Deserialize)]
struct RawStandingRow {
    rank: u32,
    team: RawTeam,
    #[serde(default)]
    points: u32,
    #[serde(rename = "goalsDiff", default)]
    goals_diff: i32,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    all: RawRecord,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    played: u32,
    win: u32,
    draw: u32,
    lose: u32,
    goals: RawGoals,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGoals {
    #[serde(rename = "for")]
    scored: u32,
    against: u32,
}

/// Rows of the first table in a `/standings` response, at most 20.
pub fn parse_standings(response: &[Value]) -> Result<Vec<StandingRow>, ProviderError> {
    let Some(table) = response
        .first()
        .and_then(|entry| entry.get("league"))
        .and_then(|league| league.get("standings"))
        .and_then(|groups| groups.get(0))
    else {
        return Ok(Vec::new());
    };
    let rows: Vec<RawStandingRow> = serde_json::from_value(table.clone())
        .map_err(|err| ProviderError::Payload(format!("invalid standings row: {err}")))?;

    Ok(rows
        .into_iter()
        .take(MAX_ROWS)
        .map(|row| StandingRow {
            rank: row.rank,
            name: row.team.name,
            matches_played: row.all.played,
            wins: row.all.win,
            draws: row.all.draw,
            losses: row.all.lose,
            goals_for: row.all.goals.scored,
            goals_against: row.all.goals.against,
            goal_diff: row.goals_diff,
            points: row.points,
            last_five: row.form.unwrap_or_default(),
            standing: row
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "Regular".to_string()),
        })
        .collect())
}

pub fn league_table(provider: &dyn Provider, league_id: u32, season: u16) -> ServiceResult<Vec<StandingRow>> {
    let response = provider.fetch(
        "standings",
        &[("league", league_id.to_string()), ("season", season.to_string())],
    )?;
    Ok(parse_standings(&response)?)
}

/// Every configured league; a league that fails to load maps to an empty table.
pub fn all_standings(provider: &dyn Provider, season: u16) -> BTreeMap<String, Vec<StandingRow>> {
    STANDINGS_LEAGUES
        .iter()
        .map(|(name, id)| {
            let rows = match league_table(provider, *id, season) {
                Ok(rows) => {
                    if rows.is_empty() {
                        warn!(league = name, season, "no standings available");
                    }
                    rows
                }
                Err(err) => {
                    warn!(league = name, error = %err, "standings fetch failed");
                    Vec::new()
                }
            };
            (name.to_string(), rows)
        })
        .collect()
}

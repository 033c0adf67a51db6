use serde::Serialize;
use serde_json::Value;

use crate::player_stats::parse_number_cell;

/// Percentage stat kept in the provider's display form (`"55%"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentage(String);

impl Percentage {
    pub fn from_cell(cell: Option<&Value>) -> Self {
        match cell {
            Some(Value::String(s)) if parse_number_cell(s).is_some() => {
                let s = s.trim();
                if s.ends_with('%') {
                    Self(s.to_string())
                } else {
                    Self(format!("{s}%"))
                }
            }
            Some(Value::Number(n)) => Self(format!("{n}%")),
            _ => Self::zero(),
        }
    }

    pub fn zero() -> Self {
        Self("0%".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Plain number for any arithmetic: `"55%"` -> `55.0`.
    pub fn value(&self) -> f64 {
        parse_number_cell(&self.0).unwrap_or(0.0)
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TeamMatchStats {
    pub shots_total: u32,
    pub shots_on_target: u32,
    pub shots_off_target: u32,
    pub fouls: u32,
    pub corners: u32,
    pub offsides: u32,
    pub ball_possession: Percentage,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub passes_total: u32,
    /// Accurate passes (a count, not a rate).
    pub passes_accuracy: u32,
    pub passes_percentage: Percentage,
}

/// Builds the team stat record from one `statistics` array of
/// `/fixtures/statistics`. Missing or null cells become zero.
pub fn team_match_stats(stats: &[Value]) -> TeamMatchStats {
    TeamMatchStats {
        shots_total: count(stats, "Total Shots"),
        shots_on_target: count(stats, "Shots on Goal"),
        shots_off_target: count(stats, "Shots off Goal"),
        fouls: count(stats, "Fouls"),
        corners: count(stats, "Corner Kicks"),
        offsides: count(stats, "Offsides"),
        ball_possession: Percentage::from_cell(stat_cell(stats, "Ball Possession")),
        yellow_cards: count(stats, "Yellow Cards"),
        red_cards: count(stats, "Red Cards"),
        passes_total: count(stats, "Total passes"),
        passes_accuracy: count(stats, "Passes accurate"),
        passes_percentage: Percentage::from_cell(stat_cell(stats, "Passes %")),
    }
}

pub fn stat_cell<'a>(stats: &'a [Value], name: &str) -> Option<&'a Value> {
    stats
        .iter()
        .find(|s| s.get("type").and_then(|t| t.as_str()) == Some(name))
        .and_then(|s| s.get("value"))
}

fn count(stats: &[Value], name: &str) -> u32 {
    match stat_cell(stats, name) {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        Some(Value::String(s)) => parse_number_cell(s)
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u32)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Picks the queried team's block from a `/fixtures/statistics` response.
/// Matches on team id; falls back to provider order (home first).
pub fn statistics_for_team(response: &[Value], team_id: u32, is_home: bool) -> Option<&[Value]> {
    let by_id = response.iter().find(|entry| {
        entry
            .get("team")
            .and_then(|t| t.get("id"))
            .and_then(|id| id.as_u64())
            == Some(u64::from(team_id))
    });
    let entry = match by_id {
        Some(entry) => entry,
        None => response.get(if is_home { 0 } else { 1 })?,
    };
    entry
        .get("statistics")
        .and_then(|s| s.as_array())
        .map(|s| s.as_slice())
}

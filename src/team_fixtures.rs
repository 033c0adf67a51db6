use std::cmp::Ordering;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::match_stats::{TeamMatchStats, statistics_for_team, team_match_stats};
use crate::provider::Provider;

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureMatch {
    pub id: u32,
    /// Provider kickoff time, ISO-8601 with offset.
    pub date: String,
    pub timestamp: Option<i64>,
    pub home_id: u32,
    pub home_name: String,
    pub away_id: u32,
    pub away_name: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub home_winner: Option<bool>,
    pub away_winner: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum MatchResult {
    W,
    L,
    D,
}

/// One finished match seen from the queried team's side.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchRecord {
    pub fixture_id: u32,
    pub date: String,
    pub opponent: String,
    pub score: String,
    pub result: MatchResult,
    pub stats: TeamMatchStats,
}

impl FixtureMatch {
    pub fn is_home(&self, team_id: u32) -> bool {
        self.home_id == team_id
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_id == team_id || self.away_id == team_id
    }

    pub fn opponent_name(&self, team_id: u32) -> &str {
        if self.is_home(team_id) {
            &self.away_name
        } else {
            &self.home_name
        }
    }

    /// (goals for, goals against) from `team_id`'s side.
    pub fn goals_for(&self, team_id: u32) -> (u32, u32) {
        let home = self.home_goals.unwrap_or(0);
        let away = self.away_goals.unwrap_or(0);
        if self.is_home(team_id) { (home, away) } else { (away, home) }
    }

    pub fn result_for(&self, team_id: u32) -> MatchResult {
        let (ours, theirs) = if self.is_home(team_id) {
            (self.home_winner, self.away_winner)
        } else {
            (self.away_winner, self.home_winner)
        };
        match (ours, theirs) {
            (Some(true), _) => MatchResult::W,
            (_, Some(true)) => MatchResult::L,
            (Some(false), Some(false)) => MatchResult::D,
            // Winner flags missing: fall back to the scoreline.
            _ => {
                let (f, a) = self.goals_for(team_id);
                match f.cmp(&a) {
                    Ordering::Greater => MatchResult::W,
                    Ordering::Less => MatchResult::L,
                    Ordering::Equal => MatchResult::D,
                }
            }
        }
    }

    fn sort_key(&self) -> i64 {
        self.timestamp
            .or_else(|| {
                DateTime::parse_from_rfc3339(&self.date)
                    .ok()
                    .map(|d| d.timestamp())
            })
            .unwrap_or(i64::MIN)
    }
}

pub fn parse_fixture(v: &Value) -> Option<FixtureMatch> {
    let fixture = v.get("fixture")?;
    let id = u32::try_from(fixture.get("id")?.as_u64()?).ok()?;
    let date = fixture
        .get("date")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();
    let timestamp = fixture.get("timestamp").and_then(|x| x.as_i64());

    let teams = v.get("teams")?;
    let home = teams.get("home")?;
    let away = teams.get("away")?;
    let goals = v.get("goals");
    let goal = |side: &str| {
        goals
            .and_then(|g| g.get(side))
            .and_then(|x| x.as_u64())
            .and_then(|x| u32::try_from(x).ok())
    };

    Some(FixtureMatch {
        id,
        date,
        timestamp,
        home_id: u32::try_from(home.get("id")?.as_u64()?).ok()?,
        home_name: home
            .get("name")
            .and_then(|x| x.as_str())
            .unwrap_or_default()
            .to_string(),
        away_id: u32::try_from(away.get("id")?.as_u64()?).ok()?,
        away_name: away
            .get("name")
            .and_then(|x| x.as_str())
            .unwrap_or_default()
            .to_string(),
        home_goals: goal("home"),
        away_goals: goal("away"),
        home_winner: home.get("winner").and_then(|x| x.as_bool()),
        away_winner: away.get("winner").and_then(|x| x.as_bool()),
    })
}

/// Newest first; equal kickoffs order by fixture id, duplicates dropped.
pub fn sort_newest_first(fixtures: &mut Vec<FixtureMatch>) {
    fixtures.sort_by(|a, b| {
        b.sort_key()
            .cmp(&a.sort_key())
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| b.id.cmp(&a.id))
    });
    fixtures.dedup_by_key(|m| m.id);
}

/// Latest `count` finished fixtures of `team_id` in `season`.
pub fn recent_fixtures(
    provider: &dyn Provider,
    team_id: u32,
    season: u16,
    count: usize,
) -> ServiceResult<Vec<FixtureMatch>> {
    let items = provider.fetch(
        "fixtures",
        &[
            ("team", team_id.to_string()),
            ("season", season.to_string()),
            ("status", "FT".to_string()),
        ],
    )?;
    let mut fixtures: Vec<FixtureMatch> = items
        .iter()
        .filter_map(parse_fixture)
        .filter(|m| m.involves(team_id))
        .collect();
    if fixtures.is_empty() {
        return Err(ServiceError::not_found(format!(
            "no finished matches found for team {team_id} in the {season} season"
        )));
    }
    sort_newest_first(&mut fixtures);
    fixtures.truncate(count);
    Ok(fixtures)
}

/// Latest `count` finished matches with the team's own statistics, one
/// statistics request per fixture. Fixtures whose statistics cannot be
/// fetched are skipped.
pub fn recent_matches(
    provider: &dyn Provider,
    team_id: u32,
    season: u16,
    count: usize,
) -> ServiceResult<Vec<MatchRecord>> {
    let fixtures = recent_fixtures(provider, team_id, season, count)?;
    let mut out = Vec::with_capacity(fixtures.len());
    for fixture in &fixtures {
        let response = match provider.fetch(
            "fixtures/statistics",
            &[("fixture", fixture.id.to_string())],
        ) {
            Ok(response) => response,
            Err(err) => {
                warn!(fixture = fixture.id, error = %err, "skipping fixture without statistics");
                continue;
            }
        };
        match match_record(fixture, team_id, &response) {
            Some(record) => out.push(record),
            None => debug!(fixture = fixture.id, "no statistics block for team"),
        }
    }
    Ok(out)
}

pub fn match_record(fixture: &FixtureMatch, team_id: u32, stats_response: &[Value]) -> Option<MatchRecord> {
    let stats = statistics_for_team(stats_response, team_id, fixture.is_home(team_id))?;
    let (goals_for, goals_against) = fixture.goals_for(team_id);
    Some(MatchRecord {
        fixture_id: fixture.id,
        date: fixture.date.clone(),
        opponent: fixture.opponent_name(team_id).to_string(),
        score: format!("{goals_for}-{goals_against}"),
        result: fixture.result_for(team_id),
        stats: team_match_stats(stats),
    })
}

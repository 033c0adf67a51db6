use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use crate::match_stats::{TeamMatchStats, statistics_for_team, team_match_stats};
use crate::provider::Provider;
use crate::resolver::Resolved;
use crate::team_fixtures::{FixtureMatch, MatchResult, parse_fixture, sort_newest_first};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct H2hSummary {
    pub total_games: u32,
    /// Games where team 1 was at home.
    pub home_games: u32,
    pub away_games: u32,
    pub wins_team_1: u32,
    pub wins_team_2: u32,
    pub draws: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestH2h {
    pub fixture_id: u32,
    pub match_date: String,
    pub final_score: BTreeMap<String, u32>,
    pub stats: BTreeMap<String, TeamMatchStats>,
}

/// All meetings of the two teams, newest first.
pub fn h2h_fixtures(provider: &dyn Provider, team_1: u32, team_2: u32) -> ServiceResult<Vec<FixtureMatch>> {
    let items = provider.fetch("fixtures/headtohead", &[("h2h", format!("{team_1}-{team_2}"))])?;
    let mut fixtures: Vec<FixtureMatch> = items.iter().filter_map(parse_fixture).collect();
    sort_newest_first(&mut fixtures);
    Ok(fixtures)
}

pub fn summarize(fixtures: &[FixtureMatch], team_1: u32) -> H2hSummary {
    let mut out = H2hSummary::default();
    for m in fixtures.iter().filter(|m| m.involves(team_1)) {
        out.total_games += 1;
        if m.is_home(team_1) {
            out.home_games += 1;
        } else {
            out.away_games += 1;
        }
        match m.result_for(team_1) {
            MatchResult::W => out.wins_team_1 += 1,
            MatchResult::L => out.wins_team_2 += 1,
            MatchResult::D => out.draws += 1,
        }
    }
    out
}

pub fn latest(provider: &dyn Provider, team_1: &Resolved, team_2: &Resolved) -> ServiceResult<LatestH2h> {
    let fixtures = h2h_fixtures(provider, team_1.id, team_2.id)?;
    let Some(latest) = fixtures.first() else {
        return Err(ServiceError::not_found(format!(
            "no matches found between {} and {}",
            team_1.name, team_2.name
        )));
    };
    let response = provider.fetch("fixtures/statistics", &[("fixture", latest.id.to_string())])?;
    if response.is_empty() {
        return Err(ServiceError::not_found(format!(
            "no statistics available for fixture {}",
            latest.id
        )));
    }

    let mut final_score = BTreeMap::new();
    let mut stats = BTreeMap::new();
    for team in [team_1, team_2] {
        final_score.insert(team.name.clone(), latest.goals_for(team.id).0);
        let block = statistics_for_team(&response, team.id, latest.is_home(team.id)).unwrap_or(&[]);
        stats.insert(team.name.clone(), team_match_stats(block));
    }

    Ok(LatestH2h {
        fixture_id: latest.id,
        match_date: latest.date.clone(),
        final_score,
        stats,
    })
}

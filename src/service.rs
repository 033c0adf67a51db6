use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{ServiceError, ServiceResult, TeamOutcome};
use crate::head_to_head::{self, H2hSummary, LatestH2h};
use crate::player_stats::{PlayerMatchLine, PlayerSeasonRecord};
use crate::players::{self, PlayerMatchRecord};
use crate::predict::{self, PlayerPredictions, TeamPredictions};
use crate::provider::Provider;
use crate::resolver::{Resolved, Resolver};
use crate::standings::{self, StandingRow};
use crate::team_fixtures::{self, MatchRecord};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct H2hResponse {
    pub team_1: String,
    pub team_2: String,
    #[serde(flatten)]
    pub summary: H2hSummary,
}

/// Request orchestration. Every call walks the full resolve -> fetch chain
/// sequentially; nothing is kept between calls.
pub struct StatsService {
    provider: Arc<dyn Provider>,
    config: Config,
}

impl StatsService {
    pub fn new(provider: Arc<dyn Provider>, config: Config) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolver(&self, season: Option<u16>) -> Resolver<'_> {
        Resolver::new(
            self.provider.as_ref(),
            season.unwrap_or_else(|| self.config.season()),
            self.config.player_match_threshold,
        )
    }

    pub fn standings(&self) -> BTreeMap<String, Vec<StandingRow>> {
        standings::all_standings(self.provider.as_ref(), self.config.season())
    }

    fn resolve_pair(
        &self,
        resolver: &Resolver<'_>,
        team_1: &str,
        team_2: &str,
        league: &str,
    ) -> ServiceResult<(Resolved, Resolved)> {
        let league = resolver.resolve_league(league)?;
        let first = resolver.resolve_team_in(team_1, &league)?;
        let second = resolver.resolve_team_in(team_2, &league)?;
        Ok((first, second))
    }

    pub fn h2h(&self, team_1: &str, team_2: &str, league: &str) -> ServiceResult<H2hResponse> {
        let resolver = self.resolver(None);
        let (first, second) = self.resolve_pair(&resolver, team_1, team_2, league)?;
        let fixtures = head_to_head::h2h_fixtures(self.provider.as_ref(), first.id, second.id)?;
        if fixtures.is_empty() {
            return Err(ServiceError::not_found(format!(
                "no matches found between {} and {}",
                first.name, second.name
            )));
        }
        Ok(H2hResponse {
            summary: head_to_head::summarize(&fixtures, first.id),
            team_1: first.name,
            team_2: second.name,
        })
    }

    pub fn latest_h2h(&self, team_1: &str, team_2: &str, league: &str) -> ServiceResult<LatestH2h> {
        let resolver = self.resolver(None);
        let (first, second) = self.resolve_pair(&resolver, team_1, team_2, league)?;
        head_to_head::latest(self.provider.as_ref(), &first, &second)
    }

    /// Recent matches per team, keyed by the name as requested. Each team is
    /// resolved and fetched on its own; one failing leaves the other intact.
    pub fn recent_matches(
        &self,
        team_1: &str,
        team_2: &str,
        league: &str,
        matches_number: Option<usize>,
    ) -> ServiceResult<BTreeMap<String, TeamOutcome<Vec<MatchRecord>>>> {
        let count = self.config.match_count(matches_number);
        let resolver = self.resolver(None);
        let league = resolver.resolve_league(league)?;

        let mut out = BTreeMap::new();
        for name in [team_1, team_2] {
            let outcome = resolver.resolve_team_in(name, &league).and_then(|team| {
                team_fixtures::recent_matches(self.provider.as_ref(), team.id, resolver.season(), count)
            });
            if let Err(err) = &outcome {
                info!(team = name, error = %err, "recent matches unavailable");
            }
            out.insert(name.to_string(), TeamOutcome::from(outcome));
        }
        Ok(out)
    }

    pub fn team_predictions(
        &self,
        team_1: &str,
        team_2: &str,
        league: &str,
    ) -> ServiceResult<BTreeMap<String, TeamOutcome<TeamPredictions>>> {
        let count = self.config.recent_matches_default;
        let resolver = self.resolver(None);
        let league = resolver.resolve_league(league)?;

        let mut out = BTreeMap::new();
        for name in [team_1, team_2] {
            let outcome = resolver.resolve_team_in(name, &league).and_then(|team| {
                let records = no_data_as_empty(team_fixtures::recent_matches(
                    self.provider.as_ref(),
                    team.id,
                    resolver.season(),
                    count,
                ))?;
                Ok(predict::team_predictions(&records))
            });
            out.insert(name.to_string(), TeamOutcome::from(outcome));
        }
        Ok(out)
    }

    pub fn player_stats(
        &self,
        player_name: &str,
        team_name: &str,
        league_name: &str,
        season: Option<u16>,
    ) -> ServiceResult<PlayerSeasonRecord> {
        let resolver = self.resolver(season);
        let player = resolver.resolve_player(player_name, team_name, league_name)?;
        players::season_stats(self.provider.as_ref(), &player, resolver.season())
    }

    pub fn player_recent(
        &self,
        player_name: &str,
        team_name: &str,
        league_name: &str,
        matches_number: Option<usize>,
        season: Option<u16>,
    ) -> ServiceResult<Vec<PlayerMatchRecord>> {
        let resolver = self.resolver(season);
        let player = resolver.resolve_player(player_name, team_name, league_name)?;
        players::recent_matches(
            self.provider.as_ref(),
            &player,
            resolver.season(),
            self.config.match_count(matches_number),
        )
    }

    pub fn player_predictions(
        &self,
        player_name: &str,
        team_name: &str,
        league_name: &str,
        matches_number: Option<usize>,
        season: Option<u16>,
    ) -> ServiceResult<PlayerPredictions> {
        let resolver = self.resolver(season);
        let player = resolver.resolve_player(player_name, team_name, league_name)?;
        let records = no_data_as_empty(players::recent_matches(
            self.provider.as_ref(),
            &player,
            resolver.season(),
            self.config.match_count(matches_number),
        ))?;
        let lines: Vec<PlayerMatchLine> = records.iter().map(|r| r.line).collect();
        Ok(predict::player_predictions(&player.name, &lines))
    }
}

// Once the identifier is resolved, a missing data set only means there is
// nothing to fit on.
fn no_data_as_empty<T>(result: ServiceResult<Vec<T>>) -> ServiceResult<Vec<T>> {
    match result {
        Err(ServiceError::NotFound(_)) => Ok(Vec::new()),
        other => other,
    }
}

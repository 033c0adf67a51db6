use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::player_stats::{
    PlayerMatchLine, PlayerSeasonRecord, PlayerStats, RawPlayerStatistics, format_match_stats,
    season_record,
};
use crate::provider::{Provider, ProviderError};
use crate::resolver::ResolvedPlayer;
use crate::team_fixtures::recent_fixtures;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerMatchRecord {
    pub fixture_id: u32,
    pub date: String,
    pub opponent: String,
    pub stats: PlayerStats,
    #[serde(skip)]
    pub line: PlayerMatchLine,
}

/// Season totals for the player's resolved league.
pub fn season_stats(
    provider: &dyn Provider,
    player: &ResolvedPlayer,
    season: u16,
) -> ServiceResult<PlayerSeasonRecord> {
    let response = provider.fetch(
        "players",
        &[
            ("id", player.id.to_string()),
            ("season", season.to_string()),
            ("league", player.league.id.to_string()),
        ],
    )?;
    let blocks = response
        .first()
        .and_then(|entry| entry.get("statistics"))
        .and_then(|s| s.as_array())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::not_found(format!("no statistics found for {}", player.name)))?;

    // Players who moved mid-season get one block per club/competition.
    let block = blocks
        .iter()
        .find(|b| league_id_of(b) == Some(player.league.id))
        .unwrap_or(&blocks[0]);
    let raw = RawPlayerStatistics::from_value(block)
        .map_err(|err| ProviderError::Payload(format!("invalid player statistics: {err}")))?;
    Ok(season_record(&player.name, player.position, &raw))
}

/// Per-match records for the team's latest `count` finished fixtures; matches
/// the player did not feature in are left out.
pub fn recent_matches(
    provider: &dyn Provider,
    player: &ResolvedPlayer,
    season: u16,
    count: usize,
) -> ServiceResult<Vec<PlayerMatchRecord>> {
    let fixtures = recent_fixtures(provider, player.team.id, season, count)?;
    let mut out = Vec::with_capacity(fixtures.len());
    for fixture in &fixtures {
        let response = match provider.fetch("fixtures/players", &[("fixture", fixture.id.to_string())]) {
            Ok(response) => response,
            Err(err) => {
                warn!(fixture = fixture.id, error = %err, "skipping fixture without player stats");
                continue;
            }
        };
        let Some(block) = find_player_block(&response, player.id) else {
            debug!(fixture = fixture.id, player = player.id, "player absent from fixture");
            continue;
        };
        let raw = match RawPlayerStatistics::from_value(block) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(fixture = fixture.id, error = %err, "unreadable player statistics");
                continue;
            }
        };
        if raw.games.minutes.unwrap_or(0) == 0 {
            debug!(fixture = fixture.id, player = player.id, "player did not play");
            continue;
        }
        out.push(PlayerMatchRecord {
            fixture_id: fixture.id,
            date: fixture.date.clone(),
            opponent: fixture.opponent_name(player.team.id).to_string(),
            stats: format_match_stats(&raw, player.position),
            line: PlayerMatchLine::from_raw(&raw),
        });
    }
    if out.is_empty() {
        return Err(ServiceError::not_found(format!(
            "no recent match statistics found for {}",
            player.name
        )));
    }
    Ok(out)
}

/// The player's first statistics block in a `/fixtures/players` response.
pub fn find_player_block(response: &[Value], player_id: u32) -> Option<&Value> {
    response
        .iter()
        .filter_map(|team| team.get("players").and_then(|p| p.as_array()))
        .flatten()
        .find(|p| {
            p.get("player")
                .and_then(|pl| pl.get("id"))
                .and_then(|id| id.as_u64())
                == Some(u64::from(player_id))
        })
        .and_then(|p| p.get("statistics"))
        .and_then(|s| s.get(0))
}

fn league_id_of(block: &Value) -> Option<u32> {
    block
        .get("league")
        .and_then(|l| l.get("id"))
        .and_then(|id| id.as_u64())
        .and_then(|id| u32::try_from(id).ok())
}

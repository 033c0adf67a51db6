//! Name -> provider id resolution.
//!
//! Every lookup fetches the full candidate list for its context (league search,
//! league teams, team squad) and keeps the closest name. Nothing is cached.

use serde::Serialize;
use serde_json::Value;
use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::player_stats::Position;
use crate::provider::Provider;

const TOKEN_ALIGNMENT_WEIGHT: f64 = 0.9;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Resolved {
    pub id: u32,
    pub name: String,
    /// Similarity of the typed name to `name`, 0-100.
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedPlayer {
    pub id: u32,
    pub name: String,
    pub score: u8,
    pub position: Position,
    pub team: Resolved,
    pub league: Resolved,
}

pub struct Resolver<'a> {
    provider: &'a dyn Provider,
    season: u16,
    player_threshold: u8,
}

impl<'a> Resolver<'a> {
    pub fn new(provider: &'a dyn Provider, season: u16, player_threshold: u8) -> Self {
        Self {
            provider,
            season,
            player_threshold,
        }
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn resolve_league(&self, name: &str) -> ServiceResult<Resolved> {
        let items = self
            .provider
            .fetch("leagues", &[("search", name.trim().to_string())])?;
        let candidates: Vec<(u32, String)> = items
            .iter()
            .filter_map(|item| id_and_name(item.get("league")?))
            .collect();
        let league = pick(name, &candidates)
            .ok_or_else(|| ServiceError::not_found(format!("no league found matching '{name}'")))?;
        info!(query = name, matched = %league.name, score = league.score, "league resolved");
        Ok(league)
    }

    pub fn resolve_team(&self, name: &str, league_name: &str) -> ServiceResult<Resolved> {
        let league = self.resolve_league(league_name)?;
        self.resolve_team_in(name, &league)
    }

    pub fn resolve_team_in(&self, name: &str, league: &Resolved) -> ServiceResult<Resolved> {
        let items = self.provider.fetch(
            "teams",
            &[
                ("league", league.id.to_string()),
                ("season", self.season.to_string()),
            ],
        )?;
        let candidates: Vec<(u32, String)> = items
            .iter()
            .filter_map(|item| id_and_name(item.get("team")?))
            .collect();
        let team = pick(name, &candidates).ok_or_else(|| {
            ServiceError::not_found(format!("no team found matching '{name}' in {}", league.name))
        })?;
        info!(query = name, matched = %team.name, score = team.score, "team resolved");
        Ok(team)
    }

    pub fn resolve_player(
        &self,
        name: &str,
        team_name: &str,
        league_name: &str,
    ) -> ServiceResult<ResolvedPlayer> {
        let league = self.resolve_league(league_name)?;
        let team = self.resolve_team_in(team_name, &league)?;
        let items = self
            .provider
            .fetch("players/squads", &[("team", team.id.to_string())])?;
        let squad: Vec<(u32, String, Position)> = items
            .first()
            .and_then(|entry| entry.get("players"))
            .and_then(|players| players.as_array())
            .map(|players| {
                players
                    .iter()
                    .filter_map(|p| {
                        let (id, name) = id_and_name(p)?;
                        let position = p
                            .get("position")
                            .and_then(|v| v.as_str())
                            .map(Position::from_provider)
                            .unwrap_or(Position::Unknown);
                        Some((id, name, position))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let names: Vec<&str> = squad.iter().map(|(_, n, _)| n.as_str()).collect();
        let Some((idx, score)) = best_match(name, &names) else {
            return Err(ServiceError::not_found(format!(
                "no squad found for {}",
                team.name
            )));
        };
        if score < self.player_threshold {
            debug!(query = name, closest = names[idx], score, "player match below threshold");
            return Err(ServiceError::not_found(format!(
                "no close match for player '{name}' in {}",
                team.name
            )));
        }
        let (id, matched, position) = squad[idx].clone();
        info!(query = name, matched = %matched, score, ?position, "player resolved");
        Ok(ResolvedPlayer {
            id,
            name: matched,
            score,
            position,
            team,
            league,
        })
    }
}

fn id_and_name(v: &Value) -> Option<(u32, String)> {
    let id = u32::try_from(v.get("id")?.as_u64()?).ok()?;
    let name = v.get("name")?.as_str()?.to_string();
    Some((id, name))
}

fn pick(query: &str, candidates: &[(u32, String)]) -> Option<Resolved> {
    let names: Vec<&str> = candidates.iter().map(|(_, n)| n.as_str()).collect();
    let (idx, score) = best_match(query, &names)?;
    let (id, name) = &candidates[idx];
    Some(Resolved {
        id: *id,
        name: name.clone(),
        score,
    })
}

/// Closest candidate to `query` as `(index, score)`. An exact match always
/// wins with 100; otherwise ties keep the earliest candidate.
pub fn best_match<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<(usize, u8)> {
    let query = query.trim();
    if let Some(idx) = candidates.iter().position(|c| c.as_ref() == query) {
        return Some((idx, 100));
    }
    let mut best: Option<(usize, u8)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = similarity(query, candidate.as_ref());
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    best
}

/// Case and punctuation insensitive similarity, 0-100. Only names that are
/// identical after normalisation score 100.
pub fn similarity(query: &str, candidate: &str) -> u8 {
    let a = normalize(query);
    let b = normalize(candidate);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }
    let plain = normalized_levenshtein(&a, &b);
    let sorted = normalized_levenshtein(&sorted_tokens(&a), &sorted_tokens(&b));
    let aligned = token_alignment(&a, &b) * TOKEN_ALIGNMENT_WEIGHT;
    let best = plain.max(sorted).max(aligned);
    ((best * 100.0).round() as u8).min(99)
}

pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        if ch == '&' {
            out.push_str(" and ");
        } else if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sorted_tokens(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split(' ').collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

// Squad lists abbreviate first names ("E. Haaland"), so a one-letter candidate
// token counts as a full match for any query token with that initial.
fn token_alignment(query: &str, candidate: &str) -> f64 {
    let q: Vec<&str> = query.split(' ').collect();
    let c: Vec<&str> = candidate.split(' ').collect();
    let total: f64 = c
        .iter()
        .map(|ct| {
            if ct.chars().count() == 1 {
                if q.iter().any(|qt| qt.starts_with(ct)) { 1.0 } else { 0.0 }
            } else {
                q.iter()
                    .map(|qt| jaro_winkler(ct, qt))
                    .fold(0.0, f64::max)
            }
        })
        .sum();
    total / c.len() as f64
}

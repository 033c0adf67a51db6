//! Reshapes raw provider player statistics into the public record shapes.
//!
//! Pure: no network access. The record variant is picked from the player's
//! position, which is resolved once from the squad list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Attacker,
    Unknown,
}

impl Position {
    /// Squad lists spell positions out; fixture lineups use single letters.
    pub fn from_provider(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "goalkeeper" | "g" => Self::Goalkeeper,
            "defender" | "d" => Self::Defender,
            "midfielder" | "m" => Self::Midfielder,
            "attacker" | "forward" | "f" => Self::Attacker,
            _ => Self::Unknown,
        }
    }

    pub fn is_goalkeeper(self) -> bool {
        self == Self::Goalkeeper
    }
}

// --- raw provider payload ---------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPlayerStatistics {
    #[serde(deserialize_with = "null_as_default")]
    pub games: RawGames,
    #[serde(deserialize_with = "null_as_default")]
    pub shots: RawShots,
    #[serde(deserialize_with = "null_as_default")]
    pub goals: RawGoals,
    #[serde(deserialize_with = "null_as_default")]
    pub passes: RawPasses,
    #[serde(deserialize_with = "null_as_default")]
    pub tackles: RawTackles,
    #[serde(deserialize_with = "null_as_default")]
    pub duels: RawDuels,
    #[serde(deserialize_with = "null_as_default")]
    pub dribbles: RawDribbles,
    #[serde(deserialize_with = "null_as_default")]
    pub fouls: RawFouls,
    #[serde(deserialize_with = "null_as_default")]
    pub cards: RawCards,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGames {
    // Provider spelling.
    #[serde(rename = "appearences", deserialize_with = "lenient_u32")]
    pub appearances: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub minutes: Option<u32>,
    #[serde(deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawShots {
    #[serde(deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub on: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGoals {
    #[serde(deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub conceded: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub assists: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub saves: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPasses {
    #[serde(deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub key: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub accuracy: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTackles {
    #[serde(deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub blocks: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub interceptions: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDuels {
    #[serde(deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub won: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDribbles {
    #[serde(deserialize_with = "lenient_u32")]
    pub attempts: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub success: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFouls {
    #[serde(deserialize_with = "lenient_u32")]
    pub drawn: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub committed: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCards {
    #[serde(deserialize_with = "lenient_u32")]
    pub yellow: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub red: Option<u32>,
}

impl RawPlayerStatistics {
    pub fn from_value(v: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(v)
    }
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_cell(&s),
        _ => None,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(lenient_f64(d)?
        .filter(|x| x.is_finite() && *x >= 0.0)
        .map(|x| x.round() as u32))
}

/// Parses provider cells such as `"7.233333"`, `"85%"` or `"-"`.
pub fn parse_number_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    s.trim_end_matches('%').trim().parse::<f64>().ok()
}

// --- formatted records --------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Games {
    pub appearances: u32,
    pub minutes_played: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct GoalkeeperGoals {
    pub conceded: u32,
    pub saves: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct ScoringGoals {
    pub total: u32,
    pub assists: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Shots {
    pub total: u32,
    pub on_target: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Passes {
    pub total: u32,
    pub key: u32,
    pub accuracy: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Tackles {
    pub total: u32,
    pub blocks: u32,
    pub interceptions: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Duels {
    pub total: u32,
    pub won: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Dribbles {
    pub attempts: u32,
    pub success: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Fouls {
    pub drawn: u32,
    pub committed: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Cards {
    pub yellow: u32,
    pub red: u32,
}

/// Fields every position reports.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct SharedStats {
    pub passes: Passes,
    pub tackles: Tackles,
    pub duels: Duels,
    pub dribbles: Dribbles,
    pub fouls: Fouls,
    pub cards: Cards,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GoalkeeperStats {
    pub games: Games,
    pub goals: GoalkeeperGoals,
    #[serde(flatten)]
    pub shared: SharedStats,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FieldPlayerStats {
    pub games: Games,
    pub goals: ScoringGoals,
    pub shots: Shots,
    #[serde(flatten)]
    pub shared: SharedStats,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PlayerStats {
    Goalkeeper(GoalkeeperStats),
    FieldPlayer(FieldPlayerStats),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerSeasonRecord {
    pub name: String,
    pub position: Position,
    pub rating: f64,
    pub stats: PlayerStats,
}

/// Season totals: appearances come straight from the provider.
pub fn format_season_stats(raw: &RawPlayerStatistics, position: Position) -> PlayerStats {
    let games = Games {
        appearances: raw.games.appearances.unwrap_or(0),
        minutes_played: raw.games.minutes.unwrap_or(0),
    };
    format_with_games(raw, position, games)
}

/// Single match: an appearance is any non-zero minutes.
pub fn format_match_stats(raw: &RawPlayerStatistics, position: Position) -> PlayerStats {
    let minutes = raw.games.minutes.unwrap_or(0);
    let games = Games {
        appearances: u32::from(minutes > 0),
        minutes_played: minutes,
    };
    format_with_games(raw, position, games)
}

pub fn season_record(name: &str, position: Position, raw: &RawPlayerStatistics) -> PlayerSeasonRecord {
    let rating = raw
        .games
        .rating
        .map(|r| (r * 100.0).round() / 100.0)
        .unwrap_or(0.0);
    PlayerSeasonRecord {
        name: name.to_string(),
        position,
        rating,
        stats: format_season_stats(raw, position),
    }
}

fn format_with_games(raw: &RawPlayerStatistics, position: Position, games: Games) -> PlayerStats {
    let shared = shared_stats(raw);
    if position.is_goalkeeper() {
        PlayerStats::Goalkeeper(GoalkeeperStats {
            games,
            goals: GoalkeeperGoals {
                conceded: raw.goals.conceded.unwrap_or(0),
                saves: raw.goals.saves.unwrap_or(0),
            },
            shared,
        })
    } else {
        PlayerStats::FieldPlayer(FieldPlayerStats {
            games,
            goals: ScoringGoals {
                total: raw.goals.total.unwrap_or(0),
                assists: raw.goals.assists.unwrap_or(0),
            },
            shots: Shots {
                total: raw.shots.total.unwrap_or(0),
                on_target: raw.shots.on.unwrap_or(0),
            },
            shared,
        })
    }
}

fn shared_stats(raw: &RawPlayerStatistics) -> SharedStats {
    SharedStats {
        passes: Passes {
            total: raw.passes.total.unwrap_or(0),
            key: raw.passes.key.unwrap_or(0),
            accuracy: raw.passes.accuracy.unwrap_or(0),
        },
        tackles: Tackles {
            total: raw.tackles.total.unwrap_or(0),
            blocks: raw.tackles.blocks.unwrap_or(0),
            interceptions: raw.tackles.interceptions.unwrap_or(0),
        },
        duels: Duels {
            total: raw.duels.total.unwrap_or(0),
            won: raw.duels.won.unwrap_or(0),
        },
        dribbles: Dribbles {
            attempts: raw.dribbles.attempts.unwrap_or(0),
            success: raw.dribbles.success.unwrap_or(0),
        },
        fouls: Fouls {
            drawn: raw.fouls.drawn.unwrap_or(0),
            committed: raw.fouls.committed.unwrap_or(0),
        },
        cards: Cards {
            yellow: raw.cards.yellow.unwrap_or(0),
            red: raw.cards.red.unwrap_or(0),
        },
    }
}

/// Numeric view of one match used for model fitting, independent of position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMatchLine {
    pub minutes: f64,
    pub goals: f64,
    pub assists: f64,
    pub shots_total: f64,
    pub shots_on_target: f64,
    pub passes_total: f64,
    pub passes_accuracy: f64,
    pub dribble_attempts: f64,
    pub dribble_success: f64,
    pub tackles: f64,
    pub interceptions: f64,
    pub fouls_committed: f64,
}

impl PlayerMatchLine {
    pub fn from_raw(raw: &RawPlayerStatistics) -> Self {
        let n = |v: Option<u32>| f64::from(v.unwrap_or(0));
        Self {
            minutes: n(raw.games.minutes),
            goals: n(raw.goals.total),
            assists: n(raw.goals.assists),
            shots_total: n(raw.shots.total),
            shots_on_target: n(raw.shots.on),
            passes_total: n(raw.passes.total),
            passes_accuracy: n(raw.passes.accuracy),
            dribble_attempts: n(raw.dribbles.attempts),
            dribble_success: n(raw.dribbles.success),
            tackles: n(raw.tackles.total),
            interceptions: n(raw.tackles.interceptions),
            fouls_committed: n(raw.fouls.committed),
        }
    }
}

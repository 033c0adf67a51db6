mod common;

use common::read_fixture;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use football_stats_api::match_stats::{statistics_for_team, team_match_stats};
use football_stats_api::player_stats::{
    PlayerStats, Position, RawPlayerStatistics, format_match_stats, season_record,
};
use football_stats_api::provider::{ProviderError, parse_envelope};
use football_stats_api::standings::parse_standings;

fn response(file: &str) -> Vec<Value> {
    parse_envelope(&read_fixture(file)).expect("fixture should parse")
}

#[test]
fn parses_standings_fixture() {
    let rows = parse_standings(&response("standings_premier_league.json")).unwrap();
    assert_eq!(rows.len(), 3);

    let city = &rows[0];
    assert_eq!(city.rank, 1);
    assert_eq!(city.name, "Manchester City");
    assert_eq!(city.matches_played, 38);
    assert_eq!((city.wins, city.draws, city.losses), (28, 7, 3));
    assert_eq!((city.goals_for, city.goals_against), (96, 34));
    assert_eq!(city.goal_diff, 62);
    assert_eq!(city.points, 91);
    assert_eq!(city.last_five, "WWWWW");

    // No zone description means a mid-table row.
    assert_eq!(rows[2].standing, "Regular");
}

#[test]
fn standings_keep_at_most_twenty_rows() {
    let table: Vec<Value> = (1..=24)
        .map(|rank| {
            json!({
                "rank": rank,
                "team": {"id": rank, "name": format!("Team {rank}")},
                "points": 100 - rank,
                "goalsDiff": 0,
                "all": {"played": 38, "win": 0, "draw": 0, "lose": 0, "goals": {"for": 0, "against": 0}}
            })
        })
        .collect();
    let response = vec![json!({"league": {"id": 40, "standings": [table]}})];
    let rows = parse_standings(&response).unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows.last().unwrap().rank, 20);
}

#[test]
fn standings_without_a_table_are_empty() {
    assert!(parse_standings(&[]).unwrap().is_empty());
    let response = vec![json!({"league": {"id": 39, "standings": []}})];
    assert!(parse_standings(&response).unwrap().is_empty());
}

#[test]
fn team_statistics_from_fixture() {
    let response = response("statistics_1001.json");
    let block = statistics_for_team(&response, 42, true).expect("arsenal block");
    let stats = team_match_stats(block);
    assert_eq!(stats.shots_on_target, 5);
    assert_eq!(stats.shots_off_target, 6);
    assert_eq!(stats.shots_total, 15);
    assert_eq!(stats.corners, 7);
    assert_eq!(stats.ball_possession.as_str(), "64%");
    assert_eq!(stats.red_cards, 0);
    assert_eq!(stats.passes_total, 612);
    assert_eq!(stats.passes_accuracy, 549);
    assert_eq!(stats.passes_percentage.as_str(), "90%");

    let everton = team_match_stats(statistics_for_team(&response, 45, false).unwrap());
    assert_eq!(everton.ball_possession.as_str(), "36%");
}

#[test]
fn provider_error_envelope_is_reported() {
    let raw = r#"{"errors":{"token":"Error/Missing application key."},"response":[]}"#;
    match parse_envelope(raw) {
        Err(ProviderError::Upstream(message)) => assert!(message.contains("application key")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn season_block_formats_field_player() {
    let response = response("player_saka_2023.json");
    let block = &response[0]["statistics"][1];
    let raw = RawPlayerStatistics::from_value(block).unwrap();
    let record = season_record("B. Saka", Position::Attacker, &raw);

    assert_eq!(record.rating, 7.43);
    let PlayerStats::FieldPlayer(stats) = record.stats else {
        panic!("expected field player stats");
    };
    assert_eq!(stats.games.appearances, 35);
    assert_eq!(stats.games.minutes_played, 2927);
    assert_eq!((stats.goals.total, stats.goals.assists), (16, 9));
    assert_eq!((stats.shots.total, stats.shots.on_target), (104, 42));
    assert_eq!(stats.shared.passes.accuracy, 27);
    assert_eq!(stats.shared.dribbles.success, 82);
}

#[test]
fn goalkeeper_record_has_no_scoring_fields() {
    let response = response("player_raya_2023.json");
    let raw = RawPlayerStatistics::from_value(&response[0]["statistics"][0]).unwrap();
    let record = season_record("David Raya", Position::Goalkeeper, &raw);
    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["stats"]["role"], "goalkeeper");
    assert_eq!(value["stats"]["goals"], json!({"conceded": 24, "saves": 64}));
    assert!(value["stats"].get("shots").is_none());
    assert!(value["stats"]["goals"].get("assists").is_none());
    // Null provider cells read as zero.
    assert_eq!(value["stats"]["tackles"]["total"], 0);
}

#[test]
fn single_match_appearance_follows_minutes() {
    let played = RawPlayerStatistics::from_value(&json!({"games": {"minutes": 12}})).unwrap();
    let benched = RawPlayerStatistics::from_value(&json!({"games": {"minutes": null}})).unwrap();

    let PlayerStats::FieldPlayer(played) = format_match_stats(&played, Position::Midfielder) else {
        panic!("expected field player stats");
    };
    let PlayerStats::FieldPlayer(benched) = format_match_stats(&benched, Position::Midfielder) else {
        panic!("expected field player stats");
    };
    assert_eq!(played.games.appearances, 1);
    assert_eq!(benched.games.appearances, 0);
}

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use football_stats_api::player_stats::PlayerMatchLine;
use football_stats_api::predict::{PlayerMetric, estimate, player_predictions};
use football_stats_api::provider::parse_envelope;
use football_stats_api::resolver::best_match;
use football_stats_api::standings::parse_standings;

fn squad_names() -> Vec<String> {
    let first = ["B.", "Gabriel", "M.", "Declan", "William", "Kai", "Leandro", "J."];
    let last = ["Saka", "Jesus", "Ødegaard", "Rice", "Saliba", "Havertz", "Trossard", "Timber"];
    (0..40)
        .map(|idx| format!("{} {}{}", first[idx % first.len()], last[idx % last.len()], idx / 8))
        .collect()
}

fn sample_lines(n: usize) -> Vec<PlayerMatchLine> {
    (0..n)
        .map(|idx| {
            let i = idx as f64;
            PlayerMatchLine {
                minutes: 90.0 - (i * 7.0) % 30.0,
                goals: (idx % 3 == 0) as u8 as f64,
                assists: (idx % 4 == 1) as u8 as f64,
                shots_total: 2.0 + i % 4.0,
                shots_on_target: 1.0 + i % 2.0,
                passes_total: 30.0 + (i * 11.0) % 25.0,
                passes_accuracy: 80.0 + i % 10.0,
                dribble_attempts: 3.0 + i % 5.0,
                dribble_success: 1.0 + i % 3.0,
                tackles: i % 4.0,
                interceptions: i % 2.0,
                fouls_committed: i % 3.0,
            }
        })
        .collect()
}

fn bench_best_match(c: &mut Criterion) {
    let names = squad_names();
    c.bench_function("best_match_squad", |b| {
        b.iter(|| {
            let hit = best_match(black_box("Bukayo Saka"), black_box(&names));
            black_box(hit);
        })
    });
}

fn bench_boosted_estimate(c: &mut Criterion) {
    let lines = sample_lines(10);
    c.bench_function("estimate_goals_boosted", |b| {
        b.iter(|| {
            let p = estimate(black_box(&lines), PlayerMetric::Goals);
            black_box(p);
        })
    });
}

fn bench_player_predictions(c: &mut Criterion) {
    let lines = sample_lines(10);
    c.bench_function("player_predictions", |b| {
        b.iter(|| {
            let out = player_predictions("B. Saka", black_box(&lines));
            black_box(out.matches_used);
        })
    });
}

fn bench_standings_parse(c: &mut Criterion) {
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let response = parse_envelope(black_box(STANDINGS_JSON)).unwrap();
            let rows = parse_standings(&response).unwrap();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    perf,
    bench_best_match,
    bench_boosted_estimate,
    bench_player_predictions,
    bench_standings_parse
);
criterion_main!(perf);

static STANDINGS_JSON: &str = include_str!("../tests/fixtures/standings_premier_league.json");

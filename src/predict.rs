//! Recent-form "predictions".
//!
//! Policy: records arrive newest first. The most recent match is held out and
//! everything older is the training set; the model then predicts the held-out
//! match. With 1-9 training rows this is an in-sample sanity check of how
//! consistent a team or player has been, not a forecast of the next game.

use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use tracing::debug;

use crate::boost::{BoostParams, BoostedTrees};
use crate::player_stats::PlayerMatchLine;
use crate::team_fixtures::MatchRecord;

pub const SANITY_CHECK_NOTE: &str = "In-sample sanity check: the most recent match is held out and \
     predicted from the older ones. This is not a forecast of the next match.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    BoostedTrees,
    /// Linear fit was impossible (too few or collinear rows).
    TrainingMean,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    /// The held-out match's true value, untouched.
    pub actual: f64,
    pub predicted: f64,
    pub model: ModelKind,
    pub training_rows: usize,
}

/// A predictable statistic: its target, fixed feature columns and model.
pub trait Metric: Copy {
    type Record;

    fn target(self, record: &Self::Record) -> f64;
    fn features(self, record: &Self::Record) -> Vec<f64>;
    fn model(self) -> ModelKind;
    /// Count statistics are reported as whole numbers.
    fn rounded(self) -> bool;
}

/// `None` when fewer than two records are available.
pub fn estimate<M: Metric>(records: &[M::Record], metric: M) -> Option<Prediction> {
    if records.len() < 2 {
        return None;
    }
    let (holdout, training) = records.split_first()?;
    let actual = metric.target(holdout);
    let eval = Array1::from(metric.features(holdout));

    let mut x = Array2::<f64>::zeros((training.len(), eval.len()));
    for (i, record) in training.iter().enumerate() {
        for (j, value) in metric.features(record).into_iter().enumerate() {
            x[(i, j)] = value;
        }
    }
    let y: Array1<f64> = training.iter().map(|r| metric.target(r)).collect();
    let training_mean = y.mean().unwrap_or(0.0);

    let (raw, model) = match metric.model() {
        ModelKind::Linear => match fit_linear(&x, &y, &eval) {
            Some(p) => (p, ModelKind::Linear),
            None => {
                debug!(rows = training.len(), "linear fit unavailable, using training mean");
                (training_mean, ModelKind::TrainingMean)
            }
        },
        ModelKind::BoostedTrees => {
            match BoostedTrees::fit(x.view(), y.view(), BoostParams::default()) {
                Some(m) => (m.predict_row(eval.view()), ModelKind::BoostedTrees),
                None => (training_mean, ModelKind::TrainingMean),
            }
        }
        ModelKind::TrainingMean => (training_mean, ModelKind::TrainingMean),
    };

    let raw = raw.max(0.0);
    let predicted = if metric.rounded() {
        raw.round()
    } else {
        (raw * 100.0).round() / 100.0
    };
    Some(Prediction {
        actual,
        predicted,
        model,
        training_rows: training.len(),
    })
}

/// Ordinary least squares with intercept; `None` if the normal equations are
/// singular or the prediction is not finite.
///
/// Columns that are constant over the training rows are dropped first (from
/// the eval row too), since they only duplicate the intercept.
pub fn fit_linear(x: &Array2<f64>, y: &Array1<f64>, eval: &Array1<f64>) -> Option<f64> {
    let keep = varying_columns(x);
    if keep.is_empty() {
        return None;
    }
    if keep.len() < x.ncols() {
        debug!(dropped = x.ncols() - keep.len(), "constant feature columns");
    }
    let dataset = Dataset::new(x.select(Axis(1), &keep), y.clone());
    let model = LinearRegression::new().fit(&dataset).ok()?;
    let row = eval.select(Axis(0), &keep).insert_axis(Axis(0));
    let out: Array1<f64> = model.predict(&row);
    out.get(0).copied().filter(|v| v.is_finite())
}

fn varying_columns(x: &Array2<f64>) -> Vec<usize> {
    x.axis_iter(Axis(1))
        .enumerate()
        .filter(|(_, col)| {
            let lo = col.fold(f64::INFINITY, |a, &b| a.min(b));
            let hi = col.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            hi - lo > 1e-12
        })
        .map(|(idx, _)| idx)
        .collect()
}

// --- team metrics -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamMetric {
    ShotsTotal,
    ShotsOnTarget,
    ShotsOffTarget,
    Possession,
    PassesTotal,
    PassesAccuracy,
    Fouls,
}

impl Metric for TeamMetric {
    type Record = MatchRecord;

    fn target(self, r: &MatchRecord) -> f64 {
        let s = &r.stats;
        match self {
            Self::ShotsTotal => f64::from(s.shots_total),
            Self::ShotsOnTarget => f64::from(s.shots_on_target),
            Self::ShotsOffTarget => f64::from(s.shots_off_target),
            Self::Possession => s.ball_possession.value(),
            Self::PassesTotal => f64::from(s.passes_total),
            Self::PassesAccuracy => f64::from(s.passes_accuracy),
            Self::Fouls => f64::from(s.fouls),
        }
    }

    fn features(self, r: &MatchRecord) -> Vec<f64> {
        let s = &r.stats;
        let possession = s.ball_possession.value();
        match self {
            Self::ShotsTotal => vec![possession, f64::from(s.passes_total), f64::from(s.corners)],
            Self::ShotsOnTarget => vec![
                f64::from(s.shots_total),
                possession,
                f64::from(s.passes_total),
            ],
            Self::ShotsOffTarget => vec![f64::from(s.shots_total), possession, f64::from(s.corners)],
            Self::Possession => vec![f64::from(s.passes_total), s.passes_percentage.value()],
            Self::PassesTotal => vec![possession, f64::from(s.shots_total), f64::from(s.corners)],
            Self::PassesAccuracy => vec![f64::from(s.passes_total), possession],
            Self::Fouls => vec![
                f64::from(s.yellow_cards),
                f64::from(s.red_cards),
                possession,
            ],
        }
    }

    fn model(self) -> ModelKind {
        match self {
            Self::ShotsTotal | Self::ShotsOnTarget | Self::ShotsOffTarget => ModelKind::BoostedTrees,
            Self::Possession | Self::PassesTotal | Self::PassesAccuracy | Self::Fouls => {
                ModelKind::Linear
            }
        }
    }

    fn rounded(self) -> bool {
        self != Self::Possession
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShotsPrediction {
    pub total: Option<Prediction>,
    pub on_target: Option<Prediction>,
    pub off_target: Option<Prediction>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PassesPrediction {
    pub total: Option<Prediction>,
    pub accuracy: Option<Prediction>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TeamPredictions {
    pub matches_used: usize,
    pub note: &'static str,
    pub shots: ShotsPrediction,
    pub possession: Option<Prediction>,
    pub passes: PassesPrediction,
    pub fouls: Option<Prediction>,
}

pub fn team_predictions(records: &[MatchRecord]) -> TeamPredictions {
    TeamPredictions {
        matches_used: records.len(),
        note: SANITY_CHECK_NOTE,
        shots: ShotsPrediction {
            total: estimate(records, TeamMetric::ShotsTotal),
            on_target: estimate(records, TeamMetric::ShotsOnTarget),
            off_target: estimate(records, TeamMetric::ShotsOffTarget),
        },
        possession: estimate(records, TeamMetric::Possession),
        passes: PassesPrediction {
            total: estimate(records, TeamMetric::PassesTotal),
            accuracy: estimate(records, TeamMetric::PassesAccuracy),
        },
        fouls: estimate(records, TeamMetric::Fouls),
    }
}

// --- player metrics -----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMetric {
    Goals,
    Assists,
    Dribbles,
    Passes,
    Tackles,
}

impl Metric for PlayerMetric {
    type Record = PlayerMatchLine;

    fn target(self, r: &PlayerMatchLine) -> f64 {
        match self {
            Self::Goals => r.goals,
            Self::Assists => r.assists,
            Self::Dribbles => r.dribble_success,
            Self::Passes => r.passes_total,
            Self::Tackles => r.tackles,
        }
    }

    fn features(self, r: &PlayerMatchLine) -> Vec<f64> {
        match self {
            Self::Goals => vec![
                r.minutes,
                r.shots_total,
                r.shots_on_target,
                r.passes_total,
                r.dribble_attempts,
                r.dribble_success,
            ],
            Self::Assists => vec![
                r.minutes,
                r.passes_total,
                r.passes_accuracy,
                r.dribble_attempts,
                r.dribble_success,
                r.shots_total,
            ],
            Self::Dribbles => vec![
                r.dribble_attempts,
                r.minutes,
                r.shots_total,
                r.passes_total,
                r.passes_accuracy,
            ],
            Self::Passes => vec![
                r.minutes,
                r.passes_accuracy,
                r.dribble_attempts,
                r.shots_total,
                r.dribble_success,
            ],
            Self::Tackles => vec![
                r.minutes,
                r.interceptions,
                r.dribble_attempts,
                r.dribble_success,
                r.fouls_committed,
            ],
        }
    }

    fn model(self) -> ModelKind {
        match self {
            Self::Passes => ModelKind::Linear,
            Self::Goals | Self::Assists | Self::Dribbles | Self::Tackles => ModelKind::BoostedTrees,
        }
    }

    fn rounded(self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerPredictions {
    pub player: String,
    pub matches_used: usize,
    pub note: &'static str,
    pub goals: Option<Prediction>,
    pub assists: Option<Prediction>,
    pub dribbles: Option<Prediction>,
    pub passes: Option<Prediction>,
    pub tackles: Option<Prediction>,
}

pub fn player_predictions(player: &str, lines: &[PlayerMatchLine]) -> PlayerPredictions {
    PlayerPredictions {
        player: player.to_string(),
        matches_used: lines.len(),
        note: SANITY_CHECK_NOTE,
        goals: estimate(lines, PlayerMetric::Goals),
        assists: estimate(lines, PlayerMetric::Assists),
        dribbles: estimate(lines, PlayerMetric::Dribbles),
        passes: estimate(lines, PlayerMetric::Passes),
        tackles: estimate(lines, PlayerMetric::Tackles),
    }
}

//! Student progress metrics and the performance-analysis preset.

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::classify::classifier::Classifier;
use crate::error::{NetError, Result};
use crate::network::{network::Network, spec::NetworkSpec};
use crate::train::example::TrainingExample;

pub const STUDENT_FEATURES: usize = 6;
/// Learning modules a student can play.
pub const MODULE_COUNT: u32 = 6;
pub const PERFORMANCE_LABELS: [&str; 3] = ["needs_support", "developing", "proficient"];

const MAX_RESPONSE_SECS: f64 = 60.0;
const MAX_ATTEMPTS: f64 = 5.0;
const FEATURE_WEIGHTS: [f64; STUDENT_FEATURES] = [0.35, 0.15, 0.2, 0.1, 0.1, 0.1];
const LEVEL_THRESHOLDS: [f64; 2] = [0.45, 0.7];
/// Synthetic samples closer than this to a threshold are skipped.
const THRESHOLD_MARGIN: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentMetrics {
    /// Fraction of correct answers.
    pub accuracy: f64,
    pub mean_response_secs: f64,
    pub levels_completed: u32,
    pub levels_total: u32,
    /// Average tries before a level is passed; 1 is a first-try pass.
    pub attempts_per_level: f64,
    pub modules_played: u32,
    /// Change in accuracy over the latest sessions, in `[-1, 1]`.
    pub recent_trend: f64,
}

impl StudentMetrics {
    /// Six features in `[0, 1]`: accuracy, speed, completion, first-try
    /// efficiency, module breadth and trend.
    pub fn encode(&self) -> Vec<f64> {
        let completion = if self.levels_total == 0 {
            0.0
        } else {
            self.levels_completed as f64 / self.levels_total as f64
        };
        let efficiency = 1.0 - ((self.attempts_per_level - 1.0) / (MAX_ATTEMPTS - 1.0)).clamp(0.0, 1.0);
        vec![
            unit(self.accuracy),
            1.0 - unit(self.mean_response_secs / MAX_RESPONSE_SECS),
            unit(completion),
            unit(efficiency),
            unit(self.modules_played as f64 / MODULE_COUNT as f64),
            unit((self.recent_trend + 1.0) / 2.0),
        ]
    }

    /// Weighted feature sum in `[0, 1]` used to label synthetic samples.
    pub fn composite_score(&self) -> f64 {
        self.encode().iter().zip(FEATURE_WEIGHTS).map(|(f, w)| f * w).sum()
    }

    /// Index into [`PERFORMANCE_LABELS`] given by the composite-score rule.
    pub fn rule_level(&self) -> usize {
        let score = self.composite_score();
        LEVEL_THRESHOLDS.iter().filter(|t| score >= **t).count()
    }
}

/// Clamps to `[0, 1]`, mapping NaN to 0.
fn unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Random plausible students, skipping any that sit right on a level threshold.
pub fn synthetic_students<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<StudentMetrics> {
    let mut students = Vec::with_capacity(count);
    while students.len() < count {
        let levels_total = rng.gen_range(5..=30);
        let s = StudentMetrics {
            accuracy: rng.gen_range(0.0..=1.0),
            mean_response_secs: rng.gen_range(2.0..=70.0),
            levels_completed: rng.gen_range(0..=levels_total),
            levels_total,
            attempts_per_level: rng.gen_range(1.0..=6.0),
            modules_played: rng.gen_range(0..=MODULE_COUNT),
            recent_trend: rng.gen_range(-1.0..=1.0),
        };
        let score = s.composite_score();
        if LEVEL_THRESHOLDS.iter().all(|t| (score - t).abs() >= THRESHOLD_MARGIN) {
            students.push(s);
        }
    }
    students
}

pub fn student_training_set<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<TrainingExample> {
    synthetic_students(count, rng)
        .into_iter()
        .map(|s| TrainingExample::one_hot(s.encode(), s.rule_level(), PERFORMANCE_LABELS.len()))
        .collect()
}

pub fn student_spec(hidden_size: usize) -> NetworkSpec {
    NetworkSpec::new(STUDENT_FEATURES, hidden_size, PERFORMANCE_LABELS.len())
}

pub fn student_classifier(network: Network) -> Result<Classifier> {
    Classifier::new(network, PERFORMANCE_LABELS)
}

/// Collapses the three level activations into a 0–100 score: the
/// activation-weighted mean of 0, 50 and 100.
pub fn performance_score(outputs: &[f64]) -> Result<u8> {
    if outputs.len() != PERFORMANCE_LABELS.len() {
        return Err(NetError::Configuration(format!(
            "performance score needs {} outputs, got {}", PERFORMANCE_LABELS.len(), outputs.len()
        )));
    }
    let weights: Vec<f64> = outputs.iter().map(|v| unit(*v)).collect();
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return Ok(0);
    }
    let score: f64 = weights.iter().enumerate().map(|(i, w)| w * i as f64 * 50.0).sum::<f64>() / total;
    Ok(score.round().clamp(0.0, 100.0) as u8)
}

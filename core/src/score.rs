use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;
/// Score a meal gets when checked, before the user edits it.
pub const DEFAULT_SCORE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    Empty,
    NotANumber,
    OutOfRange,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::Empty => write!(f, "score is empty"),
            ScoreError::NotANumber => write!(f, "score is not a number"),
            ScoreError::OutOfRange => {
                write!(f, "score must be between {SCORE_MIN} and {SCORE_MAX}")
            }
        }
    }
}

impl std::error::Error for ScoreError {}

/// Parses a user-entered score. Accepts either comma or period as the
/// decimal separator; valid iff the parsed value lies in [0, 10]. The
/// accepted score is rounded to 2 decimals.
pub fn parse_score(raw: &str) -> Result<f64, ScoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScoreError::Empty);
    }
    let normalized = trimmed.replace(',', ".");
    let value: f64 = normalized.parse().map_err(|_| ScoreError::NotANumber)?;
    if value.is_nan() {
        return Err(ScoreError::NotANumber);
    }
    if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
        return Err(ScoreError::OutOfRange);
    }
    Ok(round2(value))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One vote as submitted to the backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Vote {
    pub meal: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PodiumEntry {
    pub meal: String,
    pub score: f64,
    pub touched: bool,
}

/// The user's current picks: meal name -> score, plus a marker set for
/// scores the user explicitly confirmed (untouched defaults render dimmed).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    selected: BTreeMap<String, f64>,
    touched: BTreeSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains_key(name)
    }

    pub fn score_of(&self, name: &str) -> Option<f64> {
        self.selected.get(name).copied()
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Checks or unchecks a meal. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.selected.remove(name).is_some() {
            self.touched.remove(name);
            false
        } else {
            self.selected.insert(name.to_string(), DEFAULT_SCORE);
            true
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.selected.remove(name);
        self.touched.remove(name);
    }

    /// Applies a user-entered score. On parse failure nothing changes and
    /// the error is returned for the caller to report.
    pub fn set_score(&mut self, name: &str, raw: &str) -> Result<f64, ScoreError> {
        let score = parse_score(raw)?;
        self.selected.insert(name.to_string(), score);
        self.touched.insert(name.to_string());
        Ok(score)
    }

    pub fn mark_touched(&mut self, name: &str) {
        if self.selected.contains_key(name) {
            self.touched.insert(name.to_string());
        }
    }

    /// Current picks ordered for the podium: score descending, then name
    /// ascending (case-insensitive).
    pub fn podium(&self) -> Vec<PodiumEntry> {
        let mut entries: Vec<PodiumEntry> = self
            .selected
            .iter()
            .map(|(meal, score)| PodiumEntry {
                meal: meal.clone(),
                score: *score,
                touched: self.touched.contains(meal),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.meal.to_lowercase().cmp(&b.meal.to_lowercase()))
        });
        entries
    }

    pub fn votes(&self) -> Vec<Vote> {
        self.selected
            .iter()
            .map(|(meal, score)| Vote {
                meal: meal.clone(),
                score: *score,
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<(String, f64)> {
        self.selected
            .iter()
            .map(|(meal, score)| (meal.clone(), *score))
            .collect()
    }

    /// Rebuilds the state from persisted entries, dropping anything outside
    /// the valid score range.
    pub fn restore(entries: Vec<(String, f64)>) -> Self {
        let mut state = Self::new();
        for (meal, score) in entries {
            if meal.is_empty() || score.is_nan() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
                continue;
            }
            state.selected.insert(meal, score);
        }
        state
    }
}

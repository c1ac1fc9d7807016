use crate::domain::models::Event;
use crate::domain::policy::{GraphPolicy, SimilarityWeights};
use serde::Serialize;
use std::collections::HashSet;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const MIN_SIGNIFICANT_WORD_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreBreakdown {
    pub tags: f64,
    pub content: f64,
    pub temporal: f64,
    pub category: f64,
}

impl ScoreBreakdown {
    pub fn weighted(&self, weights: &SimilarityWeights) -> f64 {
        let total = weights.tags * self.tags
            + weights.content * self.content
            + weights.temporal * self.temporal
            + weights.category * self.category;
        total.clamp(0.0, 1.0)
    }
}

pub fn score(a: &Event, b: &Event) -> f64 {
    score_with(a, b, &GraphPolicy::default())
}

pub fn score_with(a: &Event, b: &Event, policy: &GraphPolicy) -> f64 {
    score_breakdown(a, b, policy.temporal_decay_days).weighted(&policy.weights)
}

pub fn score_breakdown(a: &Event, b: &Event, temporal_decay_days: f64) -> ScoreBreakdown {
    ScoreBreakdown {
        tags: tag_overlap(a, b),
        content: content_overlap(a, b),
        temporal: temporal_proximity(a, b, temporal_decay_days),
        category: if a.category == b.category { 1.0 } else { 0.0 },
    }
}

fn tag_overlap(a: &Event, b: &Event) -> f64 {
    let left = a.distinct_tags().into_iter().collect::<HashSet<_>>();
    let right = b.distinct_tags().into_iter().collect::<HashSet<_>>();
    let shared = left.intersection(&right).count();
    shared as f64 / left.len().max(right.len()).max(1) as f64
}

// Matches are counted per occurrence on the counting side. For "review review"
// against "review notes" the one-directional value is 2/2 = 1.0 from the first
// event and 1/2 = 0.5 from the second; the component is their mean, 0.75.
fn content_overlap(a: &Event, b: &Event) -> f64 {
    let left = words(a);
    let right = words(b);
    let denominator = left.len().max(right.len()).max(1) as f64;
    let matches = directed_matches(&left, &right) + directed_matches(&right, &left);
    (matches as f64 / 2.0) / denominator
}

fn directed_matches(source: &[String], target: &[String]) -> usize {
    let target = target.iter().map(String::as_str).collect::<HashSet<_>>();
    source
        .iter()
        .filter(|word| word.chars().count() >= MIN_SIGNIFICANT_WORD_CHARS)
        .filter(|word| target.contains(word.as_str()))
        .count()
}

fn words(event: &Event) -> Vec<String> {
    let text = format!("{} {}", event.title, event.notes.as_deref().unwrap_or_default());
    text.to_lowercase()
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect()
}

fn temporal_proximity(a: &Event, b: &Event, decay_days: f64) -> f64 {
    if !decay_days.is_finite() || decay_days <= 0.0 {
        return 0.0;
    }
    let days_apart = (a.start - b.start).num_milliseconds().abs() as f64 / MILLIS_PER_DAY;
    (1.0 - days_apart / decay_days).max(0.0)
}

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_DAY: u32 = 24 * 60;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Wall-clock time of day with minute precision. `24:00` is accepted so a
/// window can end at the following midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WallClock {
    minutes: u32,
}

impl WallClock {
    pub const MIDNIGHT: WallClock = WallClock { minutes: 0 };
    pub const END_OF_DAY: WallClock = WallClock {
        minutes: MINUTES_PER_DAY,
    };

    pub const fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return None;
        }
        Some(Self {
            minutes: hour * 60 + minute,
        })
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        let mut split = value.trim().split(':');
        let (Some(hour), Some(minute), None) = (split.next(), split.next(), split.next()) else {
            return Err(format!("'{value}' must be HH:MM"));
        };
        let hour = hour
            .parse::<u32>()
            .map_err(|_| format!("'{value}' must be HH:MM"))?;
        let minute = minute
            .parse::<u32>()
            .map_err(|_| format!("'{value}' must be HH:MM"))?;
        Self::from_hm(hour, minute).ok_or_else(|| format!("'{value}' is not a time of day"))
    }

    pub fn minutes_from_midnight(self) -> u32 {
        self.minutes
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl TryFrom<String> for WallClock {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WallClock> for String {
    fn from(value: WallClock) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailabilityPolicy {
    pub window_start: WallClock,
    pub window_end: WallClock,
    pub min_free_minutes: u32,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            window_start: WallClock { minutes: 9 * 60 },
            window_end: WallClock { minutes: 18 * 60 },
            min_free_minutes: 30,
        }
    }
}

impl AvailabilityPolicy {
    pub fn full_day() -> Self {
        Self {
            window_start: WallClock::MIDNIGHT,
            window_end: WallClock::END_OF_DAY,
            min_free_minutes: 60,
        }
    }

    pub fn min_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.min_free_minutes))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.window_end <= self.window_start {
            return Err(format!(
                "availability window end {} must be after start {}",
                self.window_end, self.window_start
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimilarityWeights {
    pub tags: f64,
    pub content: f64,
    pub temporal: f64,
    pub category: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            tags: 0.4,
            content: 0.3,
            temporal: 0.2,
            category: 0.1,
        }
    }
}

impl SimilarityWeights {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("tags", self.tags),
            ("content", self.content),
            ("temporal", self.temporal),
            ("category", self.category),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("weights.{name} must be a non-negative number"));
            }
        }
        let sum: f64 = weights.iter().map(|(_, weight)| weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("weights must sum to 1.0 (got {sum})"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphPolicy {
    pub similarity_threshold: f64,
    pub top_k: usize,
    pub temporal_decay_days: f64,
    pub weights: SimilarityWeights,
}

impl Default for GraphPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.2,
            top_k: 10,
            temporal_decay_days: 30.0,
            weights: SimilarityWeights::default(),
        }
    }
}

impl GraphPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.similarity_threshold) {
            return Err("graph.similarityThreshold must be within [0, 1)".to_string());
        }
        if !self.temporal_decay_days.is_finite() || self.temporal_decay_days <= 0.0 {
            return Err("graph.temporalDecayDays must be > 0".to_string());
        }
        self.weights.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightTemplates {
    pub pattern: String,
    pub tag_cluster: String,
    pub recency: String,
}

impl Default for InsightTemplates {
    fn default() -> Self {
        Self {
            pattern: "{count} strongly related events suggest a recurring pattern.".to_string(),
            tag_cluster: "Related events often share the tags: {tags}.".to_string(),
            recency: "{count} related events happened within a week of this one.".to_string(),
        }
    }
}

impl InsightTemplates {
    pub fn render_pattern(&self, count: usize) -> String {
        self.pattern.replace("{count}", &count.to_string())
    }

    pub fn render_tag_cluster(&self, tags: &[&str]) -> String {
        self.tag_cluster.replace("{tags}", &tags.join(", "))
    }

    pub fn render_recency(&self, count: usize) -> String {
        self.recency.replace("{count}", &count.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightPolicy {
    pub strong_connection_strength: f64,
    pub pattern_min_count: usize,
    pub cluster_min_frequency: usize,
    pub cluster_top_tags: usize,
    pub recency_window_days: u32,
    pub templates: InsightTemplates,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            strong_connection_strength: 0.5,
            pattern_min_count: 2,
            cluster_min_frequency: 1,
            cluster_top_tags: 3,
            recency_window_days: 7,
            templates: InsightTemplates::default(),
        }
    }
}

impl InsightPolicy {
    pub fn recency_window(&self) -> Duration {
        Duration::days(i64::from(self.recency_window_days))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.strong_connection_strength) {
            return Err("insights.strongConnectionStrength must be within [0, 1]".to_string());
        }
        if self.cluster_top_tags == 0 {
            return Err("insights.clusterTopTags must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub timezone: Tz,
    pub availability: AvailabilityPolicy,
    pub graph: GraphPolicy,
    pub insights: InsightPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            availability: AvailabilityPolicy::default(),
            graph: GraphPolicy::default(),
            insights: InsightPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.availability.validate()?;
        self.graph.validate()?;
        self.insights.validate()
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Weights;

/// Case-insensitive identity of a club across every input source.
pub fn club_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AwarenessSignal {
    /// Ordinal 1-5 answer to "how often have you heard of this club".
    Rating(u8),
    Flag(bool),
}

impl AwarenessSignal {
    /// Maps the answer onto [0,1]: ratings via `(r - 1) / 4`, flags to 0 or 1.
    pub fn unit_value(self) -> f64 {
        match self {
            AwarenessSignal::Rating(r) => (f64::from(r.clamp(1, 5)) - 1.0) / 4.0,
            AwarenessSignal::Flag(true) => 1.0,
            AwarenessSignal::Flag(false) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticipationSignal {
    Flag(bool),
    Count(f64),
}

impl ParticipationSignal {
    pub fn value(self) -> f64 {
        match self {
            ParticipationSignal::Flag(true) => 1.0,
            ParticipationSignal::Flag(false) => 0.0,
            ParticipationSignal::Count(c) => c.max(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SurveyResponse {
    pub club_name: String,
    pub awareness: Option<AwarenessSignal>,
    pub participation: Option<ParticipationSignal>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventRecord {
    pub club_name: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub club_name: String,
    pub message_count: u64,
    pub participant_count: Option<u64>,
}

/// Mean feedback polarity mapped to [0,1], or a marker when no feedback could be scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sentiment {
    Measured(f64),
    InsufficientData,
}

impl Sentiment {
    pub fn value(self) -> Option<f64> {
        match self {
            Sentiment::Measured(v) => Some(v),
            Sentiment::InsufficientData => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMetrics {
    pub awareness: f64,
    pub participation: f64,
    pub sentiment: Sentiment,
    pub message_count: u64,
    pub event_count: u64,
}

impl Default for RawMetrics {
    fn default() -> Self {
        Self {
            awareness: 0.0,
            participation: 0.0,
            sentiment: Sentiment::InsufficientData,
            message_count: 0,
            event_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedScores {
    pub awareness: f64,
    pub participation: f64,
    pub sentiment: f64,
    pub message_activity: f64,
    pub event_count: f64,
}

impl NormalizedScores {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.awareness,
            self.participation,
            self.sentiment,
            self.message_activity,
            self.event_count,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ClubRecord {
    pub name: String,
    pub category: String,
    pub raw: RawMetrics,
    pub normalized: Option<NormalizedScores>,
    pub overall_score: f64,
    pub survey_responses: usize,
    pub participant_count: Option<u64>,
}

impl ClubRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            raw: RawMetrics::default(),
            normalized: None,
            overall_score: 0.0,
            survey_responses: 0,
            participant_count: None,
        }
    }

    pub fn key(&self) -> String {
        club_key(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub category_rank: usize,
    pub club_name: String,
    pub category: String,
    pub overall_score: f64,
    pub participation_raw: f64,
    pub scores: NormalizedScores,
}

#[derive(Debug, Clone)]
pub struct CategoryWinner {
    pub category: String,
    pub entry: RankingEntry,
}

#[derive(Debug, Clone)]
pub struct RankingRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub weights: Weights,
    pub clubs: Vec<ClubRecord>,
    pub table: Vec<RankingEntry>,
    pub winners: Vec<CategoryWinner>,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub avg_score: f64,
    pub leader: String,
}

use tracing::debug;

use crate::models::{ClubRecord, NormalizedScores, RawMetrics};

/// Score given to every club when a metric has no spread, or no data, for this run.
pub const NEUTRAL_SCORE: f64 = 0.5;

const ZERO_SPREAD: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    fn observe(range: Option<MetricRange>, value: f64) -> Option<MetricRange> {
        if !value.is_finite() {
            return range;
        }
        Some(match range {
            None => MetricRange {
                min: value,
                max: value,
            },
            Some(r) => MetricRange {
                min: r.min.min(value),
                max: r.max.max(value),
            },
        })
    }

    pub fn scale(&self, value: f64) -> f64 {
        let spread = self.max - self.min;
        if spread.abs() < ZERO_SPREAD {
            return NEUTRAL_SCORE;
        }
        ((value - self.min) / spread).clamp(0.0, 1.0)
    }
}

fn scale_or_neutral(range: Option<MetricRange>, value: Option<f64>) -> f64 {
    match (range, value) {
        (Some(range), Some(value)) => range.scale(value),
        _ => NEUTRAL_SCORE,
    }
}

/// Per-metric min/max over the whole run's population.
///
/// Collected once from every club's raw metrics before any club is normalized.
/// Sentiment ranges skip clubs marked as having insufficient data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    pub clubs: usize,
    pub awareness: Option<MetricRange>,
    pub participation: Option<MetricRange>,
    pub sentiment: Option<MetricRange>,
    pub message_count: Option<MetricRange>,
    pub event_count: Option<MetricRange>,
    pub sentiment_missing: usize,
}

impl PopulationStats {
    pub fn collect<'a>(raws: impl IntoIterator<Item = &'a RawMetrics>) -> Self {
        let mut stats = PopulationStats::default();
        for raw in raws {
            stats.clubs += 1;
            stats.awareness = MetricRange::observe(stats.awareness, raw.awareness);
            stats.participation = MetricRange::observe(stats.participation, raw.participation);
            match raw.sentiment.value() {
                Some(v) => stats.sentiment = MetricRange::observe(stats.sentiment, v),
                None => stats.sentiment_missing += 1,
            }
            stats.message_count =
                MetricRange::observe(stats.message_count, raw.message_count as f64);
            stats.event_count = MetricRange::observe(stats.event_count, raw.event_count as f64);
        }
        stats
    }

    pub fn normalize(&self, raw: &RawMetrics) -> NormalizedScores {
        NormalizedScores {
            awareness: scale_or_neutral(self.awareness, Some(raw.awareness)),
            participation: scale_or_neutral(self.participation, Some(raw.participation)),
            sentiment: scale_or_neutral(self.sentiment, raw.sentiment.value()),
            message_activity: scale_or_neutral(self.message_count, Some(raw.message_count as f64)),
            event_count: scale_or_neutral(self.event_count, Some(raw.event_count as f64)),
        }
    }
}

/// Min-max rescales one metric across a population.
pub fn normalize_values(values: &[f64]) -> Vec<f64> {
    let range = values
        .iter()
        .fold(None, |range, &v| MetricRange::observe(range, v));
    values
        .iter()
        .map(|&v| scale_or_neutral(range, Some(v).filter(|v| v.is_finite())))
        .collect()
}

/// Two-phase normalization: statistics over every club first, then per-club scores.
pub fn normalize_population(clubs: &mut [ClubRecord]) -> PopulationStats {
    let stats = PopulationStats::collect(clubs.iter().map(|c| &c.raw));
    debug!(
        clubs = stats.clubs,
        awareness = ?stats.awareness,
        participation = ?stats.participation,
        sentiment = ?stats.sentiment,
        sentiment_missing = stats.sentiment_missing,
        messages = ?stats.message_count,
        events = ?stats.event_count,
        "population statistics"
    );

    for club in clubs.iter_mut() {
        club.normalized = Some(stats.normalize(&club.raw));
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;

    fn raw(awareness: f64, participation: f64, sentiment: Sentiment, msgs: u64, events: u64) -> RawMetrics {
        RawMetrics {
            awareness,
            participation,
            sentiment,
            message_count: msgs,
            event_count: events,
        }
    }

    #[test]
    fn min_maps_to_zero_and_max_to_one() {
        let scaled = normalize_values(&[0.2, 0.4, 0.6]);
        assert_eq!(scaled[0], 0.0);
        assert!((scaled[1] - 0.5).abs() < 1e-9);
        assert_eq!(scaled[2], 1.0);
    }

    #[test]
    fn already_unit_values_are_stretched_to_full_band() {
        let scaled = normalize_values(&[0.25, 0.5, 0.75]);
        assert_eq!(scaled, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn zero_variance_gives_neutral_score() {
        assert_eq!(normalize_values(&[3.0, 3.0, 3.0]), vec![0.5, 0.5, 0.5]);
        assert_eq!(normalize_values(&[42.0]), vec![0.5]);
        assert!(normalize_values(&[]).is_empty());
    }

    #[test]
    fn insufficient_sentiment_is_excluded_from_range() {
        let raws = [
            raw(0.0, 0.0, Sentiment::Measured(0.4), 0, 0),
            raw(0.0, 0.0, Sentiment::Measured(0.9), 0, 0),
            raw(0.0, 0.0, Sentiment::InsufficientData, 0, 0),
        ];
        let stats = PopulationStats::collect(raws.iter());
        assert_eq!(stats.sentiment, Some(MetricRange { min: 0.4, max: 0.9 }));
        assert_eq!(stats.sentiment_missing, 1);

        assert_eq!(stats.normalize(&raws[0]).sentiment, 0.0);
        assert_eq!(stats.normalize(&raws[1]).sentiment, 1.0);
        assert_eq!(stats.normalize(&raws[2]).sentiment, NEUTRAL_SCORE);
    }

    #[test]
    fn no_measured_sentiment_anywhere_is_neutral() {
        let raws = [raw(1.0, 2.0, Sentiment::InsufficientData, 5, 1)];
        let stats = PopulationStats::collect(raws.iter());
        assert_eq!(stats.sentiment, None);
        assert_eq!(stats.normalize(&raws[0]).sentiment, NEUTRAL_SCORE);
    }

    #[test]
    fn every_normalized_score_is_in_unit_range() {
        let raws = [
            raw(0.1, 7.0, Sentiment::Measured(0.3), 900, 2),
            raw(0.9, 0.0, Sentiment::InsufficientData, 0, 12),
            raw(0.5, 3.5, Sentiment::Measured(0.7), 45, 0),
            raw(0.5, 3.5, Sentiment::Measured(0.7), 45, 0),
        ];
        let stats = PopulationStats::collect(raws.iter());
        for r in &raws {
            for score in stats.normalize(r).as_array() {
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }
}

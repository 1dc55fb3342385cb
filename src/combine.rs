use crate::config::Weights;
use crate::models::{ClubRecord, NormalizedScores};

/// Weighted sum of the five normalized scores.
///
/// `weights` must already be validated so they sum to 1.0; the result then stays in [0,1].
pub fn combine(scores: &NormalizedScores, weights: &Weights) -> f64 {
    let total: f64 = scores
        .as_array()
        .iter()
        .zip(weights.as_array())
        .map(|(score, weight)| score * weight)
        .sum();
    total.clamp(0.0, 1.0)
}

pub fn combine_population(clubs: &mut [ClubRecord], weights: &Weights) {
    for club in clubs.iter_mut() {
        club.overall_score = club
            .normalized
            .as_ref()
            .map(|scores| combine(scores, weights))
            .unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: f64) -> NormalizedScores {
        NormalizedScores {
            awareness: value,
            participation: value,
            sentiment: value,
            message_activity: value,
            event_count: value,
        }
    }

    #[test]
    fn uniform_scores_pass_through() {
        let weights = Weights::default();
        assert!((combine(&uniform(1.0), &weights) - 1.0).abs() < 1e-9);
        assert!((combine(&uniform(0.5), &weights) - 0.5).abs() < 1e-9);
        assert_eq!(combine(&uniform(0.0), &weights), 0.0);
    }

    #[test]
    fn default_weights_favor_awareness_and_participation() {
        let scores = NormalizedScores {
            awareness: 1.0,
            participation: 0.5,
            sentiment: 0.0,
            message_activity: 1.0,
            event_count: 0.0,
        };
        let expected = 0.30 * 1.0 + 0.30 * 0.5 + 0.10 * 1.0;
        assert!((combine(&scores, &Weights::default()) - expected).abs() < 1e-9);
    }

    #[test]
    fn renormalized_weights_keep_score_in_range() {
        let weights = Weights {
            awareness: 3.0,
            participation: 3.0,
            sentiment: 2.0,
            message_activity: 1.0,
            event_count: 1.0,
        }
        .validated()
        .unwrap();
        let score = combine(&uniform(1.0), &weights);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unnormalized_club_scores_zero() {
        let mut clubs = vec![ClubRecord::new("Ghost")];
        combine_population(&mut clubs, &Weights::default());
        assert_eq!(clubs[0].overall_score, 0.0);
    }
}

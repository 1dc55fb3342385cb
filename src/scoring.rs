use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::{club_key, ChatSummary, EventRecord, RawMetrics, Sentiment, SurveyResponse};
use crate::sentiment::SentimentScorer;

/// Everything gathered for one club before any metric is computed.
#[derive(Debug, Clone, Default)]
pub struct ClubAggregate {
    pub name: String,
    pub awareness: Vec<f64>,
    pub participation: Vec<f64>,
    pub feedback: Vec<String>,
    pub event_descriptions: Vec<String>,
    pub event_count: u64,
    pub message_count: u64,
    /// Summed across chat exports, so a sender present in two exports counts twice.
    pub participant_count: Option<u64>,
    pub chat_exports: usize,
    pub survey_responses: usize,
}

fn entry<'a>(
    clubs: &'a mut BTreeMap<String, ClubAggregate>,
    name: &str,
) -> Option<&'a mut ClubAggregate> {
    let key = club_key(name);
    if key.is_empty() {
        return None;
    }
    Some(clubs.entry(key).or_insert_with(|| ClubAggregate {
        name: name.trim().to_string(),
        ..ClubAggregate::default()
    }))
}

/// Groups all three sources by club. A club exists only if at least one source names it.
pub fn aggregate(
    surveys: &[SurveyResponse],
    events: &[EventRecord],
    chats: &[ChatSummary],
) -> Vec<ClubAggregate> {
    let mut clubs: BTreeMap<String, ClubAggregate> = BTreeMap::new();
    let mut skipped = 0usize;

    for response in surveys {
        let Some(club) = entry(&mut clubs, &response.club_name) else {
            skipped += 1;
            continue;
        };
        club.survey_responses += 1;
        if let Some(awareness) = response.awareness {
            club.awareness.push(awareness.unit_value());
        }
        if let Some(participation) = response.participation {
            club.participation.push(participation.value());
        }
        if let Some(feedback) = &response.feedback {
            club.feedback.push(feedback.clone());
        }
    }

    for event in events {
        let Some(club) = entry(&mut clubs, &event.club_name) else {
            skipped += 1;
            continue;
        };
        club.event_count += 1;
        if let Some(description) = &event.description {
            club.event_descriptions.push(description.clone());
        }
    }

    for chat in chats {
        let Some(club) = entry(&mut clubs, &chat.club_name) else {
            skipped += 1;
            continue;
        };
        if club.chat_exports > 0 {
            warn!(club = %club.name, "more than one chat summary for club, summing counts");
        }
        club.chat_exports += 1;
        club.message_count += chat.message_count;
        if let Some(participants) = chat.participant_count {
            club.participant_count = Some(club.participant_count.unwrap_or(0) + participants);
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped input records without a club name");
    }
    debug!(clubs = clubs.len(), "aggregated club inputs");
    clubs.into_values().collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean polarity over scoreable feedback, mapped from [-1,1] to [0,1].
pub fn sentiment_of<S: AsRef<str>>(feedback: &[S], scorer: &dyn SentimentScorer) -> Sentiment {
    let polarities: Vec<f64> = feedback
        .iter()
        .map(|text| text.as_ref().trim())
        .filter(|text| !text.is_empty())
        .filter_map(|text| scorer.score(text))
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(-1.0, 1.0))
        .collect();

    match mean(&polarities) {
        Some(p) => Sentiment::Measured((p + 1.0) / 2.0),
        None => Sentiment::InsufficientData,
    }
}

pub fn raw_metrics(club: &ClubAggregate, scorer: &dyn SentimentScorer) -> RawMetrics {
    RawMetrics {
        awareness: mean(&club.awareness).unwrap_or(0.0),
        participation: mean(&club.participation).unwrap_or(0.0),
        sentiment: sentiment_of(&club.feedback, scorer),
        message_count: club.message_count,
        event_count: club.event_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AwarenessSignal, ParticipationSignal};
    use crate::sentiment::LexiconScorer;

    fn survey(club: &str, awareness: Option<AwarenessSignal>, feedback: Option<&str>) -> SurveyResponse {
        SurveyResponse {
            club_name: club.to_string(),
            awareness,
            participation: None,
            feedback: feedback.map(str::to_string),
        }
    }

    fn event(club: &str, description: Option<&str>) -> EventRecord {
        EventRecord {
            club_name: club.to_string(),
            title: "Meetup".to_string(),
            description: description.map(str::to_string),
            date: None,
        }
    }

    struct FixedScorer(Option<f64>);

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> Option<f64> {
            self.0
        }
    }

    #[test]
    fn club_names_merge_case_insensitively() {
        let surveys = vec![
            survey("Chess Club", Some(AwarenessSignal::Rating(5)), None),
            survey("  chess club ", Some(AwarenessSignal::Rating(3)), None),
        ];
        let events = vec![event("CHESS CLUB", Some("Blitz night"))];

        let clubs = aggregate(&surveys, &events, &[]);
        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].name, "Chess Club");
        assert_eq!(clubs[0].survey_responses, 2);
        assert_eq!(clubs[0].event_count, 1);
        assert_eq!(clubs[0].event_descriptions, vec!["Blitz night"]);
    }

    #[test]
    fn records_without_club_name_are_skipped() {
        let surveys = vec![survey("   ", Some(AwarenessSignal::Rating(4)), None)];
        let chats = vec![ChatSummary {
            club_name: String::new(),
            message_count: 40,
            participant_count: None,
        }];
        assert!(aggregate(&surveys, &[], &chats).is_empty());
    }

    #[test]
    fn duplicate_chat_summaries_are_summed() {
        let chats = vec![
            ChatSummary {
                club_name: "Quiz".to_string(),
                message_count: 0,
                participant_count: Some(0),
            },
            ChatSummary {
                club_name: "QUIZ".to_string(),
                message_count: 25,
                participant_count: Some(3),
            },
            ChatSummary {
                club_name: "quiz".to_string(),
                message_count: 5,
                participant_count: None,
            },
        ];
        let clubs = aggregate(&[], &[], &chats);

        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].chat_exports, 3);
        assert_eq!(clubs[0].message_count, 30);
        assert_eq!(clubs[0].participant_count, Some(3));
    }

    #[test]
    fn awareness_ratings_and_flags_map_to_unit_range() {
        let surveys = vec![
            survey("Drama", Some(AwarenessSignal::Rating(5)), None),
            survey("Drama", Some(AwarenessSignal::Rating(1)), None),
            survey("Drama", Some(AwarenessSignal::Flag(true)), None),
            survey("Drama", None, None),
        ];
        let clubs = aggregate(&surveys, &[], &[]);
        let raw = raw_metrics(&clubs[0], &LexiconScorer);
        assert!((raw.awareness - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn participation_averages_counts() {
        let mut first = survey("Film", None, None);
        first.participation = Some(ParticipationSignal::Count(4.0));
        let mut second = survey("Film", None, None);
        second.participation = Some(ParticipationSignal::Count(2.0));

        let clubs = aggregate(&[first, second], &[], &[]);
        let raw = raw_metrics(&clubs[0], &LexiconScorer);
        assert!((raw.participation - 3.0).abs() < 1e-9);
    }

    #[test]
    fn single_source_club_gets_zero_and_marker_values() {
        let chats = vec![ChatSummary {
            club_name: "Quiz".to_string(),
            message_count: 12,
            participant_count: Some(4),
        }];
        let clubs = aggregate(&[], &[], &chats);
        let raw = raw_metrics(&clubs[0], &LexiconScorer);

        assert_eq!(raw.message_count, 12);
        assert_eq!(raw.event_count, 0);
        assert_eq!(raw.awareness, 0.0);
        assert_eq!(raw.participation, 0.0);
        assert_eq!(raw.sentiment, Sentiment::InsufficientData);
        assert_eq!(clubs[0].participant_count, Some(4));
    }

    #[test]
    fn sentiment_maps_polarity_to_unit_range() {
        let measured = sentiment_of(&["anything"], &FixedScorer(Some(0.6))).value().unwrap();
        assert!((measured - 0.8).abs() < 1e-9);
        assert_eq!(sentiment_of(&["anything"], &FixedScorer(Some(-3.0))), Sentiment::Measured(0.0));
    }

    #[test]
    fn unscoreable_feedback_is_insufficient_data() {
        assert_eq!(sentiment_of(&["", "   "], &FixedScorer(Some(1.0))), Sentiment::InsufficientData);
        assert_eq!(sentiment_of(&["words"], &FixedScorer(None)), Sentiment::InsufficientData);
        let none: [&str; 0] = [];
        assert_eq!(sentiment_of(&none, &LexiconScorer), Sentiment::InsufficientData);
    }
}

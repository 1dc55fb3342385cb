use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::classify::classify;
use crate::combine::combine_population;
use crate::config::{Taxonomy, Weights};
use crate::error::EngineError;
use crate::ingest;
use crate::models::{CategorySummary, CategoryWinner, ChatSummary, ClubRecord, EventRecord, RankingRun, SurveyResponse};
use crate::normalize::normalize_population;
use crate::ranking::{category_mix, rank, winners};
use crate::scoring::{aggregate, raw_metrics};
use crate::sentiment::SentimentScorer;

#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub surveys: Vec<SurveyResponse>,
    pub events: Vec<EventRecord>,
    pub chats: Vec<ChatSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct InputSources {
    pub survey: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub chats: Vec<PathBuf>,
    pub events_since: Option<NaiveDate>,
}

/// Reads all three sources concurrently; scoring waits until every one has finished.
pub async fn gather(sources: InputSources) -> anyhow::Result<RunInputs> {
    let survey_path = sources.survey.clone();
    let events_path = sources.events.clone();
    let chat_paths = sources.chats.clone();

    let surveys = tokio::task::spawn_blocking(move || match survey_path {
        Some(path) => ingest::load_surveys(&path),
        None => Ok(Vec::new()),
    });
    let events = tokio::task::spawn_blocking(move || match events_path {
        Some(path) => ingest::load_events(&path),
        None => Ok(Vec::new()),
    });
    let chats = tokio::task::spawn_blocking(move || ingest::load_chats(&chat_paths));

    let (surveys, events, chats) =
        tokio::try_join!(surveys, events, chats).context("ingest task panicked")?;
    let mut inputs = RunInputs {
        surveys: surveys?,
        events: events?,
        chats: chats?,
    };

    if let Some(since) = sources.events_since {
        let before = inputs.events.len();
        inputs.events.retain(|e| e.date.map_or(true, |d| d >= since));
        info!(%since, dropped = before - inputs.events.len(), "applied event cutoff");
    }

    if inputs.surveys.is_empty() && inputs.events.is_empty() && inputs.chats.is_empty() {
        warn!("no input records; the league table will be empty");
    }
    Ok(inputs)
}

/// Phase one: materialize clubs, classify them and compute their raw metrics.
pub fn build_clubs(
    inputs: &RunInputs,
    taxonomy: &Taxonomy,
    scorer: &dyn SentimentScorer,
) -> Vec<ClubRecord> {
    aggregate(&inputs.surveys, &inputs.events, &inputs.chats)
        .into_iter()
        .map(|club| {
            let mut record = ClubRecord::new(club.name.clone());
            record.category = classify(taxonomy, &club.name, &club.event_descriptions).to_string();
            record.raw = raw_metrics(&club, scorer);
            record.survey_responses = club.survey_responses;
            record.participant_count = club.participant_count;
            record
        })
        .collect()
}

/// One complete ranking run over a fixed population.
pub fn run(
    inputs: &RunInputs,
    taxonomy: &Taxonomy,
    weights: Weights,
    scorer: &dyn SentimentScorer,
) -> Result<RankingRun, EngineError> {
    let weights = weights.validated()?;

    let mut clubs = build_clubs(inputs, taxonomy, scorer);
    info!(clubs = clubs.len(), "scored raw club metrics");

    normalize_population(&mut clubs);
    combine_population(&mut clubs, &weights);

    let table = rank(&clubs);
    let mut by_category = winners(&clubs);
    let winners: Vec<CategoryWinner> = taxonomy
        .category_names()
        .filter_map(|name| {
            by_category.remove(name).map(|entry| CategoryWinner {
                category: name.to_string(),
                entry,
            })
        })
        .collect();

    let mut mix = category_mix(&table);
    let categories: Vec<CategorySummary> = taxonomy
        .category_names()
        .filter_map(|name| mix.remove(name))
        .collect();

    for winner in &winners {
        info!(
            category = %winner.category,
            club = %winner.entry.club_name,
            score = winner.entry.overall_score,
            "category winner"
        );
    }

    Ok(RankingRun {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        weights,
        clubs,
        table,
        winners,
        categories,
    })
}

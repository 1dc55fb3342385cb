use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::models::{CategorySummary, ClubRecord, RankingEntry};

/// League order: higher overall score, then higher raw participation, then club name A-Z
/// ignoring case.
pub fn league_order(a: &ClubRecord, b: &ClubRecord) -> Ordering {
    b.overall_score
        .total_cmp(&a.overall_score)
        .then_with(|| b.raw.participation.total_cmp(&a.raw.participation))
        .then_with(|| a.key().cmp(&b.key()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Global league table over fully scored clubs.
pub fn rank(clubs: &[ClubRecord]) -> Vec<RankingEntry> {
    let mut ordered: Vec<&ClubRecord> = clubs.iter().collect();
    ordered.sort_by(|a, b| league_order(a, b));

    let mut category_positions: HashMap<&str, usize> = HashMap::new();
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, club)| {
            let position = category_positions.entry(club.category.as_str()).or_insert(0);
            *position += 1;
            RankingEntry {
                rank: index + 1,
                category_rank: *position,
                club_name: club.name.clone(),
                category: club.category.clone(),
                overall_score: club.overall_score,
                participation_raw: club.raw.participation,
                scores: club.normalized.unwrap_or_default(),
            }
        })
        .collect()
}

/// Top club per category. Categories without clubs have no entry.
pub fn winners(clubs: &[ClubRecord]) -> BTreeMap<String, RankingEntry> {
    let mut best: BTreeMap<String, RankingEntry> = BTreeMap::new();
    for entry in rank(clubs) {
        if entry.category_rank == 1 {
            best.insert(entry.category.clone(), entry);
        }
    }
    best
}

/// Club count, mean overall score and leading club per category of a ranked table.
pub fn category_mix(table: &[RankingEntry]) -> BTreeMap<String, CategorySummary> {
    let mut mix: BTreeMap<String, CategorySummary> = BTreeMap::new();
    for entry in table {
        let summary = mix
            .entry(entry.category.clone())
            .or_insert_with(|| CategorySummary {
                category: entry.category.clone(),
                count: 0,
                avg_score: 0.0,
                leader: entry.club_name.clone(),
            });
        summary.count += 1;
        summary.avg_score += (entry.overall_score - summary.avg_score) / summary.count as f64;
    }
    mix
}

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::models::{RankingEntry, RankingRun, Sentiment};

fn entry_line(entry: &RankingEntry) -> String {
    let s = &entry.scores;
    format!(
        "{}. {} ({}) overall {:.3} [awareness {:.2}, participation {:.2}, sentiment {:.2}, messages {:.2}, events {:.2}]",
        entry.rank,
        entry.club_name,
        entry.category,
        entry.overall_score,
        s.awareness,
        s.participation,
        s.sentiment,
        s.message_activity,
        s.event_count
    )
}

pub fn build_report(run: &RankingRun, limit: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Club League Report");
    let _ = writeln!(
        output,
        "Run {} generated at {}",
        run.run_id,
        run.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let w = &run.weights;
    let _ = writeln!(
        output,
        "Weights: awareness {:.2}, participation {:.2}, sentiment {:.2}, messages {:.2}, events {:.2}",
        w.awareness, w.participation, w.sentiment, w.message_activity, w.event_count
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Winners");

    if run.winners.is_empty() {
        let _ = writeln!(output, "No clubs were ranked in this run.");
    } else {
        for winner in &run.winners {
            let _ = writeln!(
                output,
                "- {}: {} (overall {:.3}, rank #{})",
                winner.category,
                winner.entry.club_name,
                winner.entry.overall_score,
                winner.entry.rank
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## League Table");

    if run.table.is_empty() {
        let _ = writeln!(output, "No clubs were ranked in this run.");
    } else {
        for entry in run.table.iter().take(limit) {
            let _ = writeln!(output, "{}", entry_line(entry));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");
    for summary in &run.categories {
        let _ = writeln!(
            output,
            "- {}: {} clubs (avg overall {:.3}, led by {})",
            summary.category, summary.count, summary.avg_score, summary.leader
        );
    }

    let mut missing: Vec<&str> = run
        .clubs
        .iter()
        .filter(|c| c.raw.sentiment == Sentiment::InsufficientData)
        .map(|c| c.name.as_str())
        .collect();
    missing.sort_by_key(|name| name.to_lowercase());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insufficient Feedback");
    if missing.is_empty() {
        let _ = writeln!(output, "Every club had scoreable feedback.");
    } else {
        let _ = writeln!(
            output,
            "Sentiment was set to neutral for: {}",
            missing.join(", ")
        );
    }

    output
}

#[derive(Debug, Serialize)]
struct TableRow<'a> {
    rank: usize,
    club_name: &'a str,
    category: &'a str,
    category_rank: usize,
    overall_score: f64,
    awareness_score: f64,
    participation_score: f64,
    sentiment_score: f64,
    message_activity_score: f64,
    event_count_score: f64,
}

impl<'a> From<&'a RankingEntry> for TableRow<'a> {
    fn from(entry: &'a RankingEntry) -> Self {
        Self {
            rank: entry.rank,
            club_name: &entry.club_name,
            category: &entry.category,
            category_rank: entry.category_rank,
            overall_score: entry.overall_score,
            awareness_score: entry.scores.awareness,
            participation_score: entry.scores.participation,
            sentiment_score: entry.scores.sentiment,
            message_activity_score: entry.scores.message_activity,
            event_count_score: entry.scores.event_count,
        }
    }
}

fn write_rows<'a>(path: &Path, entries: impl Iterator<Item = &'a RankingEntry>) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for entry in entries {
        writer.serialize(TableRow::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `combined_scores.csv` and `group_winners.csv` into `out_dir`.
pub fn export_csv(run: &RankingRun, out_dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let table_path = out_dir.join("combined_scores.csv");
    let winners_path = out_dir.join("group_winners.csv");
    write_rows(&table_path, run.table.iter())?;
    write_rows(&winners_path, run.winners.iter().map(|w| &w.entry))?;
    Ok((table_path, winners_path))
}

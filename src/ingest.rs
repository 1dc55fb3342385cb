use std::io;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::models::{AwarenessSignal, ChatSummary, EventRecord, ParticipationSignal, SurveyResponse};

const CLUB_ALIASES: [&str; 2] = ["club_name", "club"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows: usize,
    pub accepted: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct SurveyRow {
    #[serde(default, alias = "club")]
    club_name: Option<String>,
    #[serde(
        default,
        alias = "awareness_rating",
        alias = "heard_often",
        alias = "heard_of_club",
        alias = "aware"
    )]
    awareness: Option<String>,
    #[serde(
        default,
        alias = "participation_count",
        alias = "participated",
        alias = "participation_rate"
    )]
    participation: Option<String>,
    #[serde(default, alias = "feedback_text", alias = "comments", alias = "comment")]
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(default, alias = "club")]
    club_name: Option<String>,
    #[serde(default, alias = "title", alias = "event")]
    event_title: Option<String>,
    #[serde(default, alias = "description", alias = "details")]
    event_description: Option<String>,
    #[serde(default, alias = "event_date")]
    date: Option<String>,
}

/// Lowercased header with spaces and hyphens folded to underscores.
pub fn canonical_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

pub fn parse_awareness(value: &str) -> Option<AwarenessSignal> {
    if let Some(flag) = parse_flag(value) {
        return Some(AwarenessSignal::Flag(flag));
    }
    let rating: f64 = value.trim().parse().ok()?;
    if !(1.0..=5.0).contains(&rating) {
        return None;
    }
    Some(AwarenessSignal::Rating(rating.round() as u8))
}

pub fn parse_participation(value: &str) -> Option<ParticipationSignal> {
    if let Some(flag) = parse_flag(value) {
        return Some(ParticipationSignal::Flag(flag));
    }
    let count: f64 = value.trim().parse().ok()?;
    if !count.is_finite() || count < 0.0 {
        return None;
    }
    Some(ParticipationSignal::Count(count))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn canonical_reader<R: io::Read>(
    reader: R,
    source_name: &'static str,
) -> anyhow::Result<csv::Reader<R>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: csv::StringRecord = reader
        .headers()
        .with_context(|| format!("failed to read {source_name} header row"))?
        .iter()
        .map(canonical_header)
        .collect();

    if !headers.iter().any(|h| CLUB_ALIASES.contains(&h)) {
        return Err(EngineError::MissingColumn {
            source_name,
            column: "club_name",
        }
        .into());
    }
    reader.set_headers(headers);
    Ok(reader)
}

pub fn read_surveys<R: io::Read>(reader: R) -> anyhow::Result<(Vec<SurveyResponse>, IngestStats)> {
    let mut reader = canonical_reader(reader, "survey")?;
    let mut stats = IngestStats::default();
    let mut responses = Vec::new();

    for (line, result) in reader.deserialize::<SurveyRow>().enumerate() {
        stats.rows += 1;
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(row = line + 1, error = %err, "unreadable survey row");
                stats.skipped += 1;
                continue;
            }
        };
        let Some(club_name) = non_blank(row.club_name) else {
            warn!(row = line + 1, "survey row without club name");
            stats.skipped += 1;
            continue;
        };

        let awareness = non_blank(row.awareness);
        let parsed_awareness = awareness.as_deref().and_then(parse_awareness);
        if awareness.is_some() && parsed_awareness.is_none() {
            debug!(row = line + 1, value = ?awareness, "ignoring unusable awareness value");
        }

        responses.push(SurveyResponse {
            club_name,
            awareness: parsed_awareness,
            participation: non_blank(row.participation).as_deref().and_then(parse_participation),
            feedback: non_blank(row.feedback),
        });
        stats.accepted += 1;
    }

    Ok((responses, stats))
}

pub fn read_events<R: io::Read>(reader: R) -> anyhow::Result<(Vec<EventRecord>, IngestStats)> {
    let mut reader = canonical_reader(reader, "event log")?;
    let mut stats = IngestStats::default();
    let mut events = Vec::new();

    for (line, result) in reader.deserialize::<EventRow>().enumerate() {
        stats.rows += 1;
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(row = line + 1, error = %err, "unreadable event row");
                stats.skipped += 1;
                continue;
            }
        };
        let (Some(club_name), Some(title)) = (non_blank(row.club_name), non_blank(row.event_title))
        else {
            warn!(row = line + 1, "event row without club name or title");
            stats.skipped += 1;
            continue;
        };

        events.push(EventRecord {
            club_name,
            title,
            description: non_blank(row.event_description),
            date: non_blank(row.date).as_deref().and_then(parse_date),
        });
        stats.accepted += 1;
    }

    Ok((events, stats))
}

pub fn load_surveys(path: &Path) -> anyhow::Result<Vec<SurveyResponse>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open survey {}", path.display()))?;
    let (responses, stats) = read_surveys(file)?;
    info!(path = %path.display(), rows = stats.rows, skipped = stats.skipped, "survey ingested");
    Ok(responses)
}

pub fn load_events(path: &Path) -> anyhow::Result<Vec<EventRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open event log {}", path.display()))?;
    let (events, stats) = read_events(file)?;
    info!(path = %path.display(), rows = stats.rows, skipped = stats.skipped, "event log ingested");
    Ok(events)
}

/// Counts messages and distinct senders in a chat-group text export.
pub struct ChatParser {
    sender: Regex,
}

impl ChatParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            sender: Regex::new(r"-\s*(.+?):")?,
        })
    }

    /// Returns `(messages, unique_senders)`.
    pub fn parse(&self, text: &str) -> (u64, u64) {
        let mut messages = 0u64;
        let mut senders = std::collections::HashSet::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !(line.contains('-') && line.contains(':')) {
                continue;
            }
            messages += 1;
            if let Some(sender) = self.sender.captures(line).and_then(|c| c.get(1)) {
                senders.insert(sender.as_str().trim().to_string());
            }
        }

        (messages, senders.len() as u64)
    }

    /// One export per club; the club name is the file stem.
    pub fn load(&self, path: &Path) -> Option<ChatSummary> {
        let club_name = path.file_stem()?.to_string_lossy().trim().to_string();
        if club_name.is_empty() {
            warn!(path = %path.display(), "chat export has no usable file name");
            return None;
        }

        let (message_count, participants) = match std::fs::read(path) {
            Ok(bytes) => self.parse(&String::from_utf8_lossy(&bytes)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable chat export, counting zero messages");
                (0, 0)
            }
        };

        debug!(club = %club_name, message_count, participants, "chat export parsed");
        Some(ChatSummary {
            club_name,
            message_count,
            participant_count: Some(participants),
        })
    }
}

pub fn load_chats(paths: &[std::path::PathBuf]) -> anyhow::Result<Vec<ChatSummary>> {
    let parser = ChatParser::new()?;
    let chats: Vec<ChatSummary> = paths.iter().filter_map(|p| parser.load(p)).collect();
    info!(files = paths.len(), clubs = chats.len(), "chat exports ingested");
    Ok(chats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_canonicalized() {
        assert_eq!(canonical_header(" Club Name "), "club_name");
        assert_eq!(canonical_header("Feedback-Text"), "feedback_text");
    }

    #[test]
    fn survey_aliases_resolve_to_canonical_fields() {
        let data = "Club,Heard Often,Participation Count,Comments\n\
                    Chess Club,5,3,Great fun\n\
                    ,4,1,orphan row\n\
                    Drama,yes,no,\n\
                    Drama,9,abc,Loved it\n";
        let (responses, stats) = read_surveys(data.as_bytes()).unwrap();

        assert_eq!(stats, IngestStats { rows: 4, accepted: 3, skipped: 1 });
        assert_eq!(responses[0].club_name, "Chess Club");
        assert_eq!(responses[0].awareness, Some(AwarenessSignal::Rating(5)));
        assert_eq!(responses[0].participation, Some(ParticipationSignal::Count(3.0)));
        assert_eq!(responses[0].feedback.as_deref(), Some("Great fun"));

        assert_eq!(responses[1].awareness, Some(AwarenessSignal::Flag(true)));
        assert_eq!(responses[1].participation, Some(ParticipationSignal::Flag(false)));
        assert_eq!(responses[1].feedback, None);

        assert_eq!(responses[2].awareness, None);
        assert_eq!(responses[2].participation, None);
    }

    #[test]
    fn survey_without_club_column_is_rejected() {
        let err = read_surveys("name,awareness\nChess,3\n".as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::MissingColumn {
                source_name: "survey",
                column: "club_name"
            })
        );
    }

    #[test]
    fn events_need_club_and_title() {
        let data = "club_name,event_title,event_description,date\n\
                    Coders,Hack Night,Build a web app,2024-03-01\n\
                    Coders,,No title here,\n\
                    Dance Crew,Showcase,,15/04/2024\n\
                    Dance Crew,Jam,,someday\n";
        let (events, stats) = read_events(data.as_bytes()).unwrap();

        assert_eq!(stats.accepted, 3);
        assert_eq!(stats.skipped, 1);
        assert_eq!(events[0].description.as_deref(), Some("Build a web app"));
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2024, 4, 15));
        assert_eq!(events[2].date, None);
    }

    #[test]
    fn chat_export_counts_messages_and_senders() {
        let parser = ChatParser::new().unwrap();
        let text = "12/03/2024, 18:01 - Asha: Meeting at 6?\n\
                    12/03/2024, 18:02 - Ben: yes\n\
                    \n\
                    continuation line without markers\n\
                    12/03/2024, 18:05 - Asha: see you\n";
        assert_eq!(parser.parse(text), (3, 2));
    }

    #[test]
    fn chat_file_stem_names_the_club() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Photography Club.txt");
        std::fs::write(&path, "01/01/2024, 10:00 - Kim: hello\n").unwrap();
        let missing = dir.path().join("Ghost Club.txt");

        let chats = load_chats(&[path, missing]).unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].club_name, "Photography Club");
        assert_eq!(chats[0].message_count, 1);
        assert_eq!(chats[0].participant_count, Some(1));
        assert_eq!(chats[1].club_name, "Ghost Club");
        assert_eq!(chats[1].message_count, 0);
    }
}

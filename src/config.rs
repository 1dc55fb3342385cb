use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;

pub const FALLBACK_CATEGORY: &str = "Others";

/// Relative importance of the five normalized metrics in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub awareness: f64,
    pub participation: f64,
    pub sentiment: f64,
    pub message_activity: f64,
    pub event_count: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            awareness: 0.30,
            participation: 0.30,
            sentiment: 0.20,
            message_activity: 0.10,
            event_count: 0.10,
        }
    }
}

impl Weights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.awareness,
            self.participation,
            self.sentiment,
            self.message_activity,
            self.event_count,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Weights {
        Weights {
            awareness: f(self.awareness),
            participation: f(self.participation),
            sentiment: f(self.sentiment),
            message_activity: f(self.message_activity),
            event_count: f(self.event_count),
        }
    }

    fn labelled(&self) -> [(&'static str, f64); 5] {
        [
            ("awareness", self.awareness),
            ("participation", self.participation),
            ("sentiment", self.sentiment),
            ("message_activity", self.message_activity),
            ("event_count", self.event_count),
        ]
    }

    /// Rejects negative or non-finite weights and rescales the rest to sum to 1.0.
    pub fn validated(self) -> Result<Weights, EngineError> {
        for (factor, value) in self.labelled() {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteWeight { factor });
            }
            if value < 0.0 {
                return Err(EngineError::NegativeWeight { factor, value });
            }
        }

        // Dividing by the largest weight first keeps the sum finite for huge inputs.
        let largest = self.as_array().into_iter().fold(0.0, f64::max);
        if largest <= 0.0 {
            return Err(EngineError::ZeroWeightSum);
        }
        if (self.sum() - 1.0).abs() < 1e-9 {
            return Ok(self);
        }

        let scaled = self.map(|w| w / largest);
        let sum = scaled.sum();
        warn!(sum = self.sum(), "combiner weights do not sum to 1.0, renormalizing");
        Ok(scaled.map(|w| w / sum))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryGroup {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered keyword groups checked first to last, with the fallback always last.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    groups: Vec<CategoryGroup>,
}

impl Taxonomy {
    pub fn new(groups: Vec<CategoryGroup>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(groups.len() + 1);

        for mut group in groups {
            group.name = group.name.trim().to_string();
            if group.name.is_empty() {
                return Err(EngineError::EmptyCategoryName);
            }
            if !seen.insert(group.name.to_lowercase()) {
                return Err(EngineError::DuplicateCategory(group.name));
            }
            if group.name.eq_ignore_ascii_case(FALLBACK_CATEGORY) {
                continue;
            }
            group.keywords = group
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            ordered.push(group);
        }

        ordered.push(CategoryGroup {
            name: FALLBACK_CATEGORY.to_string(),
            keywords: Vec::new(),
        });
        Ok(Self { groups: ordered })
    }

    /// Keyword-bearing groups in priority order, excluding the fallback.
    pub fn keyword_groups(&self) -> &[CategoryGroup] {
        &self.groups[..self.groups.len() - 1]
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn fallback(&self) -> &str {
        FALLBACK_CATEGORY
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        let groups = vec![
            CategoryGroup::new(
                "Tech",
                &[
                    "tech", "technology", "coding", "code", "programming", "developer",
                    "developers", "software", "hackathon", "ai", "machine learning", "data",
                    "cyber", "cybersecurity", "web", "app", "computer", "computing", "gdsc",
                    "electronics", "blockchain", "open source",
                ],
            ),
            CategoryGroup::new(
                "Sports",
                &[
                    "sports", "sport", "football", "soccer", "cricket", "basketball",
                    "volleyball", "badminton", "tennis", "athletics", "fitness", "yoga",
                    "swimming", "kabaddi", "hockey", "tournament", "tryouts",
                ],
            ),
            CategoryGroup::new(
                "Entertainment",
                &[
                    "music", "dance", "drama", "theatre", "theater", "film", "movie",
                    "photography", "photographer", "art", "arts", "band", "comedy", "gaming", "fashion",
                    "cultural", "audition", "rehearsal", "singing",
                ],
            ),
            CategoryGroup::new(
                "Literature & Knowledge",
                &[
                    "literature", "literary", "book", "books", "reading", "poetry",
                    "writing", "debate", "debating", "quiz", "mun", "model united nations",
                    "journal", "library", "philosophy", "history", "language",
                ],
            ),
        ];

        Self::new(groups).unwrap_or_else(|_| Self {
            groups: vec![CategoryGroup {
                name: FALLBACK_CATEGORY.to_string(),
                keywords: Vec::new(),
            }],
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub weights: Option<Weights>,
    pub taxonomy: Option<Vec<CategoryGroup>>,
}

impl AppConfig {
    pub fn taxonomy(&self) -> Result<Taxonomy, EngineError> {
        match &self.taxonomy {
            Some(groups) => Taxonomy::new(groups.clone()),
            None => Ok(Taxonomy::default()),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("invalid config JSON in {}", path.display()))?;
    Ok(config)
}

//! Review data: the note under inspection and its guideline report.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::{CriteriaTab, Guideline, ReviewResponse};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read review data {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("review data {path} is not a valid review response: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The note plus its guidelines, ordered ascending by guideline number.
#[derive(Debug, Clone, Default)]
pub struct Review {
    pub note: String,
    pub guidelines: Vec<Guideline>,
}

impl Review {
    pub fn new(note: impl Into<String>, mut guidelines: Vec<Guideline>) -> Self {
        guidelines.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self {
            note: note.into(),
            guidelines,
        }
    }

    pub fn from_response(response: ReviewResponse) -> Self {
        let result = response.result_json;
        Self::new(result.note, result.guideline_report.guidelines)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<ReviewResponse>(json).map(Self::from_response)
    }

    /// Guidelines shown under `tab`.
    pub fn guidelines_for(&self, tab: CriteriaTab) -> Vec<&Guideline> {
        self.guidelines
            .iter()
            .filter(|g| tab == CriteriaTab::All || g.criterion_met)
            .collect()
    }

    pub fn guideline(&self, number: &str) -> Option<&Guideline> {
        self.guidelines.iter().find(|g| g.number == number)
    }
}

pub fn load_review(path: &Path) -> Result<Review, LoadError> {
    let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let review = Review::from_json(&json).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        guidelines = review.guidelines.len(),
        note_chars = review.note.chars().count(),
        "loaded review"
    );
    Ok(review)
}

//! Agent input and output types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::external_catalog::Candidate;

/// What the host knows about a media item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    /// Title as known to the host (or a typed IMDb id on manual search).
    pub name: String,
    /// Release year, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Identifier assigned by a primary identification pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// A candidate with its match confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: u32,
}

/// A match returned to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// Identifier to pass back to `update`.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Confidence, 100 being a certain match.
    pub score: u32,
}

impl From<ScoredCandidate> for SearchResult {
    fn from(scored: ScoredCandidate) -> Self {
        Self {
            id: scored.candidate.id,
            name: Some(scored.candidate.title),
            year: scored.candidate.year,
            score: scored.score,
        }
    }
}

/// A director or cast member on the host's record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// How a poster is presented to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PosterProxy {
    /// Full image lives at the map key; `thumb_url` is the preview.
    Preview { thumb_url: String, sort_order: u32 },
}

/// The host's metadata record, populated in place by `update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub summary: Option<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub directors: Vec<Person>,
    #[serde(default)]
    pub cast: Vec<Person>,
    /// Poster URL to proxy descriptor.
    #[serde(default)]
    pub posters: BTreeMap<String, PosterProxy>,
}

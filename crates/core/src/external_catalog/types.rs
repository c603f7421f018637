//! Types for Douban movie API responses.
//!
//! Payload fields are decoded leniently: a field that is missing, `null`
//! or of an unexpected shape decodes to its absent value instead of failing
//! the whole record.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

static RE_IMDB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^tt\d+$").unwrap());
static RE_DOUBAN_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Whether `s` has the shape of an IMDb title id (`tt` followed by digits).
pub fn is_imdb_id(s: &str) -> bool {
    RE_IMDB_ID.is_match(s)
}

/// An identifier the remote API can look a subject up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalId {
    /// IMDb title id, e.g. `tt0078748`.
    Imdb(String),
    /// Douban subject id, e.g. `1292052`.
    Douban(String),
}

impl ExternalId {
    /// Classify an identifier. Returns `None` if it is neither shape.
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        if RE_IMDB_ID.is_match(id) {
            Some(Self::Imdb(id.to_string()))
        } else if RE_DOUBAN_ID.is_match(id) {
            Some(Self::Douban(id.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Imdb(id) | Self::Douban(id) => id,
        }
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Search
// ============================================================================

/// One entry of a search response, in the order the API ranked it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Douban subject id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Display title.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// Title in the original language.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub original_title: Option<String>,
    /// Release year; absent when missing or not a number.
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    /// `movie` or `tv`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtype: String,
}

impl Candidate {
    pub fn is_movie(&self) -> bool {
        self.subtype == "movie"
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub subjects: Vec<Candidate>,
}

// ============================================================================
// Subject
// ============================================================================

/// A full subject record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubjectRecord {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub original_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub rating: Option<Rating>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub ratings_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub countries: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub directors: Vec<Credit>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub casts: Vec<Credit>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub images: Option<Images>,
}

/// Aggregate rating.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Average score (0-10).
    #[serde(default, deserialize_with = "lenient_number")]
    pub average: Option<f64>,
}

/// A director or cast member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credit {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_object")]
    pub avatars: Option<Images>,
}

/// Image URLs at several sizes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Images {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub large: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub small: Option<String>,
}

// ============================================================================
// Lenient field decoding
// ============================================================================

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_year(value: Value) -> Option<i32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        // The IMDb lookup endpoint reports years as a list.
        Value::Array(items) => items.into_iter().next().and_then(value_to_year),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?))
}

fn lenient_year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    Ok(value_to_year(Value::deserialize(d)?))
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        _ => Vec::new(),
    })
}

fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

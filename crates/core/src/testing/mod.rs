//! Testing utilities and mock implementations.
//!
//! This module provides a scripted [`MockTransport`] and JSON fixtures
//! shaped like Douban API payloads, so the agent can be exercised end to
//! end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use doubanmeta_core::testing::{fixtures, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport
//!     .respond(
//!         "http://douban.test/v2/movie/search?q=Alien",
//!         fixtures::search_json(&[fixtures::candidate_json("1", "Alien", "1979", "movie")]),
//!     )
//!     .await;
//! ```

mod mock_transport;

pub use mock_transport::MockTransport;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::agent::Query;
    use crate::config::Config;
    use crate::external_catalog::Candidate;

    /// Base URL the fixtures' config points at.
    pub const BASE_URL: &str = "http://douban.test/v2/movie";

    /// A config pointing at [`BASE_URL`] with zero retry delay.
    pub fn test_config() -> Config {
        let mut config = Config::default();
        config.catalog.base_url = BASE_URL.to_string();
        config.retry.delay_ms = 0;
        config
    }

    /// Create a query with an optional year.
    pub fn query(name: &str, year: Option<i32>) -> Query {
        Query {
            name: name.to_string(),
            year,
            external_id: None,
        }
    }

    /// Create a movie candidate whose original title equals its title.
    pub fn candidate(id: &str, title: &str, year: Option<i32>) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: title.to_string(),
            original_title: Some(title.to_string()),
            year,
            subtype: "movie".to_string(),
        }
    }

    /// A search entry as the API returns it.
    pub fn candidate_json(id: &str, title: &str, year: &str, subtype: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "original_title": title,
            "year": year,
            "subtype": subtype,
        })
    }

    /// A search response wrapping `subjects`.
    pub fn search_json(subjects: &[Value]) -> Value {
        json!({
            "count": subjects.len(),
            "start": 0,
            "total": subjects.len(),
            "subjects": subjects,
        })
    }

    /// A full subject record with reasonable defaults.
    pub fn subject_json(title: &str, year: &str) -> Value {
        json!({
            "id": "1292052",
            "title": title,
            "original_title": title,
            "year": year,
            "rating": {"max": 10, "average": 8.7, "min": 0},
            "ratings_count": 1200,
            "summary": format!("A film called {}.", title),
            "genres": ["Science Fiction", " Horror "],
            "countries": ["United Kingdom ", "United States"],
            "directors": [
                {"name": "Ridley Scott", "avatars": {"large": "http://img.test/rs.jpg"}}
            ],
            "casts": [
                {"name": "Sigourney Weaver", "avatars": {"large": "http://img.test/sw.jpg"}},
                {"name": "Tom Skerritt", "avatars": null}
            ],
            "images": {
                "large": "http://img.test/poster-large.jpg",
                "medium": "http://img.test/poster-medium.jpg",
                "small": "http://img.test/poster-small.jpg"
            },
            "subtype": "movie"
        })
    }
}

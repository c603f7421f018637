//! Subject record to metadata record mapping.

use tracing::debug;

use super::types::{MetadataRecord, Person, PosterProxy};
use crate::external_catalog::{Credit, SubjectRecord};

/// Sort order given to an injected poster.
const POSTER_SORT_ORDER: u32 = 1;

/// Copies a [`SubjectRecord`] onto a [`MetadataRecord`].
///
/// Scalar fields are only overwritten when the record supplies a value.
/// Genres, countries, directors and cast are replaced wholesale. A poster
/// is only added to a record that has none.
#[derive(Debug, Clone)]
pub struct MetadataMapper {
    min_votes: u64,
}

impl Default for MetadataMapper {
    fn default() -> Self {
        Self::new(3)
    }
}

impl MetadataMapper {
    /// Ratings backed by `min_votes` votes or fewer are ignored.
    pub fn new(min_votes: u64) -> Self {
        Self { min_votes }
    }

    pub fn map(&self, record: &SubjectRecord, target: &mut MetadataRecord) {
        // Rating
        let votes = record.ratings_count.unwrap_or(0);
        let average = record.rating.as_ref().and_then(|r| r.average);
        match average {
            Some(average) if votes > self.min_votes => target.rating = Some(average as f32),
            Some(_) => debug!("Ignoring rating backed by only {} vote(s)", votes),
            None => {}
        }

        if let Some(year) = record.year {
            target.year = Some(year);
        }

        if let Some(title) = non_empty(&record.title) {
            target.title = Some(title.to_string());
        }

        if let Some(original_title) = non_empty(&record.original_title) {
            if target.title.as_deref() != Some(original_title) {
                target.original_title = Some(original_title.to_string());
            }
        }

        if let Some(summary) = non_empty(&record.summary) {
            target.summary = Some(summary.to_string());
        }

        target.genres.clear();
        target.genres.extend(trimmed(&record.genres));

        target.countries.clear();
        target.countries.extend(trimmed(&record.countries));

        target.directors = people(&record.directors);
        target.cast = people(&record.casts);

        // Posters: first write wins
        if target.posters.is_empty() {
            let images = record.images.as_ref();
            let large = images.and_then(|i| non_empty(&i.large));
            if let Some(poster_url) = large {
                let thumb_url = images
                    .and_then(|i| non_empty(&i.small))
                    .unwrap_or(poster_url);
                target.posters.insert(
                    poster_url.to_string(),
                    PosterProxy::Preview {
                        thumb_url: thumb_url.to_string(),
                        sort_order: POSTER_SORT_ORDER,
                    },
                );
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn trimmed(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn people(credits: &[Credit]) -> Vec<Person> {
    credits
        .iter()
        .filter(|c| !c.name.trim().is_empty())
        .map(|c| Person {
            name: c.name.clone(),
            photo: c
                .avatars
                .as_ref()
                .and_then(|a| non_empty(&a.large))
                .map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_catalog::{Images, Rating};
    use crate::testing::fixtures;

    fn record() -> SubjectRecord {
        serde_json::from_value(fixtures::subject_json("Alien", "1979")).unwrap()
    }

    #[test]
    fn test_map_full_record() {
        let mut target = MetadataRecord::default();
        MetadataMapper::default().map(&record(), &mut target);

        assert_eq!(target.title.as_deref(), Some("Alien"));
        assert!(target.original_title.is_none());
        assert_eq!(target.year, Some(1979));
        assert_eq!(target.rating, Some(8.7));
        assert_eq!(target.summary.as_deref(), Some("A film called Alien."));
        assert!(target.genres.contains("Horror"));
        assert!(target.genres.contains("Science Fiction"));
        assert!(target.countries.contains("United Kingdom"));
        assert_eq!(target.directors.len(), 1);
        assert_eq!(
            target.directors[0].photo.as_deref(),
            Some("http://img.test/rs.jpg")
        );
        assert_eq!(target.cast[0].name, "Sigourney Weaver");
        assert!(target.cast[1].photo.is_none());
        assert_eq!(
            target.posters.get("http://img.test/poster-large.jpg"),
            Some(&PosterProxy::Preview {
                thumb_url: "http://img.test/poster-small.jpg".to_string(),
                sort_order: 1,
            })
        );
    }

    #[test]
    fn test_rating_requires_enough_votes() {
        let mut source = record();
        source.ratings_count = Some(3);

        let mut target = MetadataRecord {
            rating: Some(5.0),
            ..Default::default()
        };
        MetadataMapper::default().map(&source, &mut target);
        assert_eq!(target.rating, Some(5.0));

        source.ratings_count = Some(4);
        MetadataMapper::default().map(&source, &mut target);
        assert_eq!(target.rating, Some(8.7));
    }

    #[test]
    fn test_rating_threshold_is_configurable() {
        let mut source = record();
        source.ratings_count = Some(50);

        let mut target = MetadataRecord::default();
        MetadataMapper::new(100).map(&source, &mut target);
        assert!(target.rating.is_none());
    }

    #[test]
    fn test_original_title_only_when_different() {
        let mut source = record();
        source.title = Some("异形".to_string());
        source.original_title = Some("Alien".to_string());

        let mut target = MetadataRecord::default();
        MetadataMapper::default().map(&source, &mut target);
        assert_eq!(target.title.as_deref(), Some("异形"));
        assert_eq!(target.original_title.as_deref(), Some("Alien"));
    }

    #[test]
    fn test_absent_fields_do_not_overwrite() {
        let source = SubjectRecord {
            title: Some("Alien".to_string()),
            summary: Some("   ".to_string()),
            rating: Some(Rating { average: None }),
            ratings_count: Some(1000),
            ..Default::default()
        };

        let mut target = MetadataRecord {
            year: Some(1979),
            summary: Some("Existing summary".to_string()),
            rating: Some(8.0),
            ..Default::default()
        };
        MetadataMapper::default().map(&source, &mut target);

        assert_eq!(target.year, Some(1979));
        assert_eq!(target.summary.as_deref(), Some("Existing summary"));
        assert_eq!(target.rating, Some(8.0));
    }

    #[test]
    fn test_collections_are_replaced() {
        let mut target = MetadataRecord::default();
        target.genres.insert("Comedy".to_string());
        target.cast.push(Person {
            name: "Someone Else".to_string(),
            photo: None,
        });

        MetadataMapper::default().map(&record(), &mut target);

        assert!(!target.genres.contains("Comedy"));
        assert_eq!(target.genres.len(), 2);
        assert_eq!(target.cast.len(), 2);
        assert_eq!(target.cast[0].name, "Sigourney Weaver");
    }

    #[test]
    fn test_map_is_idempotent() {
        let mapper = MetadataMapper::default();
        let source = record();

        let mut once = MetadataRecord::default();
        mapper.map(&source, &mut once);

        let mut twice = MetadataRecord::default();
        mapper.map(&source, &mut twice);
        mapper.map(&source, &mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_poster_wins() {
        let mut target = MetadataRecord::default();
        target.posters.insert(
            "http://img.test/original.jpg".to_string(),
            PosterProxy::Preview {
                thumb_url: "http://img.test/original-thumb.jpg".to_string(),
                sort_order: 1,
            },
        );
        let before = target.posters.clone();

        MetadataMapper::default().map(&record(), &mut target);
        assert_eq!(target.posters, before);
    }

    #[test]
    fn test_poster_thumb_falls_back_to_large() {
        let source = SubjectRecord {
            images: Some(Images {
                large: Some("http://img.test/l.jpg".to_string()),
                medium: None,
                small: None,
            }),
            ..Default::default()
        };

        let mut target = MetadataRecord::default();
        MetadataMapper::default().map(&source, &mut target);
        assert_eq!(
            target.posters.get("http://img.test/l.jpg"),
            Some(&PosterProxy::Preview {
                thumb_url: "http://img.test/l.jpg".to_string(),
                sort_order: 1,
            })
        );
    }

    #[test]
    fn test_no_images_no_poster() {
        let mut target = MetadataRecord::default();
        MetadataMapper::default().map(&SubjectRecord::default(), &mut target);
        assert!(target.posters.is_empty());
    }
}

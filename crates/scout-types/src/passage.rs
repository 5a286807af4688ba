//! Source passage type.
//!
//! A passage is one crawled text section attributed to an athlete, already
//! flattened from whatever nested shape the crawler stored it in. Passages
//! are the input of the indexing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw text passage about an athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePassage {
    /// Stable identifier, unique per passage
    pub id: String,

    /// Athlete the passage is attributed to
    pub athlete_name: String,

    /// Crawl topic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Source URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Page title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Passage text (markdown from the crawler)
    pub text: String,

    /// When the passage was scraped
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub scraped_at: DateTime<Utc>,
}

impl SourcePassage {
    pub fn new(
        id: impl Into<String>,
        athlete_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            athlete_name: athlete_name.into(),
            topic: None,
            url: None,
            title: None,
            text: text.into(),
            scraped_at: Utc::now(),
        }
    }

    /// Set the crawl topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_builder() {
        let passage = SourcePassage::new("p-1", "A", "some text")
            .with_topic("season stats")
            .with_url("https://example.com");

        assert_eq!(passage.id, "p-1");
        assert_eq!(passage.topic.as_deref(), Some("season stats"));
        assert!(passage.title.is_none());
    }

    #[test]
    fn test_passage_roundtrip() {
        let passage = SourcePassage::new("p-1", "A", "text").with_title("T");
        let json = serde_json::to_string(&passage).unwrap();
        let parsed: SourcePassage = serde_json::from_str(&json).unwrap();
        assert_eq!(passage.id, parsed.id);
        assert_eq!(passage.title, parsed.title);
    }
}

//! Data model shared between the service crate and its presentation layer.

use serde::{Deserialize, Serialize};

/// Source attribution used when the upstream search result carries no author.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// A social destination content can be generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Unique key, also used to pick the instruction template
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Character budget hint handed to the model; never enforced on the output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Platform {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        max_length: Option<usize>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            max_length,
        }
    }
}

/// Normalized news search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub description: String,
    /// The upstream API only has a publish date; it fills both timestamps.
    pub last_updated: String,
    pub date_created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-platform generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Generating,
    Ready,
    Error,
}

impl ContentStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, ContentStatus::Generating)
    }
}

/// One result card: the generated copy for a single platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub platform: String,
    pub content: String,
    pub status: ContentStatus,
}

impl GeneratedContent {
    /// Placeholder entry published as soon as a cycle starts.
    pub fn generating(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            content: String::new(),
            status: ContentStatus::Generating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let card = GeneratedContent::generating("tiktok");
        let json = serde_json::to_value(&card).expect("serialize");
        assert_eq!(json["status"], "generating");
        assert_eq!(json["content"], "");

        let ready: ContentStatus = serde_json::from_str("\"ready\"").expect("parse");
        assert_eq!(ready, ContentStatus::Ready);
        assert!(ready.is_settled());
        assert!(!ContentStatus::Generating.is_settled());
    }

    #[test]
    fn platform_without_budget_omits_max_length() {
        let platform = Platform::new("mastodon", "Mastodon", "🐘", None);
        let json = serde_json::to_value(&platform).expect("serialize");
        assert!(json.get("max_length").is_none());
    }
}

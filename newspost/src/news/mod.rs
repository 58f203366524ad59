use async_trait::async_trait;
use chrono::NaiveDate;

use common::NewsArticle;

use crate::error::NewsFetchError;

pub mod exa;

/// How far back a search looks, in days.
pub const LOOKBACK_DAYS: i64 = 7;
/// Number of articles requested per search.
pub const RESULT_COUNT: u32 = 3;
/// Raw text is cut to this many characters when nothing better describes an article.
pub const DESCRIPTION_FALLBACK_CHARS: usize = 200;

/// Source of recent news for a keyword.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch the latest articles for `keyword`. All-or-nothing: any failure
    /// discards whatever was received.
    async fn fetch_news(&self, keyword: &str) -> Result<Vec<NewsArticle>, NewsFetchError>;
}

/// Inclusive `(start, end)` publish-date window ending `today`, as `YYYY-MM-DD`.
pub fn lookback_window(today: NaiveDate) -> (String, String) {
    let start = today - chrono::Duration::days(LOOKBACK_DAYS);
    (
        start.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

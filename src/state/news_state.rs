//! News articles and social posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;
use crate::poller::PollResult;

/// A news article from the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Publication time as Unix seconds.
    #[serde(rename = "publishedAt", default)]
    pub published_at: i64,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl NewsItem {
    /// Publication time, when the timestamp is representable.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.published_at, 0)
    }

    /// Relative age such as `"12 min ago"`, `"3 h ago"` or `"2 d ago"`.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(published) = self.published() else {
            return "-".to_string();
        };
        let minutes = (now - published).num_minutes().max(0);
        if minutes < 60 {
            format!("{minutes} min ago")
        } else if minutes < 1440 {
            format!("{} h ago", minutes / 60)
        } else {
            format!("{} d ago", minutes / 1440)
        }
    }
}

/// Engagement counters of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub reply_count: u64,
}

/// A post from the social-media proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    pub text: String,
    #[serde(default, deserialize_with = "de::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metrics: PostMetrics,
}

impl SocialPost {
    /// Link to the post on the originating site.
    pub fn permalink(&self) -> String {
        format!("https://twitter.com/user/status/{}", self.id)
    }
}

/// News tab state.
#[derive(Debug, Default)]
pub struct NewsState {
    pub articles: PollResult<Vec<NewsItem>>,
    pub social: PollResult<Vec<SocialPost>>,
    pub selected_index: Option<usize>,
}

impl NewsState {
    pub fn article_count(&self) -> usize {
        self.articles.data.as_ref().map_or(0, Vec::len)
    }

    pub fn selected(&self) -> Option<&NewsItem> {
        let index = self.selected_index?;
        self.articles.data.as_ref()?.get(index)
    }
}

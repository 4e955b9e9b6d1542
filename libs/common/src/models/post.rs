//! Blog post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::parse_timestamp;
use crate::tags::TagList;
use crate::validation::{Validate, require};

/// Blog post as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "readTime", alias = "read_time", default)]
    pub read_time: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub slug: String,
}

impl Post {
    /// Publication date, when `date` is parseable
    pub fn published_on(&self) -> Option<NaiveDate> {
        parse_timestamp(&self.date).map(|dt| dt.date_naive())
    }

    /// Leading minute count of `read_time` ("5 min" -> 5)
    pub fn read_minutes(&self) -> Option<u32> {
        let digits: String = self
            .read_time
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }

    /// Editable copy of this post
    pub fn to_draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone().unwrap_or_default(),
            category: self.category.clone(),
            tags: TagList::from(self.tags.as_slice()),
            read_time: self.read_time.clone(),
        }
    }
}

/// Create/update payload for a blog post
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: TagList,
    pub read_time: String,
}

impl Validate for PostDraft {
    fn validate(&self) -> Result<(), String> {
        require("Title", &self.title)?;
        require("Category", &self.category)?;
        require("Excerpt", &self.excerpt)?;
        require("Content", &self.content)?;
        require("Read time", &self.read_time)?;
        Ok(())
    }
}

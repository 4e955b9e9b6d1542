//! Contact message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::parse_timestamp;

/// Message left through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub created_at: String,
}

impl Message {
    /// When the message was received, if `created_at` is parseable
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

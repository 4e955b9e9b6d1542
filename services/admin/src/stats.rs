//! Dashboard statistics

use chrono::{DateTime, Datelike, Duration, Utc};
use common::models::{Message, Post, Project};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use crate::resource::Resource;
use crate::session::SessionStore;

/// Collection sizes shown on the dashboard landing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_posts: usize,
    pub total_projects: usize,
    pub total_messages: usize,
}

impl DashboardStats {
    /// Fetch the three collections concurrently; a failed fetch counts as zero
    pub async fn fetch(session: &SessionStore) -> Self {
        let (posts, projects, messages) = tokio::join!(
            count::<Post>(session),
            count::<Project>(session),
            count::<Message>(session),
        );

        Self {
            total_posts: posts,
            total_projects: projects,
            total_messages: messages,
        }
    }
}

async fn count<R: Resource>(session: &SessionStore) -> usize {
    let endpoints = R::endpoints();
    let bearer = if endpoints.list_requires_auth {
        session.credential()
    } else {
        None
    };

    match session
        .client()
        .get_json::<Vec<serde_json::Value>>(endpoints.list, bearer.as_deref())
        .await
    {
        Ok(items) => items.len(),
        Err(e) => {
            warn!("Stats fetch for {}s failed: {}", R::LABEL, e);
            0
        }
    }
}

/// Summary of the blog posts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostStats {
    pub total: usize,
    pub this_month: usize,
    pub distinct_tags: usize,
    /// Rounded mean of the read times, in minutes
    pub average_read_minutes: u32,
}

impl PostStats {
    pub fn compute(posts: &[Post], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let this_month = posts
            .iter()
            .filter_map(Post::published_on)
            .filter(|date| date.year() == today.year() && date.month() == today.month())
            .count();

        let distinct_tags = posts
            .iter()
            .flat_map(|post| post.tags.iter())
            .collect::<HashSet<_>>()
            .len();

        let average_read_minutes = if posts.is_empty() {
            0
        } else {
            let total: u64 = posts
                .iter()
                .map(|post| u64::from(post.read_minutes().unwrap_or(0)))
                .sum();
            (total as f64 / posts.len() as f64).round() as u32
        };

        Self {
            total: posts.len(),
            this_month,
            distinct_tags,
            average_read_minutes,
        }
    }
}

/// Summary of the projects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: usize,
    pub with_demo: usize,
    pub distinct_technologies: usize,
    pub with_github: usize,
}

impl ProjectStats {
    pub fn compute(projects: &[Project]) -> Self {
        Self {
            total: projects.len(),
            with_demo: projects.iter().filter(|p| p.has_demo()).count(),
            distinct_technologies: projects
                .iter()
                .flat_map(|p| p.technologies.iter())
                .collect::<HashSet<_>>()
                .len(),
            with_github: projects.iter().filter(|p| p.has_github()).count(),
        }
    }
}

/// Summary of the contact messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub total: usize,
    /// Received on the current calendar day
    pub today: usize,
    /// Received within the last seven days
    pub this_week: usize,
    /// Distinct sender addresses
    pub senders: usize,
}

impl MessageStats {
    pub fn compute(messages: &[Message], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let stamps: Vec<DateTime<Utc>> =
            messages.iter().filter_map(Message::received_at).collect();

        Self {
            total: messages.len(),
            today: stamps
                .iter()
                .filter(|at| at.date_naive() == now.date_naive())
                .count(),
            this_week: stamps.iter().filter(|at| **at >= week_ago).count(),
            senders: messages
                .iter()
                .map(|m| m.email.trim().to_lowercase())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

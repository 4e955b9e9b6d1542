//! Admin-managed resources
//!
//! Posts, projects and contact messages share one [`ResourceManager`]; each
//! kind only describes its endpoints and which fields are searchable.

use chrono::{DateTime, Utc};
use common::models::{Message, Post, PostDraft, Project, ProjectDraft};
use common::validation::Validate;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

pub mod collection;
pub mod filter;
pub mod manager;

pub use collection::{Collection, Mutation, OpKind, OpStatus, Operation};
pub use filter::{DateRange, Query};
pub use manager::{Phase, ResourceManager};

/// Endpoint set of one resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// Collection endpoint
    pub list: &'static str,
    /// Create endpoint, if the kind can be created
    pub create: Option<&'static str>,
    /// Base of the per-item endpoints (`{item}/{id}`)
    pub item: Option<&'static str>,
    /// Whether listing needs the bearer credential
    pub list_requires_auth: bool,
}

impl Endpoints {
    pub fn update_path(&self, id: i64) -> Option<String> {
        self.item.map(|base| format!("{}/{}", base, id))
    }

    pub fn delete_path(&self, id: i64) -> Option<String> {
        self.item.map(|base| format!("{}/{}", base, id))
    }
}

/// Record type served by the portfolio API
pub trait Resource: Clone + Debug + PartialEq + DeserializeOwned + Send + Sync + 'static {
    /// Singular label used in logs and messages
    const LABEL: &'static str;

    /// Whether the date-range filter applies to this kind
    const DATED: bool = false;

    fn endpoints() -> Endpoints;

    fn id(&self) -> i64;

    /// Fields matched by the text filter
    fn search_fields(&self) -> Vec<&str>;

    /// Timestamp used by the date-range filter and newest-first ordering
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Resource kinds the admin can create and update
pub trait Editable: Resource {
    type Draft: Serialize + Validate + Send + Sync;
}

impl Resource for Post {
    const LABEL: &'static str = "post";

    fn endpoints() -> Endpoints {
        Endpoints {
            list: "/api/posts",
            create: Some("/api/admin/posts"),
            item: Some("/api/admin/posts"),
            list_requires_auth: false,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.category.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

impl Editable for Post {
    type Draft = PostDraft;
}

impl Resource for Project {
    const LABEL: &'static str = "project";

    fn endpoints() -> Endpoints {
        Endpoints {
            list: "/api/projects",
            create: Some("/api/admin/projects"),
            item: Some("/api/admin/projects"),
            list_requires_auth: false,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.technologies.iter().map(String::as_str));
        fields
    }
}

impl Editable for Project {
    type Draft = ProjectDraft;
}

impl Resource for Message {
    const LABEL: &'static str = "message";
    const DATED: bool = true;

    // The API exposes no create or delete endpoint for messages.
    fn endpoints() -> Endpoints {
        Endpoints {
            list: "/api/admin/messages",
            create: None,
            item: None,
            list_requires_auth: true,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.subject.as_str(),
            self.message.as_str(),
        ]
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.received_at()
    }
}

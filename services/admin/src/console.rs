//! Admin console commands
//!
//! Each invocation restores the session, passes it through the gate and then
//! drives the resource managers, mirroring the admin dashboard page.

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use common::models::{Message, Post, PostDraft, Project, ProjectDraft};
use common::tags::TagList;
use common::{ApiError, ApiResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::gate::gate;
use crate::prompt::Prompt;
use crate::resource::{DateRange, Query, ResourceManager};
use crate::session::SessionStore;
use crate::stats::{DashboardStats, MessageStats, PostStats, ProjectStats};

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Portfolio back-office console")]
pub struct Cli {
    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with a credential or a username and password
    Login {
        /// Existing bearer credential
        #[arg(long, conflicts_with_all = ["username", "password"])]
        token: Option<String>,
        #[arg(long, requires = "password")]
        username: Option<String>,
        #[arg(long, requires = "username")]
        password: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// Show collection totals
    Stats,
    /// Manage blog posts
    Posts {
        #[command(subcommand)]
        action: PostAction,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Read contact messages
    Messages {
        #[command(subcommand)]
        action: MessageAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive search text
    #[arg(long, short = 's', default_value = "")]
    pub search: String,
}

#[derive(Args, Debug, Default)]
pub struct PostFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    /// Read time, e.g. "5 min"
    #[arg(long)]
    pub read_time: Option<String>,
}

impl PostFields {
    fn apply(self, draft: &mut PostDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            draft.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(tags) = self.tags {
            draft.tags = TagList::parse(&tags);
        }
        if let Some(read_time) = self.read_time {
            draft.read_time = read_time;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ProjectFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Comma-separated technologies
    #[arg(long)]
    pub technologies: Option<String>,
    #[arg(long)]
    pub github: Option<String>,
    /// Demo link; pass an empty string to clear it
    #[arg(long)]
    pub demo: Option<String>,
}

impl ProjectFields {
    fn apply(self, draft: &mut ProjectDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(technologies) = self.technologies {
            draft.technologies = TagList::parse(&technologies);
        }
        if let Some(github) = self.github {
            draft.github = github;
        }
        if let Some(demo) = self.demo {
            draft.demo = (!demo.trim().is_empty()).then_some(demo);
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PostAction {
    List(ListArgs),
    Create(PostFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: PostFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    List(ListArgs),
    Create(ProjectFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProjectFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum MessageAction {
    List {
        #[command(flatten)]
        args: ListArgs,
        /// all, today, week or month
        #[arg(long, default_value = "all")]
        range: DateRange,
    },
    Delete {
        id: i64,
    },
}

/// Failure already shown to the user through the [`Prompt`]
#[derive(Error, Debug)]
#[error("{0}")]
pub struct Reported(pub ApiError);

fn shown<T>(result: ApiResult<T>) -> Result<T> {
    result.map_err(|e| Reported(e).into())
}

/// Console bound to one session
pub struct Console {
    session: SessionStore,
    prompt: Arc<dyn Prompt>,
}

impl Console {
    pub fn new(session: SessionStore, prompt: Arc<dyn Prompt>) -> Self {
        Self { session, prompt }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login {
                token,
                username,
                password,
            } => self.login(token, username, password).await,
            Command::Logout => {
                self.session.logout();
                self.prompt.acknowledge("Logged out");
                Ok(())
            }
            Command::Whoami => {
                self.require_session()?;
                self.whoami()
            }
            Command::Stats => {
                self.require_session()?;
                self.stats().await;
                Ok(())
            }
            Command::Posts { action } => {
                self.require_session()?;
                self.posts(action).await
            }
            Command::Projects { action } => {
                self.require_session()?;
                self.projects(action).await
            }
            Command::Messages { action } => {
                self.require_session()?;
                self.messages(action).await
            }
        }
    }

    async fn login(
        &self,
        token: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<()> {
        match (token, username, password) {
            (Some(token), _, _) => self.session.login(token).await,
            (None, Some(username), Some(password)) => {
                if let Err(e) = self.session.login_with_password(&username, &password).await {
                    bail!("Login failed: {}", e.user_message());
                }
            }
            _ => bail!("Provide --token, or --username and --password"),
        }

        match self.session.identity() {
            Some(identity) if self.session.is_authenticated() => {
                self.prompt
                    .acknowledge(&format!("Welcome, {}", identity.username));
                Ok(())
            }
            _ => bail!("Login failed: the credential was rejected"),
        }
    }

    fn require_session(&self) -> Result<()> {
        gate(
            &self.session,
            || Err(anyhow!("Session is still loading")),
            || {
                Err(anyhow!(
                    "Access denied: you must log in first (admin login --token <TOKEN>)"
                ))
            },
            |_| Ok(()),
        )
    }

    fn whoami(&self) -> Result<()> {
        let identity = self
            .session
            .identity()
            .ok_or_else(|| anyhow!("No identity resolved"))?;
        println!(
            "{} <{}> (id {}){}",
            identity.username,
            identity.email,
            identity.id,
            if identity.is_admin { ", admin" } else { "" }
        );
        Ok(())
    }

    async fn stats(&self) {
        let stats = DashboardStats::fetch(&self.session).await;
        println!("Posts:    {}", stats.total_posts);
        println!("Projects: {}", stats.total_projects);
        println!("Messages: {}", stats.total_messages);
    }

    fn manager<R: crate::resource::Resource>(&self) -> ResourceManager<R> {
        ResourceManager::new(self.session.clone(), self.prompt.clone())
    }

    async fn posts(&self, action: PostAction) -> Result<()> {
        let manager = self.manager::<Post>();
        match action {
            PostAction::List(args) => {
                shown(manager.list().await)?;
                let posts = manager.filter(&Query::text(args.search));
                for post in &posts {
                    println!(
                        "#{:<4} {:<40} {:<12} {:<10} {}",
                        post.id,
                        post.title,
                        post.category,
                        post.date,
                        post.tags.join(", ")
                    );
                }
                let stats = PostStats::compute(&manager.items(), Utc::now());
                println!(
                    "{} shown, {} total, {} this month, {} tags, ~{} min average",
                    posts.len(),
                    stats.total,
                    stats.this_month,
                    stats.distinct_tags,
                    stats.average_read_minutes
                );
            }
            PostAction::Create(fields) => {
                let mut draft = PostDraft::default();
                fields.apply(&mut draft);
                let post = shown(manager.create(&draft).await)?;
                info!("Created post {}", post.id);
            }
            PostAction::Update { id, fields } => {
                shown(manager.list().await)?;
                let mut draft = manager
                    .get(id)
                    .ok_or_else(|| anyhow!("No post with id {}", id))?
                    .to_draft();
                fields.apply(&mut draft);
                shown(manager.update(id, &draft).await)?;
            }
            PostAction::Delete { id } => {
                shown(manager.delete(id).await)?;
            }
        }
        Ok(())
    }

    async fn projects(&self, action: ProjectAction) -> Result<()> {
        let manager = self.manager::<Project>();
        match action {
            ProjectAction::List(args) => {
                shown(manager.list().await)?;
                let projects = manager.filter(&Query::text(args.search));
                for project in &projects {
                    println!(
                        "#{:<4} {:<30} {:<40} {}",
                        project.id,
                        project.name,
                        project.github,
                        project.technologies.join(", ")
                    );
                }
                let stats = ProjectStats::compute(&manager.items());
                println!(
                    "{} shown, {} total, {} with demo, {} technologies, {} on GitHub",
                    projects.len(),
                    stats.total,
                    stats.with_demo,
                    stats.distinct_technologies,
                    stats.with_github
                );
            }
            ProjectAction::Create(fields) => {
                let mut draft = ProjectDraft::default();
                fields.apply(&mut draft);
                let project = shown(manager.create(&draft).await)?;
                info!("Created project {}", project.id);
            }
            ProjectAction::Update { id, fields } => {
                shown(manager.list().await)?;
                let mut draft = manager
                    .get(id)
                    .ok_or_else(|| anyhow!("No project with id {}", id))?
                    .to_draft();
                fields.apply(&mut draft);
                shown(manager.update(id, &draft).await)?;
            }
            ProjectAction::Delete { id } => {
                shown(manager.delete(id).await)?;
            }
        }
        Ok(())
    }

    async fn messages(&self, action: MessageAction) -> Result<()> {
        let manager = self.manager::<Message>();
        match action {
            MessageAction::List { args, range } => {
                shown(manager.list().await)?;
                let query = Query::text(args.search).with_range(range);
                let messages = manager.filter(&query);
                for message in &messages {
                    println!(
                        "#{:<4} {:<20} {:<30} {:<30} {}",
                        message.id, message.name, message.email, message.subject, message.created_at
                    );
                }
                let stats = MessageStats::compute(&manager.items(), Utc::now());
                println!(
                    "{} shown, {} total, {} today, {} this week, {} senders",
                    messages.len(),
                    stats.total,
                    stats.today,
                    stats.this_week,
                    stats.senders
                );
            }
            MessageAction::Delete { id } => {
                shown(manager.delete(id).await)?;
            }
        }
        Ok(())
    }
}

//! Generic resource manager
//!
//! Keeps a local collection of one resource kind in sync with the API. Every
//! network operation is logged, and its failure is shown to the user through
//! the [`Prompt`]; a rejected mutation leaves the collection untouched.

use chrono::{DateTime, Utc};
use common::validation::Validate;
use common::{ApiClient, ApiError, ApiResult};
use parking_lot::Mutex;
use reqwest::Method;
use std::sync::Arc;
use tracing::{error, info};

use super::collection::{Collection, Mutation, OpKind, OpStatus, Operation, Operations};
use super::filter::{self, Query};
use super::{Editable, Resource};
use crate::prompt::Prompt;
use crate::session::SessionStore;

/// Lifecycle of the manager as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet
    Initial,
    /// A list request is in flight
    Loading,
    /// The collection reflects the last successful list
    Loaded,
    /// The last list request failed
    Failed(String),
}

struct ManagerState<R> {
    phase: Phase,
    collection: Collection<R>,
    operations: Operations,
}

/// Local cache of one resource kind with CRUD against the admin API
pub struct ResourceManager<R: Resource> {
    client: ApiClient,
    session: SessionStore,
    prompt: Arc<dyn Prompt>,
    state: Mutex<ManagerState<R>>,
}

impl<R: Resource> ResourceManager<R> {
    pub fn new(session: SessionStore, prompt: Arc<dyn Prompt>) -> Self {
        Self {
            client: session.client().clone(),
            session,
            prompt,
            state: Mutex::new(ManagerState {
                phase: Phase::Initial,
                collection: Collection::new(),
                operations: Operations::default(),
            }),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase.clone()
    }

    /// Message of the last failed list, if the manager is in `Failed`
    pub fn error(&self) -> Option<String> {
        match &self.state.lock().phase {
            Phase::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn items(&self) -> Vec<R> {
        self.state.lock().collection.items().to_vec()
    }

    pub fn get(&self, id: i64) -> Option<R> {
        self.state.lock().collection.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().collection.is_empty()
    }

    /// Pending and recently finished mutations, oldest first
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().operations.snapshot()
    }

    pub fn pending(&self) -> usize {
        self.state.lock().operations.pending()
    }

    /// Fetch the whole collection, replacing the local copy
    pub async fn list(&self) -> ApiResult<usize> {
        let endpoints = R::endpoints();
        self.state.lock().phase = Phase::Loading;

        let result = match self.list_bearer(endpoints.list_requires_auth) {
            Ok(bearer) => {
                self.client
                    .get_json::<Vec<R>>(endpoints.list, bearer.as_deref())
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(items) => {
                let count = items.len();
                let mut state = self.state.lock();
                state.collection.replace(items);
                state.phase = Phase::Loaded;
                info!("Loaded {} {}s", count, R::LABEL);
                Ok(count)
            }
            Err(e) => {
                error!("Error fetching {}s: {}", R::LABEL, e);
                let message = e.user_message();
                {
                    let mut state = self.state.lock();
                    state.collection.clear();
                    state.phase = Phase::Failed(message.clone());
                }
                self.prompt
                    .acknowledge(&format!("Error: could not load {}s: {}", R::LABEL, message));
                Err(e)
            }
        }
    }

    /// Manual refresh; the only way back into `Loading`
    pub async fn refresh(&self) -> ApiResult<usize> {
        self.list().await
    }

    fn list_bearer(&self, required: bool) -> ApiResult<Option<String>> {
        if required {
            self.session.bearer().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Loaded items matching `query` at `now`; never touches the network
    pub fn filter_at(&self, query: &Query, now: DateTime<Utc>) -> Vec<R> {
        let state = self.state.lock();
        filter::apply(state.collection.items(), query, now)
    }

    /// Loaded items matching `query`
    pub fn filter(&self, query: &Query) -> Vec<R> {
        self.filter_at(query, Utc::now())
    }

    /// Delete `id` after interactive confirmation
    ///
    /// Returns `Ok(false)` when the user declines; no request is made then.
    pub async fn delete(&self, id: i64) -> ApiResult<bool> {
        let Some(path) = R::endpoints().delete_path(id) else {
            let e = ApiError::Unsupported(format!(
                "{}s cannot be deleted through the API",
                R::LABEL
            ));
            error!("Refusing to delete {} {}: {}", R::LABEL, id, e);
            self.prompt.acknowledge(&format!("Error: {}", e.user_message()));
            return Err(e);
        };

        if !self
            .prompt
            .confirm(&format!("Are you sure you want to delete this {}?", R::LABEL))
        {
            info!("Deletion of {} {} cancelled", R::LABEL, id);
            return Ok(false);
        }

        let seq = self.state.lock().operations.begin(OpKind::Delete(id));
        let result = match self.session.bearer() {
            Ok(bearer) => self.client.delete(&path, &bearer).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.settle(seq, Mutation::Deleted(id));
                info!("Deleted {} {}", R::LABEL, id);
                self.prompt
                    .acknowledge(&format!("{} deleted", capitalize(R::LABEL)));
                Ok(true)
            }
            Err(e) => {
                error!("Error deleting {} {}: {}", R::LABEL, id, e);
                self.reject(seq, &e);
                Err(e)
            }
        }
    }

    fn settle(&self, seq: u64, mutation: Mutation<R>) {
        let mut state = self.state.lock();
        state.collection.apply(mutation);
        state.operations.finish(seq, OpStatus::Applied);
    }

    fn reject(&self, seq: u64, e: &ApiError) {
        let message = e.user_message();
        self.state
            .lock()
            .operations
            .finish(seq, OpStatus::Rejected(message.clone()));
        self.prompt.acknowledge(&format!("Error: {}", message));
    }
}

impl<R: Editable> ResourceManager<R> {
    /// Create a record; the server's canonical copy is prepended
    pub async fn create(&self, draft: &R::Draft) -> ApiResult<R> {
        let path = R::endpoints().create.map(str::to_string);
        self.submit(OpKind::Create, Method::POST, path, draft).await
    }

    /// Replace the fields of `id`; the server's canonical copy replaces it in place
    pub async fn update(&self, id: i64, draft: &R::Draft) -> ApiResult<R> {
        let path = R::endpoints().update_path(id);
        self.submit(OpKind::Update(id), Method::PUT, path, draft).await
    }

    async fn submit(
        &self,
        kind: OpKind,
        method: Method,
        path: Option<String>,
        draft: &R::Draft,
    ) -> ApiResult<R> {
        if let Err(message) = draft.validate() {
            self.prompt.acknowledge(&format!("Error: {}", message));
            return Err(ApiError::Validation(message));
        }

        let Some(path) = path else {
            let e = ApiError::Unsupported(format!(
                "{}s cannot be edited through the API",
                R::LABEL
            ));
            self.prompt.acknowledge(&format!("Error: {}", e.user_message()));
            return Err(e);
        };

        let seq = self.state.lock().operations.begin(kind);
        let result = match self.session.bearer() {
            Ok(bearer) => {
                self.client
                    .send_json::<_, R>(method, &path, Some(bearer.as_str()), draft)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(record) => {
                let (mutation, verb) = match kind {
                    OpKind::Create => (Mutation::Created(record.clone()), "created"),
                    _ => (Mutation::Updated(record.clone()), "updated"),
                };
                self.settle(seq, mutation);
                info!("{} {} {}", capitalize(R::LABEL), record.id(), verb);
                self.prompt
                    .acknowledge(&format!("{} {}", capitalize(R::LABEL), verb));
                Ok(record)
            }
            Err(e) => {
                error!("Error saving {}: {}", R::LABEL, e);
                self.reject(seq, &e);
                Err(e)
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

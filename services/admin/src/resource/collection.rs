//! Local collection and mutation bookkeeping
//!
//! The local collection is a cache of server state. Mutations are applied
//! only once the server has confirmed them, as plain reducer steps, so
//! ordering and failure handling can be exercised without any network.

use std::collections::VecDeque;

use super::Resource;

/// Number of finished operations kept for inspection
const HISTORY: usize = 32;

/// Server-confirmed change to splice into the collection
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<R> {
    /// Canonical record returned by a create; goes first
    Created(R),
    /// Canonical record returned by an update; replaces in place
    Updated(R),
    /// Identifier removed by a delete
    Deleted(i64),
}

/// Ordered local copy of a server collection
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<R> {
    items: Vec<R>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: Resource> Collection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<R>) -> Self {
        Self { items }
    }

    /// Replace everything with a freshly listed collection
    pub fn replace(&mut self, items: Vec<R>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply a confirmed mutation; returns whether the collection changed
    pub fn apply(&mut self, mutation: Mutation<R>) -> bool {
        match mutation {
            Mutation::Created(record) => {
                let id = record.id();
                self.items.retain(|item| item.id() != id);
                self.items.insert(0, record);
                true
            }
            Mutation::Updated(record) => {
                let id = record.id();
                match self.items.iter_mut().find(|item| item.id() == id) {
                    Some(slot) => {
                        *slot = record;
                        true
                    }
                    None => false,
                }
            }
            Mutation::Deleted(id) => {
                let before = self.items.len();
                self.items.retain(|item| item.id() != id);
                self.items.len() != before
            }
        }
    }
}

/// Kind of a mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Update(i64),
    Delete(i64),
}

/// Progress of a mutation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpStatus {
    Pending,
    Applied,
    Rejected(String),
}

/// One mutation request and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub seq: u64,
    pub kind: OpKind,
    pub status: OpStatus,
}

/// Pending and recently finished mutation requests
#[derive(Debug, Default)]
pub(crate) struct Operations {
    next_seq: u64,
    entries: VecDeque<Operation>,
}

impl Operations {
    /// Record a new pending request
    pub(crate) fn begin(&mut self, kind: OpKind) -> u64 {
        self.next_seq += 1;
        self.entries.push_back(Operation {
            seq: self.next_seq,
            kind,
            status: OpStatus::Pending,
        });
        self.next_seq
    }

    /// Settle a pending request and prune old finished ones
    pub(crate) fn finish(&mut self, seq: u64, status: OpStatus) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.seq == seq) {
            entry.status = status;
        }

        let mut finished = self
            .entries
            .iter()
            .filter(|entry| entry.status != OpStatus::Pending)
            .count();
        while finished > HISTORY {
            let Some(pos) = self
                .entries
                .iter()
                .position(|entry| entry.status != OpStatus::Pending)
            else {
                break;
            };
            self.entries.remove(pos);
            finished -= 1;
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Operation> {
        self.entries.iter().cloned().collect()
    }

    pub(crate) fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == OpStatus::Pending)
            .count()
    }
}

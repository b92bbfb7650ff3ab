//! Ambient write-transaction context
//!
//! The storage layer only asks whether a transaction is active and, if so,
//! which one. Commit and rollback orchestration live elsewhere.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::thread::{self, ThreadId};

/// Numeric identifier of an in-flight transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub u64);

impl Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Answers "is a transaction active, and which one"
pub trait TransactionContext: Send + Sync {
    /// Identifier of the transaction visible to the caller, if any
    fn current(&self) -> Option<TransactionId>;

    fn is_active(&self) -> bool {
        self.current().is_some()
    }
}

/// Context for hosts without transactions
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTransaction;

impl TransactionContext for NoTransaction {
    fn current(&self) -> Option<TransactionId> {
        None
    }
}

/// A single current transaction visible to every thread
#[derive(Debug, Default)]
pub struct SharedTransactionContext {
    current: RwLock<Option<TransactionId>>,
}

impl SharedTransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` the active transaction, returning the one it replaced
    pub fn begin(&self, id: TransactionId) -> Option<TransactionId> {
        self.current.write().replace(id)
    }

    /// Clear the active transaction
    pub fn end(&self) -> Option<TransactionId> {
        self.current.write().take()
    }
}

impl TransactionContext for SharedTransactionContext {
    fn current(&self) -> Option<TransactionId> {
        *self.current.read()
    }
}

/// Transactions bound to the thread that began them
///
/// Bindings live in the instance rather than a thread-local static so
/// several independent contexts can coexist in one process.
#[derive(Debug, Default)]
pub struct ThreadTransactionContext {
    bindings: DashMap<ThreadId, TransactionId>,
}

impl ThreadTransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to the calling thread
    pub fn begin(&self, id: TransactionId) -> Option<TransactionId> {
        self.bindings.insert(thread::current().id(), id)
    }

    /// Unbind the calling thread's transaction
    pub fn end(&self) -> Option<TransactionId> {
        self.bindings
            .remove(&thread::current().id())
            .map(|(_, id)| id)
    }

    /// Number of threads currently inside a transaction
    pub fn active_threads(&self) -> usize {
        self.bindings.len()
    }
}

impl TransactionContext for ThreadTransactionContext {
    fn current(&self) -> Option<TransactionId> {
        self.bindings
            .get(&thread::current().id())
            .map(|entry| *entry.value())
    }
}

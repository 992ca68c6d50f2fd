// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered, heterogeneous keyed container threaded through a workflow.
//!
//! Keys are strings; values carry a runtime type tag. Insertion order is
//! preserved for iteration, and duplicate keys replace the prior value.
//! When created with `thread_safe = true`, a single lock guards all ops
//! so a bag can be shared across worker-pool jobs.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::bitset::Bitset;

/// Runtime type tag for a bag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
    Int,
    UInt,
    String,
    Bool,
    Json,
    Deque,
    Bitset,
    Double,
}

/// A value stored in the context bag.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    UInt(u64),
    String(String),
    Bool(bool),
    Json(serde_json::Value),
    Deque(VecDeque<serde_json::Value>),
    Bitset(Bitset),
    Double(f64),
}

impl Value {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Int(_) => ValueTag::Int,
            Value::UInt(_) => ValueTag::UInt,
            Value::String(_) => ValueTag::String,
            Value::Bool(_) => ValueTag::Bool,
            Value::Json(_) => ValueTag::Json,
            Value::Deque(_) => ValueTag::Deque,
            Value::Bitset(_) => ValueTag::Bitset,
            Value::Double(_) => ValueTag::Double,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_deque(&self) -> Option<&VecDeque<serde_json::Value>> {
        match self {
            Value::Deque(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_deque_mut(&mut self) -> Option<&mut VecDeque<serde_json::Value>> {
        match self {
            Value::Deque(d) => Some(d),
            _ => None,
        }
    }
}

enum Storage {
    Plain(IndexMap<String, Value>),
    Locked(Arc<Mutex<IndexMap<String, Value>>>),
}

/// An ordered keyed container passed through a workflow.
pub struct Bag {
    storage: Storage,
}

impl Clone for Bag {
    /// For a thread-safe bag, clones share the same underlying map (the
    /// clone is a new handle, not a snapshot) so worker jobs can append to
    /// `failed`/`all` deques concurrently. A non-thread-safe bag is deep
    /// copied.
    fn clone(&self) -> Self {
        match &self.storage {
            Storage::Plain(map) => Bag {
                storage: Storage::Plain(map.clone()),
            },
            Storage::Locked(map) => Bag {
                storage: Storage::Locked(Arc::clone(map)),
            },
        }
    }
}

impl Bag {
    /// Create a new bag. When `thread_safe` is true, all operations go
    /// through a single mutex so the bag can be shared across worker
    /// threads.
    pub fn new(thread_safe: bool) -> Self {
        let storage = if thread_safe {
            Storage::Locked(Arc::new(Mutex::new(IndexMap::new())))
        } else {
            Storage::Plain(IndexMap::new())
        };
        Self { storage }
    }

    pub fn is_thread_safe(&self) -> bool {
        matches!(self.storage, Storage::Locked(_))
    }

    /// Insert or replace a value under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match &mut self.storage {
            Storage::Plain(map) => {
                map.insert(key, value);
            }
            Storage::Locked(map) => {
                map.lock().insert(key, value);
            }
        }
    }

    /// Fetch a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        match &self.storage {
            Storage::Plain(map) => map.get(key).cloned(),
            Storage::Locked(map) => map.lock().get(key).cloned(),
        }
    }

    /// Run `f` with mutable access to the value stored under `key`, if any.
    ///
    /// Useful for appending to a `Deque` value without cloning it out and
    /// back in, which matters for thread-safe bags shared across worker jobs.
    pub fn with_mut<R>(&self, key: &str, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        match &self.storage {
            Storage::Plain(_) => {
                // Plain bags are only ever accessed from a single owner;
                // callers needing with_mut on a plain bag should use get/add.
                None
            }
            Storage::Locked(map) => {
                let mut guard = map.lock();
                guard.get_mut(key).map(f)
            }
        }
    }

    /// Keys in insertion order.
    pub fn list(&self) -> Vec<String> {
        match &self.storage {
            Storage::Plain(map) => map.keys().cloned().collect(),
            Storage::Locked(map) => map.lock().keys().cloned().collect(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Plain(map) => map.len(),
            Storage::Locked(map) => map.lock().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "bag_tests.rs"]
mod tests;

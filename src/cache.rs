//! Caller-owned result cache keyed by a fingerprint of the serialized request.
//!
//! Sound only because both engines are deterministic given their inputs. The
//! projection fingerprint also covers the `as_of` month, since it decides
//! which observations exist. Failed runs are never stored.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, AppError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| AppError::config("cache", format!("request not serializable: {e}")))?;
        let mut h = DefaultHasher::new();
        bytes.hash(&mut h);
        Ok(Self(h.finish()))
    }
}

#[derive(Debug)]
pub struct ResultCache<R> {
    entries: HashMap<Fingerprint, R>,
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<R: Clone> ResultCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached result for `key`, or run `compute` and keep its success.
    pub fn get_or_try_insert<F>(&mut self, key: Fingerprint, compute: F) -> Result<R, AppError>
    where
        F: FnOnce() -> Result<R, AppError>,
    {
        if let Some(hit) = self.entries.get(&key) {
            debug!(?key, "cache hit");
            return Ok(hit.clone());
        }
        let value = compute()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }
}

//! Path parameters and the buffer pool they are drawn from.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// The key under which the registered pattern of the matched route is stored
/// when [`Router::save_matched_route_path`](crate::Router::save_matched_route_path)
/// is enabled.
pub const MATCHED_ROUTE_PATH: &str = "$matchedRoutePath";

/// A single URL parameter, consisting of a key and a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The parameters captured by a route match, in the order they appear in the
/// registered pattern.
///
/// ```rust
/// use trie_router::{Param, Params};
///
/// let mut params = Params::new();
/// params.push("user", "gordon");
/// assert_eq!(params.get("user"), Some("gordon"));
/// assert_eq!(params[0], Param::new("user", "gordon"));
/// ```
///
/// Params handed out by a [`Router`](crate::Router) borrow their storage from
/// a pool shared by all requests; the storage is returned when the value is
/// dropped. Cloning yields an independent copy that is not pooled.
#[derive(Default)]
pub struct Params {
    inner: Vec<Param>,
    pool: Option<Arc<ParamsPool>>,
}

impl Params {
    /// Creates an empty, unpooled set of parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the first parameter registered under `key`.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.inner
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value.as_str())
    }

    /// Returns the pattern of the route that matched, if it was saved.
    pub fn matched_route_path(&self) -> Option<&str> {
        self.get(MATCHED_ROUTE_PATH)
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.push(Param::new(key, value));
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<Param> {
        &mut self.inner
    }
}

impl Deref for Params {
    type Target = [Param];

    fn deref(&self) -> &[Param] {
        &self.inner
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl Clone for Params {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            pool: None,
        }
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Params {}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.iter()).finish()
    }
}

impl From<Vec<Param>> for Params {
    fn from(inner: Vec<Param>) -> Self {
        Self { inner, pool: None }
    }
}

impl Drop for Params {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.put(std::mem::take(&mut self.inner));
        }
    }
}

/// A bounded free list of parameter buffers.
///
/// Each buffer is owned by exactly one [`Params`] between `get` and the drop
/// that hands it back, so concurrent requests never observe each other's
/// values.
pub(crate) struct ParamsPool {
    free: Mutex<Vec<Vec<Param>>>,
    max_params: AtomicUsize,
    capacity: usize,
}

impl ParamsPool {
    pub(crate) const DEFAULT_CAPACITY: usize = 256;

    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_params: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Raises the number of slots reserved in every buffer.
    pub(crate) fn reserve(&self, params: usize) {
        self.max_params.fetch_max(params, Ordering::Relaxed);
    }

    pub(crate) fn max_params(&self) -> usize {
        self.max_params.load(Ordering::Relaxed)
    }

    /// Borrows an empty buffer. Routes without parameters skip the pool.
    pub(crate) fn get(self: &Arc<Self>) -> Params {
        let max_params = self.max_params();
        if max_params == 0 {
            return Params::new();
        }

        let mut inner = self.free.lock().pop().unwrap_or_default();
        inner.clear();
        inner.reserve(max_params);

        Params {
            inner,
            pool: Some(Arc::clone(self)),
        }
    }

    fn put(&self, mut buffer: Vec<Param>) {
        buffer.clear();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(buffer);
        }
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

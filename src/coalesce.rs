//! Request coalescing: concurrent callers asking for the same key share one
//! in-flight future and observe the same outcome.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

pub struct Coalescer<K, V>
where
    V: Clone,
{
    in_flight: Mutex<HashMap<K, Shared<BoxFuture<'static, V>>>>,
}

impl<K, V> Default for Coalescer<K, V>
where
    V: Clone,
{
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Coalescer<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the in-flight future for `key`, starting `start()` only if
    /// nothing is pending. The boolean is true when this call started it.
    pub fn join<F, Fut>(&self, key: K, start: F) -> (Shared<BoxFuture<'static, V>>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pending) = in_flight.get(&key) {
            return (pending.clone(), false);
        }
        let shared = start().boxed().shared();
        in_flight.insert(key, shared.clone());
        (shared, true)
    }

    pub fn forget<'a, I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            in_flight.remove(key);
        }
    }

    pub fn pending(&self) -> usize {
        self.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }
}

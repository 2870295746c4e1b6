//! Free list of small array buffers reused by the decoder.
//!
//! Decoding many small arrays allocates a `Vec` per array. A pool keeps
//! released buffers around so the next decode can reuse them. Pooling never
//! changes decoded values; it only changes where their storage comes from.

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;
use parking_lot::Mutex;

use crate::limits::{POOL_MAX_RETAINED, POOLED_ARRAY_LEN};
use crate::model::Value;

/// Shared free list of array buffers with capacity for
/// [`POOLED_ARRAY_LEN`] elements.
///
/// Safe to share between threads; acquire and release take a short lock.
#[derive(Debug)]
pub struct ArrayPool {
    free: Mutex<Vec<Vec<Value>>>,
    max_retained: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Acquires served from the free list.
    pub hits: usize,
    /// Small acquires that had to allocate.
    pub misses: usize,
    /// Buffers currently in the free list.
    pub retained: usize,
}

impl Default for ArrayPool {
    fn default() -> Self {
        Self::new(POOL_MAX_RETAINED)
    }
}

impl ArrayPool {
    /// Creates a pool that keeps at most `max_retained` free buffers.
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_retained,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Returns an empty array able to hold `len` elements without growing.
    ///
    /// Requests up to [`POOLED_ARRAY_LEN`] are served from the free list when
    /// possible; larger requests always allocate.
    pub fn acquire(&self, len: usize) -> Vec<Value> {
        if len > POOLED_ARRAY_LEN {
            return Vec::with_capacity(len);
        }
        let reused = self.free.lock().pop();
        match reused {
            Some(array) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                array
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!("array pool miss (len {})", len);
                Vec::with_capacity(POOLED_ARRAY_LEN)
            }
        }
    }

    /// Gives an array back to the pool.
    ///
    /// Nested arrays inside its elements are released too. Buffers whose
    /// capacity is outside the pooled size class are dropped.
    pub fn release(&self, mut array: Vec<Value>) {
        for item in array.drain(..) {
            self.reclaim(item);
        }
        let capacity = array.capacity();
        if !(POOLED_ARRAY_LEN..=2 * POOLED_ARRAY_LEN).contains(&capacity) {
            return;
        }
        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(array);
        }
    }

    /// Releases every array reachable from `value`.
    pub fn reclaim(&self, value: Value) {
        match value {
            Value::Array(items) => self.release(items),
            Value::Map(map) => {
                for (_, v) in map {
                    self.reclaim(v);
                }
            }
            _ => {}
        }
    }

    /// Returns the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            retained: self.free.lock().len(),
        }
    }
}

/// A decoded value whose arrays go back to a pool when it is dropped.
#[derive(Debug)]
pub struct Pooled<'p> {
    value: Option<Value>,
    pool: Option<&'p ArrayPool>,
}

impl<'p> Pooled<'p> {
    pub(crate) fn new(value: Value, pool: Option<&'p ArrayPool>) -> Self {
        Self {
            value: Some(value),
            pool,
        }
    }

    /// Detaches the value; its arrays will not return to the pool.
    pub fn into_inner(mut self) -> Value {
        self.value.take().unwrap_or_default()
    }
}

impl Deref for Pooled<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        static NIL: Value = Value::Nil;
        // Only `into_inner` and `drop` take the value, and both consume the guard.
        self.value.as_ref().unwrap_or(&NIL)
    }
}

impl Drop for Pooled<'_> {
    fn drop(&mut self) {
        if let (Some(value), Some(pool)) = (self.value.take(), self.pool) {
            pool.reclaim(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_small_arrays_are_reused() {
        let pool = ArrayPool::default();
        let mut a = pool.acquire(3);
        assert!(a.capacity() >= POOLED_ARRAY_LEN);
        a.push(Value::Int(1));
        pool.release(a);
        assert_eq!(pool.stats().retained, 1);

        let b = pool.acquire(10);
        assert!(b.is_empty());
        assert_eq!(pool.stats(), PoolStats { hits: 1, misses: 1, retained: 0 });
    }

    #[test]
    fn test_large_arrays_bypass_pool() {
        let pool = ArrayPool::default();
        let big = pool.acquire(100);
        assert!(big.capacity() >= 100);
        pool.release(big);
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn test_retention_cap() {
        let pool = ArrayPool::new(2);
        for _ in 0..5 {
            pool.release(Vec::with_capacity(POOLED_ARRAY_LEN));
        }
        assert_eq!(pool.stats().retained, 2);
    }

    #[test]
    fn test_reclaim_walks_nested_values() {
        let pool = ArrayPool::default();
        let inner = Value::Array(Vec::with_capacity(POOLED_ARRAY_LEN));
        let map: Value = [("k", inner)].into_iter().collect();
        let mut outer = Vec::with_capacity(POOLED_ARRAY_LEN);
        outer.push(map);
        pool.reclaim(Value::Array(outer));
        assert_eq!(pool.stats().retained, 2);
    }

    #[test]
    fn test_guard_returns_on_drop() {
        let pool = ArrayPool::default();
        {
            let guard = Pooled::new(Value::Array(pool.acquire(2)), Some(&pool));
            assert_eq!(*guard, Value::Array(vec![]));
        }
        assert_eq!(pool.stats().retained, 1);

        let guard = Pooled::new(Value::Array(pool.acquire(2)), Some(&pool));
        let detached = guard.into_inner();
        assert_eq!(pool.stats().retained, 0);
        drop(detached);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(ArrayPool::new(64));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..1000 {
                        let mut a = pool.acquire(i % 16);
                        a.push(Value::Int(i as i64));
                        pool.release(a);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let stats = pool.stats();
        assert!(stats.retained <= 64);
        assert_eq!(stats.hits + stats.misses, 8 * 1000);
    }
}

//! Per-wrapper value cache
//!
//! A `VariableCache` remembers the parsed value of its core together with
//! the modification counter it was parsed from. Reads compare that snapshot
//! against the core's live counter and only reparse when they differ.
//!
//! A validated read takes no lock: the value is published through an
//! `ArcSwap`, and only a reload serializes on the cache's reload lock.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, ReentrantMutex};

use super::codec::ValueCodec;
use super::registry::CONFIG;
use super::variable_core::VariableCore;
use crate::error::ParseResult;
use crate::knobs_warning;

/// Counter value meaning "never loaded"
const NEVER_LOADED: u64 = u64::MAX;

/// Lock serializing reloads of one cache
pub trait ReloadLock: Default + Send + Sync + 'static {
    /// Run `reload` under the lock
    ///
    /// If the lock is already held by the current thread for a reload,
    /// implementations that permit re-entry run `reentered` instead.
    fn run<R>(&self, reload: impl FnOnce() -> R, reentered: impl FnOnce() -> R) -> R;
}

/// Non-reentrant reload lock
#[derive(Default)]
pub struct PlainReloadLock(Mutex<()>);

impl ReloadLock for PlainReloadLock {
    fn run<R>(&self, reload: impl FnOnce() -> R, _reentered: impl FnOnce() -> R) -> R {
        let _guard = self.0.lock();
        reload()
    }
}

/// Reentrant reload lock
///
/// A nested read of the same cache on the reloading thread gets the
/// previously published value instead of recursing into another reload.
#[derive(Default)]
pub struct ReentrantReloadLock(ReentrantMutex<Cell<bool>>);

/// Clears the "reloading" mark even if the reload unwinds
struct ReloadingMark<'a>(&'a Cell<bool>);

impl Drop for ReloadingMark<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ReloadLock for ReentrantReloadLock {
    fn run<R>(&self, reload: impl FnOnce() -> R, reentered: impl FnOnce() -> R) -> R {
        let guard = self.0.lock();
        if guard.get() {
            return reentered();
        }
        guard.set(true);
        let _mark = ReloadingMark(&guard);
        reload()
    }
}

/// Cached parsed value of one core, private to one wrapper instance
pub struct VariableCache<C: ValueCodec> {
    core: &'static VariableCore,
    /// Counter value the cached value was parsed from
    local_modified: AtomicU64,
    cached: ArcSwap<C::Value>,
    lock: C::Lock,
    reloads: AtomicU64,
}

impl<C: ValueCodec> VariableCache<C> {
    /// Create an empty cache bound to `core`
    ///
    /// Does no parsing; the first read loads the value.
    pub fn new(core: &'static VariableCore) -> Self {
        Self {
            core,
            local_modified: AtomicU64::new(NEVER_LOADED),
            cached: ArcSwap::from_pointee(C::zero()),
            lock: C::Lock::default(),
            reloads: AtomicU64::new(0),
        }
    }

    /// The bound core
    pub fn core(&self) -> &'static VariableCore {
        self.core
    }

    /// Check if the cached value matches the core's current counter
    pub fn is_valid(&self) -> bool {
        self.local_modified.load(Ordering::Acquire) == self.core.modified()
    }

    /// Counter value the cached value was parsed from, `None` before the
    /// first read
    pub fn local_modified(&self) -> Option<u64> {
        match self.local_modified.load(Ordering::Acquire) {
            NEVER_LOADED => None,
            counter => Some(counter),
        }
    }

    /// Number of times this cache has parsed its core's words
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Current value, reparsing only if the core changed since the last read
    pub fn get(&self) -> C::Value {
        if self.is_valid() {
            return self.published();
        }
        self.reload()
    }

    /// Last published value
    fn published(&self) -> C::Value {
        <C::Value as Clone>::clone(&self.cached.load())
    }

    fn reload(&self) -> C::Value {
        self.lock.run(
            || {
                // Another thread may have reloaded while we waited
                if self.is_valid() {
                    return self.published();
                }

                let (words, counter) = self.core.snapshot();
                self.reloads.fetch_add(1, Ordering::Relaxed);

                let value = match C::parse_words(&words) {
                    Ok(value) => value,
                    Err(err) => {
                        knobs_warning!(
                            CONFIG,
                            "{}: {}, keeping previous value",
                            self.core.name(),
                            err
                        );
                        self.published()
                    }
                };

                // Publish the value before the counter so a reader that sees
                // the new counter also sees the new value
                self.cached.store(Arc::new(value.clone()));
                self.local_modified.store(counter, Ordering::Release);
                value
            },
            || self.published(),
        )
    }

    /// Parse the core's current words without touching the cache
    pub fn try_get(&self) -> ParseResult<C::Value> {
        C::parse_words(&self.core.words())
    }
}

impl<C: ValueCodec> std::fmt::Debug for VariableCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableCache")
            .field("variable", &self.core.name())
            .field("local_modified", &self.local_modified())
            .field("reloads", &self.reload_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::codec::{BoolCodec, IntCodec};
    use crate::variables::registry::get_or_create;
    use std::sync::atomic::AtomicU64;

    static TEST_NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_name(prefix: &str) -> String {
        format!(
            "{}-cache-{}",
            prefix,
            TEST_NAME_COUNTER.fetch_add(1, Ordering::Relaxed)
        )
    }

    #[test]
    fn test_construction_does_not_parse() {
        let cache = VariableCache::<IntCodec>::new(get_or_create(&unique_name("lazy")));
        assert_eq!(cache.reload_count(), 0);
        assert_eq!(cache.local_modified(), None);
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_repeated_reads_parse_once() {
        let core = get_or_create(&unique_name("once"));
        core.set_value(vec!["12".to_string()]);
        let cache = VariableCache::<IntCodec>::new(core);

        assert_eq!(cache.get(), 12);
        let snapshot = cache.local_modified();
        for _ in 0..10 {
            assert_eq!(cache.get(), 12);
        }
        assert_eq!(cache.reload_count(), 1);
        assert_eq!(cache.local_modified(), snapshot);
    }

    #[test]
    fn test_write_invalidates() {
        let core = get_or_create(&unique_name("invalidate"));
        let cache = VariableCache::<IntCodec>::new(core);
        assert_eq!(cache.get(), 0);

        core.set_value(vec!["4".to_string()]);
        assert!(!cache.is_valid());
        assert_eq!(cache.get(), 4);
        assert_eq!(cache.reload_count(), 2);
    }

    #[test]
    fn test_malformed_keeps_previous() {
        let core = get_or_create(&unique_name("malformed"));
        core.set_value(vec!["8".to_string()]);
        let cache = VariableCache::<IntCodec>::new(core);
        assert_eq!(cache.get(), 8);

        core.set_value(vec!["eight".to_string()]);
        assert_eq!(cache.get(), 8);
        assert!(cache.try_get().is_err());

        // The failed parse is remembered, not retried on every read
        let reloads = cache.reload_count();
        assert_eq!(cache.get(), 8);
        assert_eq!(cache.reload_count(), reloads);
    }

    #[test]
    fn test_malformed_first_read_is_zero() {
        let core = get_or_create(&unique_name("malformed-first"));
        core.set_value(vec!["perhaps".to_string()]);
        let cache = VariableCache::<BoolCodec>::new(core);
        assert!(!cache.get());
    }

    #[test]
    fn test_caches_are_independent() {
        let core = get_or_create(&unique_name("independent"));
        core.set_value(vec!["1".to_string()]);
        let a = VariableCache::<IntCodec>::new(core);
        let b = VariableCache::<IntCodec>::new(core);

        assert_eq!(a.get(), 1);
        assert_eq!(b.reload_count(), 0);
        assert_eq!(b.get(), 1);
        assert_eq!(a.reload_count(), 1);
        assert_eq!(b.reload_count(), 1);
    }

    #[test]
    fn test_validated_read_skips_reload_lock() {
        use std::sync::mpsc;
        use std::time::Duration;

        let core = get_or_create(&unique_name("lock-free"));
        core.set_value(vec!["6".to_string()]);
        let cache = VariableCache::<IntCodec>::new(core);
        assert_eq!(cache.get(), 6);

        // Another thread reads while this one holds the reload lock
        let (tx, rx) = mpsc::channel();
        std::thread::scope(|scope| {
            cache.lock.run(
                || {
                    let cache = &cache;
                    scope.spawn(move || tx.send(cache.get()));
                    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(6));
                },
                || unreachable!(),
            );
        });
        assert_eq!(cache.reload_count(), 1);
    }

    #[test]
    fn test_reentrant_lock_runs_fallback_on_reentry() {
        let lock = ReentrantReloadLock::default();
        let result = lock.run(|| lock.run(|| "nested reload", || "reentered"), || "outer");
        assert_eq!(result, "reentered");

        // The mark is cleared once the outer reload finishes
        assert_eq!(lock.run(|| "reload", || "reentered"), "reload");
    }

    #[test]
    fn test_plain_lock_runs_reload() {
        let lock = PlainReloadLock::default();
        assert_eq!(lock.run(|| 1, || 2), 1);
    }
}

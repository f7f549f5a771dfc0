//! Bounded-age cache for upstream responses.
//!
//! Every gateway keeps its responses in a `moka` cache configured with a
//! time-to-live and an entry cap. Gateways read through `try_get_with`,
//! which merges concurrent misses on one key into a single upstream fetch
//! and never stores an error, so a failed fetch is retried on the next call.

use moka::sync::Cache;
use std::hash::Hash;
use std::time::Duration;

pub type TtlCache<K, V> = Cache<K, V>;

/// Cache whose entries expire `ttl` after insertion and which holds at
/// most `max_entries` values.
pub fn ttl_cache<K, V>(ttl: Duration, max_entries: u64) -> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(max_entries.max(1))
        .time_to_live(ttl)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn ok_fetch(counter: &AtomicUsize, value: u32) -> impl FnOnce() -> Result<u32, String> + '_ {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }
    }

    #[test]
    fn test_hit_within_ttl_does_not_fetch() {
        let cache = ttl_cache(Duration::from_secs(360), 10);
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.try_get_with("current", ok_fetch(&calls, 1)), Ok(1));
        assert_eq!(cache.try_get_with("current", ok_fetch(&calls, 2)), Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = ttl_cache(Duration::from_millis(50), 10);
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.try_get_with("current", ok_fetch(&calls, 1)), Ok(1));
        thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.try_get_with("current", ok_fetch(&calls, 2)), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache: TtlCache<&str, u32> = ttl_cache(Duration::from_secs(60), 10);

        let err = cache.try_get_with("k", || Err::<u32, _>("HTTP error: 503".to_string()));
        assert_eq!(err.unwrap_err().as_str(), "HTTP error: 503");
        assert!(cache.get(&"k").is_none());

        let calls = AtomicUsize::new(0);
        assert_eq!(cache.try_get_with("k", ok_fetch(&calls, 7)), Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1, "retry after failure must fetch");
    }

    #[test]
    fn test_expired_value_does_not_mask_failed_refresh() {
        let cache: TtlCache<&str, u32> = ttl_cache(Duration::from_millis(50), 10);
        cache.try_get_with("k", || Ok::<_, String>(1)).unwrap();

        thread::sleep(Duration::from_millis(120));
        let res = cache.try_get_with("k", || Err::<u32, _>("timeout".to_string()));
        assert!(res.is_err(), "an expired entry must not be served after a failed refresh");
    }

    #[test]
    fn test_distinct_keys_are_cached_independently() {
        let cache = ttl_cache(Duration::from_secs(60), 10);
        let calls = AtomicUsize::new(0);
        cache.try_get_with("a", ok_fetch(&calls, 1)).unwrap();
        cache.try_get_with("b", ok_fetch(&calls, 2)).unwrap();
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = ttl_cache(Duration::from_secs(86_400), 3);
        for i in 0..10u32 {
            cache.try_get_with(i, || Ok::<_, String>(i)).unwrap();
        }
        cache.run_pending_tasks();
        assert!(cache.entry_count() <= 3, "cache grew to {}", cache.entry_count());
    }

    #[test]
    fn test_panicking_fetches_do_not_grow_cache() {
        let cache: TtlCache<u32, u32> = ttl_cache(Duration::from_secs(86_400), 2);

        for i in 0..10u32 {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                cache.try_get_with(i, || -> Result<u32, String> { panic!("decoder blew up on key {}", i) })
            }));
            assert!(outcome.is_err(), "fetch for key {} should have panicked", i);
        }
        for i in 100..105u32 {
            assert_eq!(cache.try_get_with(i, || Ok::<_, String>(i)), Ok(i));
        }

        cache.run_pending_tasks();
        assert!(
            cache.entry_count() <= 2,
            "cache grew to {} with max_entries 2",
            cache.entry_count()
        );
        for i in 0..10u32 {
            assert!(cache.get(&i).is_none(), "panicked key {} left a value behind", i);
        }
    }

    #[test]
    fn test_key_is_usable_after_panicking_fetch() {
        let cache: TtlCache<&str, u32> = ttl_cache(Duration::from_secs(60), 10);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            cache.try_get_with("nws_forecast", || -> Result<u32, String> { panic!("boom") })
        }));

        let calls = AtomicUsize::new(0);
        assert_eq!(cache.try_get_with("nws_forecast", ok_fetch(&calls, 9)), Ok(9));
        assert_eq!(cache.try_get_with("nws_forecast", ok_fetch(&calls, 10)), Ok(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_misses_on_same_key_fetch_once() {
        let cache = ttl_cache(Duration::from_secs(60), 10);
        let calls = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let v = cache
                        .try_get_with("nws_forecast", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok::<_, String>(42u32)
                        })
                        .unwrap();
                    assert_eq!(v, 42);
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

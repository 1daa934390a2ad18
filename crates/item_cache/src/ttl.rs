use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How long the storage quota line is reused before asking the drive again.
pub const STORAGE_QUOTA_TTL: Duration = Duration::from_secs(240);

/// Values that expire a fixed time after they were stored.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn set(&self, key: &str, value: V) {
        self.set_at(key, value, Instant::now());
    }

    /// Cached value, or the result of `load` stored for the next `ttl`. Errors are not cached.
    pub fn get_or_try_insert_with<F, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = load()?;
        self.set(key, value.clone());
        Ok(value)
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((stored_at, value)) if now.saturating_duration_since(*stored_at) < self.ttl => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set_at(&self, key: &str, value: V, now: Instant) {
        self.lock().insert(key.to_string(), (now, value));
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, V)>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::TtlCache;

    #[test]
    fn values_expire_after_the_ttl() {
        let cache = TtlCache::new(Duration::from_secs(240));
        let start = Instant::now();
        cache.set_at("quota", "Used 1.00 GB of 15.00 GB".to_string(), start);

        assert_eq!(
            cache.get_at("quota", start + Duration::from_secs(239)).as_deref(),
            Some("Used 1.00 GB of 15.00 GB")
        );
        assert_eq!(cache.get_at("quota", start + Duration::from_secs(240)), None);
        assert_eq!(cache.get_at("quota", start), None);
    }

    #[test]
    fn loader_runs_only_on_miss_and_errors_are_not_cached() {
        let cache = TtlCache::new(Duration::from_secs(60));
        assert_eq!(
            cache.get_or_try_insert_with("quota", || Err::<u64, _>("offline")),
            Err("offline")
        );

        let mut loads = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with("quota", || {
                    loads += 1;
                    Ok::<_, &str>(42)
                })
                .expect("load");
            assert_eq!(value, 42);
        }
        assert_eq!(loads, 1);
    }
}

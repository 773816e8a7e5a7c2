use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::traits::Clock;

struct Slot<T> {
    value: Option<(Arc<T>, DateTime<Utc>)>,
    refresh: Arc<Mutex<()>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            refresh: Arc::new(Mutex::new(())),
        }
    }
}

/// Time-bounded store of the last successful result per key.
///
/// Staleness is evaluated lazily on access against the injected [`Clock`].
/// Per key, at most one refresh is in flight at a time: the caller that
/// wins the refresh mutex runs `refresh_fn`, while concurrent callers are
/// served the previous value untouched (stale-read-while-refreshing).
/// Callers that find the key empty wait for the in-flight first population
/// instead, since there is nothing to serve meanwhile.
///
/// A failed refresh keeps the previous value (stale-but-available); only a
/// failed *first* population propagates the error, because no fallback
/// exists yet.
pub struct TtlCache<T, C: Clock> {
    clock: C,
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T, C: Clock> TtlCache<T, C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, refreshing it first when absent
    /// or older than `ttl`.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        refresh_fn: F,
    ) -> Result<Arc<T>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let (current, refresh) = self.slot_state(key).await;

        if let Some((value, fetched_at)) = &current {
            if self.is_fresh(*fetched_at, ttl) {
                return Ok(value.clone());
            }
        }

        match refresh.try_lock() {
            Ok(_guard) => {
                // Won the refresh. Someone may have finished one between our
                // state read and here, so re-check before crawling again.
                let (rechecked, _) = self.slot_state(key).await;
                if let Some((value, fetched_at)) = &rechecked {
                    if self.is_fresh(*fetched_at, ttl) {
                        return Ok(value.clone());
                    }
                }

                match refresh_fn().await {
                    Ok(value) => {
                        let value = Arc::new(value);
                        self.store(key, value.clone()).await;
                        Ok(value)
                    }
                    Err(e) => match rechecked.or(current) {
                        Some((stale, _)) => {
                            tracing::warn!(key, error = %e, "refresh failed, serving stale value");
                            Ok(stale)
                        }
                        None => Err(e),
                    },
                }
            }
            Err(_busy) => {
                // A refresh is in flight. Stale readers get the previous
                // value; empty-state callers have nothing to read and wait.
                if let Some((stale, _)) = current {
                    return Ok(stale);
                }

                let _guard = refresh.lock().await;
                let (populated, _) = self.slot_state(key).await;
                if let Some((value, _)) = populated {
                    return Ok(value);
                }

                // The first population failed while we waited; retry it
                // under the lock we now hold.
                match refresh_fn().await {
                    Ok(value) => {
                        let value = Arc::new(value);
                        self.store(key, value.clone()).await;
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, ttl: Duration) -> bool {
        let age = self.clock.now().signed_duration_since(fetched_at);
        age < TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
    }

    async fn slot_state(&self, key: &str) -> (Option<(Arc<T>, DateTime<Utc>)>, Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(key.to_string()).or_default();
        (slot.value.clone(), slot.refresh.clone())
    }

    async fn store(&self, key: &str, value: Arc<T>) {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(key.to_string()).or_default();
        slot.value = Some((value, self.clock.now()));
    }
}

//! Rate limiting helpers for UI-driven updates.
//!
//! [`Throttle`] lets at most one call through per window and drops the rest.
//! [`Debouncer`] keeps a single pending timer per key and restarts it on every
//! new call, so only the last call of a burst runs.

use instant::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Take the slot for the current window if it is free
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Run `f` unless a call already went through in this window
    pub fn call<T>(&mut self, f: impl FnOnce() -> T) -> Option<T> {
        if self.try_acquire() {
            Some(f())
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(feature = "tokio-runtime")]
pub use debounce::Debouncer;

#[cfg(feature = "tokio-runtime")]
mod debounce {
    use crate::prelude::HashMap;
    use instant::Duration;
    use std::hash::Hash;
    use std::sync::{Arc, Mutex};
    use tokio::task::JoinHandle;

    type Pending<K> = Arc<Mutex<HashMap<K, (u64, JoinHandle<()>)>>>;

    /// Per-key trailing-edge debouncer running on the tokio runtime
    pub struct Debouncer<K> {
        delay: Duration,
        pending: Pending<K>,
        generation: u64,
    }

    impl<K> Debouncer<K>
    where
        K: Eq + Hash + Clone + Send + 'static,
    {
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                pending: Arc::new(Mutex::new(HashMap::default())),
                generation: 0,
            }
        }

        /// Run `task` after the delay unless another call for `key` comes in
        /// first, in which case this one is dropped. Must be called inside a
        /// tokio runtime.
        pub fn schedule<F>(&mut self, key: K, task: F)
        where
            F: FnOnce() + Send + 'static,
        {
            self.generation += 1;
            let generation = self.generation;
            let delay = self.delay;

            let Ok(mut pending) = self.pending.lock() else {
                log::error!("debouncer state poisoned, dropping task");
                return;
            };

            let shared = Arc::clone(&self.pending);
            let own_key = key.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if claim(&shared, &own_key, generation) {
                    task();
                }
            });

            if let Some((_, previous)) = pending.insert(key, (generation, handle)) {
                previous.abort();
            }
        }

        /// Drop the pending call for `key`; returns whether there was one
        pub fn cancel(&self, key: &K) -> bool {
            match self.pending.lock() {
                Ok(mut pending) => match pending.remove(key) {
                    Some((_, handle)) => {
                        handle.abort();
                        true
                    }
                    None => false,
                },
                Err(_) => false,
            }
        }

        pub fn is_pending(&self, key: &K) -> bool {
            self.pending
                .lock()
                .map(|pending| pending.contains_key(key))
                .unwrap_or(false)
        }

        pub fn delay(&self) -> Duration {
            self.delay
        }
    }

    /// Take the pending slot for `key` if `generation` still owns it. A call
    /// that was replaced or cancelled after its timer fired loses here.
    fn claim<K: Eq + Hash>(pending: &Pending<K>, key: &K, generation: u64) -> bool {
        let Ok(mut pending) = pending.lock() else {
            return false;
        };
        match pending.get(key) {
            Some((current, _)) if *current == generation => {
                pending.remove(key);
                true
            }
            _ => false,
        }
    }

    impl<K> Drop for Debouncer<K> {
        fn drop(&mut self) {
            if let Ok(mut pending) = self.pending.lock() {
                for (_, (_, handle)) in pending.drain() {
                    handle.abort();
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_drops_calls_inside_window() {
        let mut throttle = Throttle::new(Duration::from_secs(60));
        assert_eq!(throttle.call(|| 1), Some(1));
        assert_eq!(throttle.call(|| 2), None);
        assert!(!throttle.try_acquire());

        throttle.reset();
        assert!(throttle.try_acquire());
    }

    #[test]
    fn test_zero_window_never_throttles() {
        let mut throttle = Throttle::new(Duration::ZERO);
        assert!(throttle.try_acquire());
        assert!(throttle.try_acquire());
    }

    #[cfg(feature = "tokio-runtime")]
    mod debouncer {
        use super::super::Debouncer;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};
        use std::time::Duration;

        #[tokio::test]
        async fn test_only_last_call_runs() {
            let mut debouncer = Debouncer::new(Duration::from_millis(30));
            let seen = Arc::new(Mutex::new(Vec::new()));

            for value in 0..5 {
                let seen = Arc::clone(&seen);
                debouncer.schedule("filters", move || seen.lock().unwrap().push(value));
            }
            assert!(debouncer.is_pending(&"filters"));

            tokio::time::sleep(Duration::from_millis(150)).await;
            assert_eq!(*seen.lock().unwrap(), vec![4]);
            assert!(!debouncer.is_pending(&"filters"));
        }

        #[tokio::test]
        async fn test_keys_are_independent_and_cancellable() {
            let mut debouncer = Debouncer::new(Duration::from_millis(30));
            let runs = Arc::new(AtomicUsize::new(0));

            for key in ["a", "b", "c"] {
                let runs = Arc::clone(&runs);
                debouncer.schedule(key, move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                });
            }
            assert!(debouncer.cancel(&"b"));
            assert!(!debouncer.cancel(&"b"));

            tokio::time::sleep(Duration::from_millis(150)).await;
            assert_eq!(runs.load(Ordering::SeqCst), 2);
        }
    }
}

use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

/// Forced cool down duration between two requests. E621 allows at most 2 requests per second, so
/// the lowest safe value we can have here is 500 ms.
pub const REQ_COOLDOWN_DURATION: Duration = Duration::from_millis(500);

static GLOBAL: OnceLock<RateLimit> = OnceLock::new();

/// Admission gate spacing out requests.
///
/// Cloning a `RateLimit` gives another handle to the same state, so every client built with it
/// (blocking or async) is paced together. Clients use [`RateLimit::global`] unless told otherwise.
#[derive(Debug, Clone)]
pub struct RateLimit {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cooldown: Duration,
    // A std `Mutex` is fine here: it's never held across a sleep or an await, only while reading
    // and bumping the deadline.
    deadline: Mutex<Option<Instant>>,
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit::new(REQ_COOLDOWN_DURATION)
    }
}

impl RateLimit {
    /// Creates an isolated limiter admitting at most one request per `cooldown`.
    pub fn new(cooldown: Duration) -> Self {
        RateLimit {
            inner: Arc::new(Inner {
                cooldown,
                deadline: Mutex::new(None),
            }),
        }
    }

    /// Returns a handle to the process-wide limiter.
    pub fn global() -> Self {
        GLOBAL.get_or_init(RateLimit::default).clone()
    }

    /// The minimum spacing between two admissions.
    pub fn cooldown(&self) -> Duration {
        self.inner.cooldown
    }

    /// Admits the caller right away if the deadline has passed, otherwise returns the deadline to
    /// wait for. The state only changes on admission.
    fn try_admit(&self) -> Result<(), Instant> {
        let mut deadline = self
            .inner
            .deadline
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match *deadline {
            Some(d) if now < d => Err(d),
            _ => {
                *deadline = Some(now + self.inner.cooldown);
                Ok(())
            }
        }
    }

    /// Waits until a request may be sent, suspending only the calling task.
    ///
    /// Dropping the returned future before it completes doesn't consume an admission.
    pub async fn acquire(&self) {
        loop {
            match self.try_admit() {
                Ok(()) => return,
                Err(deadline) => {
                    tracing::trace!(wait = ?deadline.saturating_duration_since(Instant::now()), "rate limited");
                    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                }
            }
        }
    }

    /// Waits until a request may be sent, blocking the calling thread.
    pub fn acquire_blocking(&self) {
        loop {
            match self.try_admit() {
                Ok(()) => return,
                Err(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    tracing::trace!(?wait, "rate limited");
                    std::thread::sleep(wait);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(50);

    fn assert_spaced(mut admissions: Vec<Instant>) {
        admissions.sort();

        for pair in admissions.windows(2) {
            assert!(
                pair[1] - pair[0] >= COOLDOWN,
                "admissions {:?} apart",
                pair[1] - pair[0]
            );
        }
    }

    #[test]
    fn first_admission_is_immediate() {
        let limit = RateLimit::new(Duration::from_secs(60));
        let start = Instant::now();

        limit.acquire_blocking();

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn blocking_admissions_are_spaced_across_threads() {
        let limit = RateLimit::new(COOLDOWN);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limit = limit.clone();
                std::thread::spawn(move || {
                    limit.acquire_blocking();
                    Instant::now()
                })
            })
            .collect();

        let admissions = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_spaced(admissions);
    }

    #[tokio::test]
    async fn async_admissions_are_spaced_across_tasks() {
        let limit = RateLimit::new(COOLDOWN);

        let admissions = futures::future::join_all((0..4).map(|_| {
            let limit = limit.clone();
            async move {
                limit.acquire().await;
                Instant::now()
            }
        }))
        .await;

        assert_spaced(admissions);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn modes_share_the_same_state() {
        let limit = RateLimit::new(COOLDOWN);

        let blocking = {
            let limit = limit.clone();
            tokio::task::spawn_blocking(move || {
                limit.acquire_blocking();
                Instant::now()
            })
        };

        limit.acquire().await;
        let async_admission = Instant::now();
        let blocking_admission = blocking.await.unwrap();

        assert_spaced(vec![async_admission, blocking_admission]);
    }

    #[tokio::test]
    async fn cancelled_wait_does_not_consume_an_admission() {
        let limit = RateLimit::new(Duration::from_millis(200));

        limit.acquire().await;
        let first = Instant::now();

        // Gives up long before the deadline.
        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), limit.acquire()).await;
        assert!(cancelled.is_err());

        limit.acquire().await;
        let elapsed = first.elapsed();

        assert!(elapsed >= Duration::from_millis(200));
        // A consumed admission would have pushed this one to ~400ms.
        assert!(elapsed < Duration::from_millis(390), "waited {:?}", elapsed);
    }

    #[test]
    fn global_is_shared() {
        let a = RateLimit::global();
        let b = RateLimit::global();

        assert!(Arc::ptr_eq(&a.inner, &b.inner));
        assert_eq!(a.cooldown(), REQ_COOLDOWN_DURATION);
    }
}

use std::{future::Future, time::Duration};

use log::debug;
use tokio::{
    select,
    time::{Instant, sleep, sleep_until},
};

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum WaitError<E> {
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Check(E),
}

impl<E> WaitError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Bounded polling: the predicate runs at least once, then once per interval until
/// it reports done, fails, or the timeout elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    timeout: Duration,
    interval: Duration,
}

impl Poll {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn until<F, Fut, E>(&self, mut check: F) -> Result<(), WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;

            if check().await.map_err(WaitError::Check)? {
                debug!("Condition met after {} attempt(s).", attempt);
                return Ok(());
            }

            select! {
                biased;

                _ = sleep_until(deadline) => {
                    return Err(WaitError::Timeout(self.timeout));
                }

                _ = sleep(self.interval) => {}
            }
        }
    }
}

pub async fn wait_for<F, Fut, E>(timeout: Duration, check: F) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    Poll::new(timeout).until(check).await
}

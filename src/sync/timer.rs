//! Cancellable one-shot timers.
//!
//! Every timer runs under a child of the match's cancellation token, so
//! leaving or terminating a match stops all of them at once.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Sleep for `duration` unless `token` is cancelled first.
///
/// Returns `true` if the full duration elapsed.
pub async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = token.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// A spawned task that runs `on_fire` once after a delay.
///
/// Cancelled on [`cancel`](Self::cancel), on drop, or when the parent
/// token is cancelled. Cancellation only prevents firing; a callback that
/// already started runs to completion.
#[derive(Debug)]
pub struct OneShotTimer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl OneShotTimer {
    pub fn spawn<F, Fut>(parent: &CancellationToken, delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = parent.child_token();
        let armed = token.clone();
        let handle = tokio::spawn(async move {
            if sleep_or_cancel(delay, &armed).await {
                on_fire().await;
            }
        });
        Self { token, handle }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_timer(parent: &CancellationToken, delay: Duration, hits: &Arc<AtomicUsize>) -> OneShotTimer {
        let hits = Arc::clone(hits);
        OneShotTimer::spawn(parent, delay, move || async move {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let parent = CancellationToken::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _timer = counting_timer(&parent, Duration::from_secs(5), &hits);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let parent = CancellationToken::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let timer = counting_timer(&parent, Duration::from_secs(1), &hits);

        timer.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(timer.is_cancelled());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancel_and_drop() {
        let parent = CancellationToken::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let first = counting_timer(&parent, Duration::from_secs(1), &hits);
        let second = counting_timer(&CancellationToken::new(), Duration::from_secs(1), &hits);

        parent.cancel();
        drop(second);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(first.is_cancelled());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_cancel() {
        let token = CancellationToken::new();
        assert!(sleep_or_cancel(Duration::from_millis(10), &token).await);

        token.cancel();
        assert!(!sleep_or_cancel(Duration::from_secs(10), &token).await);
    }
}

use tokio::sync::watch;

// ---------------------------------------------------------------------------
// CancelToken — cooperative run teardown
// ---------------------------------------------------------------------------
//
// The booth has no retry and no skip control, but it does need one abort
// path: navigation-away / Ctrl-C must stop the narrative at the next await
// point and let the camera guard release its tracks. Every sequencer step
// and every effect loop polls the same token.

/// Cheap-to-clone cancellation flag. Once cancelled it stays cancelled.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// The owning side. Dropping the handle does NOT cancel; only an explicit
/// `cancel()` does, so the binary can stash it in a signal handler.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may all be gone at teardown; that's fine.
        let _ = self.tx.send(true);
    }

    pub fn token(&self) -> CancelToken {
        CancelToken { rx: self.tx.subscribe() }
    }
}

/// Create a connected handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when the token is cancelled. Used as the losing side of a
    /// `tokio::select!` around every timed wait.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                // Sender dropped without cancelling — park forever; the
                // surrounding select completes via its other arm.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep that loses to cancellation. Returns `false` when cancelled
    /// before the duration elapsed.
    pub async fn sleep(&self, dur: std::time::Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(dur) => true,
            _ = self.cancelled() => false,
        }
    }

    /// A token that never fires, for runs that have no external abort path
    /// (headless demos, tests that don't exercise cancellation).
    pub fn never() -> Self {
        static KEEPER: std::sync::OnceLock<watch::Sender<bool>> = std::sync::OnceLock::new();
        let tx = KEEPER.get_or_init(|| watch::channel(false).0);
        CancelToken { rx: tx.subscribe() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn token_starts_clear_and_latches() {
        let (handle, token) = cancel_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        token.cancelled().await; // must not hang once latched
    }

    #[tokio::test]
    async fn sleep_is_cut_short_by_cancel() {
        let (handle, token) = cancel_pair();
        let waiter = tokio::spawn(async move { token.sleep(Duration::from_secs(30)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        let completed = waiter.await.unwrap();
        assert!(!completed, "sleep should report interruption");
    }

    #[tokio::test]
    async fn never_token_lets_sleeps_finish() {
        let token = CancelToken::never();
        assert!(token.sleep(Duration::from_millis(1)).await);
    }
}

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::actor::Inbox;

/// One logical gravity timer per live player (spec §4.4). Sleeps for
/// `interval_ms`, then enqueues an auto-drop tick on the owning player
/// actor's inbox. Cancellation is O(1) and idempotent — it flips an
/// `AtomicBool` the sleeping task polls after waking, never waiting on the
/// task itself (spec §5 "cancellable in O(1)").
///
/// Restarting a ticker (level change, `startPlayerGame`) always constructs a
/// new `GravityTicker` and drops the old one first, so the old task's next
/// wakeup sees `cancelled == true` and exits without sending a stray tick.
pub struct GravityTicker {
    cancelled: Arc<AtomicBool>,
}

impl GravityTicker {
    pub fn start(interval_ms: u64, sink: UnboundedSender<Inbox>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                if flag.load(Ordering::Acquire) || ttb_core::interrupted() {
                    break;
                }
                if sink.send(Inbox::AutoDrop).is_err() {
                    break;
                }
            }
        });
        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Drop for GravityTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn ticks_arrive_on_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = GravityTicker::start(5, tx);
        let tick = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(matches!(tick, Ok(Some(Inbox::AutoDrop))));
        ticker.cancel();
    }

    #[tokio::test]
    async fn cancel_stops_future_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = GravityTicker::start(5, tx);
        rx.recv().await;
        ticker.cancel();
        // drain whatever raced in before the flag was observed
        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}
        let after = tokio::time::timeout(Duration::from_millis(40), rx.recv()).await;
        assert!(after.is_err(), "expected no further ticks after cancel");
    }
}

use std::sync::Arc;

use tokio::sync::broadcast;

use dwell_market::ViewInvalidator;
use dwell_types::events::StaleView;

/// Fans stale-view marks out to whoever renders or caches views.
#[derive(Clone)]
pub struct StaleBroadcaster {
    inner: Arc<broadcast::Sender<StaleView>>,
}

impl StaleBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { inner: Arc::new(tx) }
    }

    /// Subscribe to stale marks. Lagging receivers lose the oldest marks.
    pub fn subscribe(&self) -> broadcast::Receiver<StaleView> {
        self.inner.subscribe()
    }
}

impl Default for StaleBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewInvalidator for StaleBroadcaster {
    fn mark_stale(&self, view: StaleView) {
        // No subscribers is fine: nothing is cached yet.
        let _ = self.inner.send(view);
    }
}

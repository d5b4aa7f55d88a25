use dwell_types::events::StaleView;

/// Observer the core notifies after a successful write. Implementations
/// decide what "stale" means for them (broadcast, cache purge, nothing).
pub trait ViewInvalidator: Send + Sync {
    fn mark_stale(&self, view: StaleView);
}

//! Progress reporting, as a pure side-channel on the core pipeline.
//!
//! The engine and collector call into a [`ProgressObserver`] at
//! transaction/receipt granularity. The default [`NoopObserver`] does
//! nothing, so nothing about the pipeline's outcome depends on whether a
//! real observer (e.g. a progress bar) is attached.

/// Callback surface for reporting run progress.
pub trait ProgressObserver: Send + Sync {
    /// Called once per unit of work about to start (one signed tx, one receipt fetch, ...).
    fn on_item_started(&self, _label: &str) {}

    /// Called once per unit of work that finished, successfully or not.
    fn on_item_completed(&self, _label: &str, _total: usize, _completed: usize) {}
}

/// An observer that does nothing; the default when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_observer_does_not_panic() {
        let observer = NoopObserver;
        observer.on_item_started("submit");
        observer.on_item_completed("submit", 10, 1);
    }
}

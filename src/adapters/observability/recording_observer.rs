//! RecordingObserver - in-memory event capture for tests and diagnostics.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{AnalysisEvent, AnalysisObserver};

/// Observer that keeps every event it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<AnalysisEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events, in arrival order.
    pub fn events(&self) -> Vec<AnalysisEvent> {
        self.lock().clone()
    }

    /// Returns recorded events with the given name.
    pub fn events_named(&self, name: &str) -> Vec<AnalysisEvent> {
        self.lock()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AnalysisEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AnalysisObserver for RecordingObserver {
    fn on_event(&self, event: AnalysisEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn records_and_filters_events() {
        let observer = RecordingObserver::new();
        observer.on_event(AnalysisEvent::ScoreCollisions {
            run_id: Uuid::nil(),
            collisions: 2,
        });
        observer.on_event(AnalysisEvent::UnknownIdsDiscarded {
            run_id: Uuid::nil(),
            chunk_index: 0,
            discarded: 1,
        });

        assert_eq!(observer.events().len(), 2);
        assert_eq!(observer.events_named("scoring.score_collisions").len(), 1);

        observer.clear();
        assert!(observer.events().is_empty());
    }
}

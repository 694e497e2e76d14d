//! Progress events emitted while an analysis runs.
//!
//! Listeners are observers only: an error returned by a listener, or a
//! panic inside one, is logged and swallowed. The remaining listeners are
//! still called and the analysis carries on.

use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::network::models::Valence;

/// Pipeline stage that just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Build,
    Classify,
    Components,
    MacroStats,
    MicroStats,
    Descriptives,
    Rankings,
    Sociometry,
    Aggregation,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisEvent {
    pub stage: Stage,
    /// `None` for stages that cover both valences
    pub valence: Option<Valence>,
    /// Time since the analysis started
    pub elapsed_ms: u64,
}

/// Receives progress events. Implementations must be cheap; they run on
/// the analysis threads.
pub trait ProgressListener: Send + Sync {
    fn on_event(&self, event: &AnalysisEvent) -> anyhow::Result<()>;
}

/// Fan-out to every registered listener, isolating failures.
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn ProgressListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Arc<dyn ProgressListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&self, event: &AnalysisEvent) {
        for (position, listener) in self.listeners.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        listener = position,
                        stage = ?event.stage,
                        "Progress listener failed: {:#}",
                        e
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        listener = position,
                        stage = ?event.stage,
                        "Progress listener panicked"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    impl ProgressListener for Counting {
        fn on_event(&self, _event: &AnalysisEvent) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl ProgressListener for Failing {
        fn on_event(&self, _event: &AnalysisEvent) -> anyhow::Result<()> {
            anyhow::bail!("sink closed")
        }
    }

    struct Panicking;

    impl ProgressListener for Panicking {
        fn on_event(&self, _event: &AnalysisEvent) -> anyhow::Result<()> {
            panic!("listener bug")
        }
    }

    fn event() -> AnalysisEvent {
        AnalysisEvent {
            stage: Stage::Build,
            valence: None,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_failing_listeners_do_not_stop_the_others() {
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        let mut set = ListenerSet::new();
        set.add(Arc::new(Failing));
        set.add(Arc::new(Panicking));
        set.add(counter.clone());

        set.emit(&event());
        set.emit(&event());

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_event_serializes_stage_name() {
        let json = serde_json::to_value(AnalysisEvent {
            stage: Stage::MicroStats,
            valence: Some(Valence::B),
            elapsed_ms: 12,
        })
        .unwrap();
        assert_eq!(json["stage"], "micro_stats");
        assert_eq!(json["valence"], "b");
    }
}

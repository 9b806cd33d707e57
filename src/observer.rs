//! Diagnostic observer collaborators
//!
//! Components receive an explicit observer at construction instead of writing
//! to process-global logger state, so unit tests can capture diagnostics
//! deterministically. The default [`TracingObserver`] forwards everything to
//! the `tracing` macros; [`NoopObserver`] discards everything.

/// Sink for leveled diagnostic messages emitted by the import pipeline.
pub trait Observer: Send + Sync {
    /// Record a debug-level diagnostic.
    fn debug(&self, message: &str);

    /// Record an info-level diagnostic.
    fn info(&self, message: &str);

    /// Record an error-level diagnostic.
    fn error(&self, message: &str);
}

/// Observer that forwards every message to the `tracing` macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Observer that discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
pub(crate) mod testing {
    use super::Observer;
    use std::sync::Mutex;

    /// Observer that records every message for later assertions.
    #[derive(Default)]
    pub(crate) struct CollectingObserver {
        messages: Mutex<Vec<(&'static str, String)>>,
    }

    impl CollectingObserver {
        pub(crate) fn messages(&self) -> Vec<(&'static str, String)> {
            self.messages.lock().unwrap().clone()
        }

        pub(crate) fn count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    impl Observer for CollectingObserver {
        fn debug(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(("debug", message.to_string()));
        }

        fn info(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(("info", message.to_string()));
        }

        fn error(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(("error", message.to_string()));
        }
    }
}

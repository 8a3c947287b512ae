use std::sync::{Arc, Mutex};

use anyhow::bail;
use pybuild::registry::TaskContext;

/// Shared log of which bodies ran, in order.
///
/// Bodies created by [`Recorder::body`] push their label when invoked;
/// [`Recorder::failing_body`] pushes the label and then fails.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: impl Into<String>) {
        self.events.lock().unwrap().push(label.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn count(&self, label: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == label).count()
    }

    pub fn body(
        &self,
        label: impl Into<String>,
    ) -> impl Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        let label = label.into();
        move |_ctx: &mut TaskContext<'_>| {
            events.lock().unwrap().push(label.clone());
            Ok(())
        }
    }

    pub fn failing_body(
        &self,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> impl Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        let label = label.into();
        let message = message.into();
        move |_ctx: &mut TaskContext<'_>| {
            events.lock().unwrap().push(label.clone());
            bail!("{message}")
        }
    }
}

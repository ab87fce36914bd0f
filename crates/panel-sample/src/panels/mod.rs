//! Concrete panels of the sample application.
//!
//! Every panel receives [`UiServices`] as its context: the shared event log
//! and the duration of the (simulated) open/close transition.

mod confirm;
mod error;
mod loading;
mod settings;

pub use confirm::*;
pub use error::*;
pub use loading::*;
pub use settings::*;

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Something a panel did, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Created { panel: &'static str, node: u64 },
    Opened { panel: &'static str, detail: String },
    Closed { panel: &'static str, detail: String },
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<UiEvent>>,
}

impl EventLog {
    pub fn push(&self, event: UiEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    pub fn snapshot(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn created(&self, panel: &str) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| matches!(e, UiEvent::Created { panel: p, .. } if *p == panel))
            .count()
    }

    pub fn opened(&self, panel: &str) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| matches!(e, UiEvent::Opened { panel: p, .. } if *p == panel))
            .count()
    }

    pub fn last_closed(&self, panel: &str) -> Option<String> {
        self.snapshot().into_iter().rev().find_map(|e| match e {
            UiEvent::Closed { panel: p, detail } if p == panel => Some(detail),
            _ => None,
        })
    }
}

/// Context injected into every sample panel.
#[derive(Debug, Clone)]
pub struct UiServices {
    pub events: Arc<EventLog>,
    pub transition: Duration,
}

impl UiServices {
    pub fn new(transition: Duration) -> Self {
        Self {
            events: Arc::new(EventLog::default()),
            transition,
        }
    }

    /// Stands in for an open/close animation.
    pub async fn animate(&self) {
        if !self.transition.is_zero() {
            tokio::time::sleep(self.transition).await;
        }
    }
}

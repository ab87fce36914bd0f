//! # Panel Messages
//!
//! This module defines the message types used for communication between a
//! [`PanelClient`](crate::client::PanelClient) and its
//! [`PanelActor`](crate::actor::PanelActor), plus the values those messages
//! answer with.

use crate::error::PanelError;
use crate::panel::{Panel, PanelKind, PanelState};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by panel actors.
pub type Response<T> = oneshot::Sender<Result<T, PanelError>>;

/// Outcome of an open or close request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The guard accepted the transition and the hooks ran.
    Applied,
    /// The panel was already in the requested state; nothing happened.
    Rejected,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Read-only view of a panel's context at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub state: PanelState,
    pub kind: PanelKind,
    pub resource_loaded: bool,
    /// Present while an instance is cached.
    pub node_id: Option<u64>,
    pub node_active: Option<bool>,
    pub z_index: Option<i64>,
}

impl PanelSnapshot {
    pub fn has_instance(&self) -> bool {
        self.node_id.is_some()
    }
}

/// Internal message type sent to a panel actor.
///
/// The variants map one-to-one onto the runtime entry points; `Inspect` is
/// read-only and `Shutdown` stops the actor loop.
#[derive(Debug)]
pub enum PanelRequest<P: Panel> {
    Preload {
        respond_to: Response<()>,
    },
    Open {
        params: P::OpenParams,
        respond_to: Response<Transition>,
    },
    Close {
        params: P::CloseParams,
        respond_to: Response<Transition>,
    },
    Inspect {
        respond_to: Response<PanelSnapshot>,
    },
    Shutdown,
}

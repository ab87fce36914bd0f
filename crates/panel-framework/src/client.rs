//! # Panel Client
//!
//! This module defines the typed handle for communicating with a panel actor.

use crate::error::PanelError;
use crate::message::{PanelRequest, PanelSnapshot, Transition};
use crate::panel::Panel;
use std::fmt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// ## PanelClient
///
/// The `PanelClient<P>` forwards lifecycle requests to the `PanelActor<P>`
/// that owns panel `P` over a Tokio mpsc channel and returns results via
/// oneshot channels. Requests are answered in the order they were sent.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Typed** – `open` takes `P::OpenParams`, `close` takes `P::CloseParams`.
pub struct PanelClient<P: Panel> {
    sender: mpsc::Sender<PanelRequest<P>>,
}

impl<P: Panel> Clone for PanelClient<P> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<P: Panel> fmt::Debug for PanelClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelClient")
            .field("closed", &self.sender.is_closed())
            .finish_non_exhaustive()
    }
}

impl<P: Panel> PanelClient<P> {
    pub fn new(sender: mpsc::Sender<PanelRequest<P>>) -> Self {
        Self { sender }
    }

    /// Loads the panel's resource if it is not cached yet.
    #[instrument(skip(self))]
    pub async fn preload(&self) -> Result<(), PanelError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PanelRequest::Preload { respond_to })
            .await
            .map_err(|_| PanelError::ActorClosed)?;
        response.await.map_err(|_| PanelError::ActorDropped)?
    }

    #[instrument(skip(self))]
    pub async fn open(&self, params: P::OpenParams) -> Result<Transition, PanelError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PanelRequest::Open { params, respond_to })
            .await
            .map_err(|_| PanelError::ActorClosed)?;
        response.await.map_err(|_| PanelError::ActorDropped)?
    }

    #[instrument(skip(self))]
    pub async fn close(&self, params: P::CloseParams) -> Result<Transition, PanelError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PanelRequest::Close { params, respond_to })
            .await
            .map_err(|_| PanelError::ActorClosed)?;
        response.await.map_err(|_| PanelError::ActorDropped)?
    }

    pub async fn snapshot(&self) -> Result<PanelSnapshot, PanelError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PanelRequest::Inspect { respond_to })
            .await
            .map_err(|_| PanelError::ActorClosed)?;
        response.await.map_err(|_| PanelError::ActorDropped)?
    }

    /// Asks the actor to stop after the requests already queued.
    pub(crate) async fn stop(&self) {
        let _ = self.sender.send(PanelRequest::Shutdown).await;
    }
}

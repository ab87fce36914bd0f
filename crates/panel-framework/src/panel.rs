//! # Panel Trait
//!
//! The `Panel` trait is the contract every concrete panel (loading screen,
//! settings page, confirm dialog, …) implements to be managed by a
//! [`PanelActor`](crate::actor::PanelActor). The runtime only ever talks to a
//! panel through this trait: it never inspects the concrete type.
//!
//! # Lifecycle Hooks
//! - [`Panel::attach`] binds the behavior to a freshly instantiated node.
//! - [`Panel::on_create`] runs once per physical instance, right after attach.
//! - [`Panel::on_open`] runs on every successful open, after the node is
//!   activated and stacked. Open animations belong here.
//! - [`Panel::on_close`] runs on every successful close, while the node is
//!   still active. Close animations belong here.
//!
//! `on_create` and `on_close` have default implementations that do nothing.

use crate::fsm::StateGuard;
use crate::scene::NodeRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// What happens to a panel's node on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    /// Destroy the node and drop the instance on every close.
    /// The next open instantiates again and reruns `on_create`.
    New,
    /// Keep the node alive and deactivate it on close.
    /// The next open skips creation and goes straight to `on_open`.
    #[default]
    Old,
}

/// Current (committed) state of a panel, regardless of running animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelState {
    Open,
    Close,
}

impl PanelState {
    /// The guard every panel starts with: closed, alternating `close <-> open`.
    pub fn guard() -> StateGuard<PanelState> {
        StateGuard::new(
            PanelState::Close,
            [
                (PanelState::Close, vec![PanelState::Open]),
                (PanelState::Open, vec![PanelState::Close]),
            ],
        )
    }
}

/// Behavior bound to a panel node.
///
/// # Context
/// Each panel declares a `Context` type that is handed to the runtime at
/// registration and injected into every hook. Use it for dependencies the
/// panel needs (services, channels, shared counters). Use `()` if none.
///
/// # Parameters
/// `OpenParams` and `CloseParams` are what callers pass to
/// `open_panel` / `close_panel`. Use `()` for panels that take nothing.
#[async_trait]
pub trait Panel: Sized + Send + 'static {
    /// Dependencies injected into every hook.
    type Context: Send + Sync + 'static;

    /// Arguments of `open_panel`.
    type OpenParams: Send + Debug + 'static;

    /// Arguments of `close_panel`.
    type CloseParams: Send + Debug + 'static;

    /// The error type for this panel's hooks.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Obtain the behavior attached to a freshly instantiated node.
    /// This is called synchronously before `on_create`.
    fn attach(node: &NodeRef, ctx: &Self::Context) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called once per physical instance, after `attach`.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called on every successful open, after the node is active.
    async fn on_open(
        &mut self,
        params: Self::OpenParams,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called on every successful close, before the node is destroyed or hidden.
    async fn on_close(
        &mut self,
        _params: Self::CloseParams,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

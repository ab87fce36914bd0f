//! # Panel Framework
//!
//! This crate manages the opening, closing, caching and stacking of modal or
//! full-screen UI panels on top of a scene-graph engine. It does not render:
//! it sequences calls into the engine through the traits in [`scene`].
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Behavior Layer** ([`Panel`]) - each concrete panel's `create` / `open` / `close` hooks
//! 2. **Runtime Layer** ([`PanelActor`]) - one actor per panel type owning its [`PanelContext`]
//! 3. **Interface Layer** ([`PanelRuntime`], [`PanelClient`]) - the registry and the typed entry points
//!
//! ## Lifecycle
//!
//! ```text
//!  close --open_panel--> open
//!  open  --close_panel--> close
//! ```
//!
//! - [`PanelRuntime::pre_panel`] loads the panel's prefab at most once.
//! - [`PanelRuntime::open_panel`] commits `close -> open`, takes the next draw
//!   order, creates the instance if needed (`attach` + `on_create`), stacks and
//!   activates the node, then awaits `on_open`.
//! - [`PanelRuntime::close_panel`] commits `open -> close`, awaits `on_close`,
//!   then destroys ([`PanelKind::New`]) or hides ([`PanelKind::Old`]) the node.
//!
//! Calling `open_panel` on an open panel (or `close_panel` on a closed one)
//! answers [`Transition::Rejected`] and runs no hook.
//!
//! ## Example
//!
//! ```rust
//! use panel_framework::mock::MockScene;
//! use panel_framework::{NodeRef, Panel, PanelKind, PanelRuntime, PanelSpec, Transition};
//! use async_trait::async_trait;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("dialog error")]
//! struct DialogError;
//!
//! struct Dialog {
//!     node: NodeRef,
//! }
//!
//! #[async_trait]
//! impl Panel for Dialog {
//!     type Context = ();
//!     type OpenParams = String;
//!     type CloseParams = ();
//!     type Error = DialogError;
//!
//!     fn attach(node: &NodeRef, _: &()) -> Result<Self, Self::Error> {
//!         Ok(Self { node: node.clone() })
//!     }
//!
//!     async fn on_open(&mut self, message: String, _: &()) -> Result<(), Self::Error> {
//!         println!("{message} (node {})", self.node.id());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let scene = MockScene::new();
//!     let mut runtime = PanelRuntime::new(scene.clone(), scene.clone());
//!     runtime.init(scene.root()).unwrap();
//!     runtime
//!         .register::<Dialog>(PanelSpec::new("prefab/dialog").kind(PanelKind::New), ())
//!         .unwrap();
//!
//!     let opened = runtime.open_panel::<Dialog>("Quit?".into()).await.unwrap();
//!     assert_eq!(opened, Transition::Applied);
//!     let again = runtime.open_panel::<Dialog>("Quit?".into()).await.unwrap();
//!     assert_eq!(again, Transition::Rejected);
//!
//!     runtime.close_panel::<Dialog>(()).await.unwrap();
//!     runtime.shutdown().await.unwrap();
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each registered panel type runs in its own Tokio task
//! - Requests for one panel are processed **sequentially**, in arrival order
//! - Different panels run **concurrently** and share only the parent node and
//!   the draw-order counter
//!
//! A hook that never completes blocks its panel's queue: there is no timeout
//! and no cancellation.
//!
//! ## Testing
//!
//! The [`mock`] module provides an in-memory [`ResourceLoader`] /
//! [`SceneGraph`] with call counters and failure injection.

pub mod actor;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod fsm;
pub mod message;
pub mod mock;
pub mod panel;
pub mod runtime;
pub mod scene;
pub mod tracing;

// Re-export core types for convenience
pub use actor::PanelActor;
pub use client::PanelClient;
pub use config::RuntimeConfig;
pub use context::{Mounted, PanelContext, PanelSpec};
pub use error::{HookKind, PanelError};
pub use fsm::StateGuard;
pub use message::{PanelRequest, PanelSnapshot, Response, Transition};
pub use panel::{Panel, PanelKind, PanelState};
pub use runtime::{PanelRuntime, Stage};
pub use scene::{
    AssetHandle, AssetKind, LoadError, NodeRef, ResourceLoader, SceneError, SceneGraph, SceneNode,
    Size, Vec3,
};

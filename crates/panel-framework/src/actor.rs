//! # Panel Actor
//!
//! This module defines the `PanelActor`, the component that owns one panel's
//! [`PanelContext`] and runs its lifecycle. It processes requests one at a
//! time, so every lifecycle call on a panel observes the effects of the calls
//! before it.

use crate::client::PanelClient;
use crate::context::{Mounted, PanelContext, PanelSpec};
use crate::error::{HookKind, PanelError};
use crate::message::{PanelRequest, Transition};
use crate::panel::{Panel, PanelKind, PanelState};
use crate::runtime::Stage;
use crate::scene::{AssetHandle, AssetKind, Vec3};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns a single panel type.
///
/// # Concurrency Model
/// The actor is the only owner of its context: the cached resource, the live
/// instance and the state guard. Requests are processed *sequentially*, so a
/// `close` sent while an `open` hook is still running waits for that open to
/// finish, and a second `open` queued behind the first is rejected by the
/// guard once it is handled. Different panels run in different actors and
/// proceed concurrently; they only share the [`Stage`].
///
/// # Operations
///
/// * **Preload** (`pre_panel`): loads the prefab unless it is cached.
/// * **Open** (`open_panel`):
///     1. Requires an initialized stage (parent node set).
///     2. Commits `close -> open` on the guard, or answers `Rejected`.
///     3. Takes the next draw order from the stage.
///     4. Ensures the instance exists (load, instantiate, attach, `on_create`).
///     5. Sets the node's z-index to `draw order + z_index_base` and activates it.
///     6. Awaits `on_open`.
/// * **Close** (`close_panel`):
///     1. Commits `open -> close` on the guard, or answers `Rejected`.
///     2. Awaits `on_close` while the node is still active.
///     3. `new` panels destroy the node and drop the instance; `old` panels
///        deactivate the node and keep the instance.
///
/// # Failures
/// If loading, instantiation, `attach` or `on_create` fails during an open,
/// the guard returns to `close` and any node created by that open is
/// destroyed. The same rollback applies when `draw order + z_index_base`
/// does not fit in an `i64`. A failing `on_open` leaves the panel open. A failing `on_close`
/// still tears the node down. The consumed draw order is never handed out
/// again.
pub struct PanelActor<P: Panel> {
    receiver: mpsc::Receiver<PanelRequest<P>>,
    context: PanelContext<P>,
    name: String,
}

impl<P: Panel> PanelActor<P> {
    /// Creates a new `PanelActor` and its associated `PanelClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait
    /// when it is full.
    pub fn new(spec: PanelSpec, buffer_size: usize) -> (Self, PanelClient<P>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            context: PanelContext::new(spec),
            name: panel_name::<P>(),
        };
        (actor, PanelClient::new(sender))
    }

    /// Runs the actor's event loop until a shutdown request arrives or every
    /// client is dropped.
    ///
    /// `ctx` is the panel's injected dependencies, handed to every hook.
    pub async fn run(mut self, stage: Arc<Stage>, ctx: P::Context) {
        let panel = self.name.clone();
        info!(panel = %panel, path = %self.context.spec.path, kind = ?self.context.spec.kind, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                PanelRequest::Preload { respond_to } => {
                    debug!(panel = %panel, "Preload");
                    let result = self.pre_panel(&stage).await.map(|_| ());
                    let _ = respond_to.send(result);
                }
                PanelRequest::Open { params, respond_to } => {
                    debug!(panel = %panel, ?params, "Open");
                    let result = self.open(params, &stage, &ctx).await;
                    if let Err(e) = &result {
                        warn!(panel = %panel, error = %e, "Open failed");
                    }
                    let _ = respond_to.send(result);
                }
                PanelRequest::Close { params, respond_to } => {
                    debug!(panel = %panel, ?params, "Close");
                    let result = self.close(params, &ctx).await;
                    if let Err(e) = &result {
                        warn!(panel = %panel, error = %e, "Close failed");
                    }
                    let _ = respond_to.send(result);
                }
                PanelRequest::Inspect { respond_to } => {
                    let _ = respond_to.send(Ok(self.context.snapshot()));
                }
                PanelRequest::Shutdown => break,
            }
        }

        info!(panel = %panel, state = ?self.context.state(), "Shutdown");
    }

    /// Returns the cached prefab, loading it on first use.
    async fn pre_panel(&mut self, stage: &Stage) -> Result<AssetHandle, PanelError> {
        if let Some(asset) = &self.context.resource {
            return Ok(asset.clone());
        }

        let path = self.context.spec.path.as_str();
        let asset = stage
            .loader()
            .load(path, AssetKind::Prefab)
            .await
            .map_err(|source| PanelError::Load {
                path: path.to_string(),
                source,
            })?;
        info!(panel = %self.name, path, "Loaded");

        self.context.resource = Some(asset.clone());
        Ok(asset)
    }

    /// Takes the cached instance out of the context, creating it if needed.
    ///
    /// The caller puts it back once it is done with it.
    async fn get_panel(&mut self, stage: &Stage, ctx: &P::Context) -> Result<Mounted<P>, PanelError> {
        if let Some(mounted) = self.context.instance.take() {
            return Ok(mounted);
        }

        let asset = self.pre_panel(stage).await?;
        let parent = stage.parent().ok_or(PanelError::NotInitialized)?;

        let node = stage.graph().instantiate(&asset)?;
        if let Err(e) = node.set_parent(parent) {
            node.destroy();
            return Err(e.into());
        }
        node.set_position(Vec3::ZERO);
        node.set_size(stage.viewport());

        let mut panel = match P::attach(&node, ctx) {
            Ok(panel) => panel,
            Err(e) => {
                node.destroy();
                return Err(PanelError::hook(&self.name, HookKind::Attach, e));
            }
        };
        if let Err(e) = panel.on_create(ctx).await {
            node.destroy();
            return Err(PanelError::hook(&self.name, HookKind::Create, e));
        }

        info!(panel = %self.name, node = node.id(), "Created");
        Ok(Mounted { node, panel })
    }

    async fn open(
        &mut self,
        params: P::OpenParams,
        stage: &Stage,
        ctx: &P::Context,
    ) -> Result<Transition, PanelError> {
        if stage.parent().is_none() {
            return Err(PanelError::NotInitialized);
        }
        if !self.context.state.try_go_state(PanelState::Open) {
            debug!(panel = %self.name, "Already open");
            return Ok(Transition::Rejected);
        }

        let order = stage.next_draw_order();
        let base = self.context.spec.z_index_base;
        let Some(z_index) = order.checked_add(base) else {
            self.context.state.try_go_state(PanelState::Close);
            return Err(PanelError::ZIndexOverflow {
                panel: self.name.clone(),
                order,
                base,
            });
        };
        let mut mounted = match self.get_panel(stage, ctx).await {
            Ok(mounted) => mounted,
            Err(e) => {
                self.context.state.try_go_state(PanelState::Close);
                return Err(e);
            }
        };

        mounted.node.set_z_index(z_index);
        mounted.node.set_active(true);

        let result = mounted.panel.on_open(params, ctx).await;
        self.context.instance = Some(mounted);
        result.map_err(|e| PanelError::hook(&self.name, HookKind::Open, e))?;

        info!(panel = %self.name, z_index, "Opened");
        Ok(Transition::Applied)
    }

    async fn close(&mut self, params: P::CloseParams, ctx: &P::Context) -> Result<Transition, PanelError> {
        if !self.context.state.try_go_state(PanelState::Close) {
            debug!(panel = %self.name, "Already closed");
            return Ok(Transition::Rejected);
        }

        let Some(mut mounted) = self.context.instance.take() else {
            warn!(panel = %self.name, "Closed without a live instance");
            return Ok(Transition::Applied);
        };

        let result = mounted.panel.on_close(params, ctx).await;

        match self.context.spec.kind {
            PanelKind::New => {
                mounted.node.destroy();
                debug!(panel = %self.name, node = mounted.node.id(), "Destroyed");
            }
            PanelKind::Old => {
                mounted.node.set_active(false);
                self.context.instance = Some(mounted);
            }
        }
        result.map_err(|e| PanelError::hook(&self.name, HookKind::Close, e))?;

        info!(panel = %self.name, "Closed");
        Ok(Transition::Applied)
    }
}

/// Type name without module paths, used in logs and errors
/// (e.g. "SettingsPanel", "Wrapper<Inner>").
pub(crate) fn panel_name<P>() -> String {
    fn strip_path(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let full = std::any::type_name::<P>();
    let mut name = String::with_capacity(full.len());
    let mut start = 0;
    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '&' | '(' | ')' | '[' | ']' | ';') {
            name.push_str(strip_path(&full[start..i]));
            name.push(c);
            start = i + c.len_utf8();
        }
    }
    name.push_str(strip_path(&full[start..]));
    name
}

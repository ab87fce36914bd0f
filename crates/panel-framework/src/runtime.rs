//! # Panel Runtime
//!
//! The runtime is the explicit registry of panel types and the owner of the
//! state every panel shares: the parent node and the draw-order counter.
//!
//! ## Orchestration
//!
//! ```rust,ignore
//! let mut runtime = PanelRuntime::new(graph, loader);
//! runtime.init(root_node)?;
//!
//! // One registration per panel type, each spawns the panel's actor.
//! runtime.register::<SettingsPanel>(PanelSpec::new("prefab/settings"), ())?;
//! runtime.register::<ConfirmDialog>(
//!     PanelSpec::new("prefab/confirm").kind(PanelKind::New).z_index_base(1000),
//!     dialog_ctx,
//! )?;
//!
//! runtime.open_panel::<SettingsPanel>(SettingsTab::Audio).await?;
//! runtime.close_panel::<SettingsPanel>(()).await?;
//!
//! runtime.shutdown().await?;
//! ```
//!
//! `pre_panel`, `open_panel` and `close_panel` are the only mutation paths.
//! `register` and `shutdown` bracket the lifetime of the panel actors.

use crate::actor::{panel_name, PanelActor};
use crate::client::PanelClient;
use crate::config::RuntimeConfig;
use crate::context::PanelSpec;
use crate::error::PanelError;
use crate::message::{PanelSnapshot, Transition};
use crate::panel::Panel;
use crate::scene::{NodeRef, ResourceLoader, SceneGraph, Size};
use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// State shared by every panel actor.
pub struct Stage {
    parent: OnceLock<NodeRef>,
    draw_order: AtomicI64,
    graph: Arc<dyn SceneGraph>,
    loader: Arc<dyn ResourceLoader>,
    viewport: Option<Size>,
}

impl Stage {
    fn new(graph: Arc<dyn SceneGraph>, loader: Arc<dyn ResourceLoader>, viewport: Option<Size>) -> Self {
        Self {
            parent: OnceLock::new(),
            draw_order: AtomicI64::new(0),
            graph,
            loader,
            viewport,
        }
    }

    /// The node all panel instances are attached under, once initialized.
    pub fn parent(&self) -> Option<&NodeRef> {
        self.parent.get()
    }

    /// Hands out the next draw order. Values start at 1 and are never reused.
    pub fn next_draw_order(&self) -> i64 {
        self.draw_order.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The last draw order handed out (0 before the first open).
    pub fn current_draw_order(&self) -> i64 {
        self.draw_order.load(Ordering::SeqCst)
    }

    pub fn graph(&self) -> &dyn SceneGraph {
        self.graph.as_ref()
    }

    pub fn loader(&self) -> &dyn ResourceLoader {
        self.loader.as_ref()
    }

    /// Size new panel nodes are stretched to.
    pub fn viewport(&self) -> Size {
        self.viewport.unwrap_or_else(|| self.graph.viewport())
    }
}

/// Type-erased view of a registered client, so the registry can hold panels
/// of different types.
#[async_trait]
trait Registration: Send + Sync {
    fn as_any(&self) -> &(dyn Any + Send + Sync);
    async fn stop(&self);
}

#[async_trait]
impl<P: Panel> Registration for PanelClient<P> {
    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    async fn stop(&self) {
        PanelClient::stop(self).await
    }
}

/// The registry of panel types plus the shared [`Stage`].
///
/// Create one per application (or one per test). `register` spawns a Tokio
/// task, so it must be called from within a Tokio runtime.
pub struct PanelRuntime {
    stage: Arc<Stage>,
    config: RuntimeConfig,
    registry: HashMap<TypeId, Box<dyn Registration>>,
    handles: Vec<JoinHandle<()>>,
}

impl PanelRuntime {
    /// Creates a runtime with the default configuration.
    pub fn new(graph: Arc<dyn SceneGraph>, loader: Arc<dyn ResourceLoader>) -> Self {
        let config = RuntimeConfig::default();
        Self {
            stage: Arc::new(Stage::new(graph, loader, config.viewport)),
            config,
            registry: HashMap::new(),
            handles: Vec::new(),
        }
    }

    pub fn with_config(
        graph: Arc<dyn SceneGraph>,
        loader: Arc<dyn ResourceLoader>,
        config: RuntimeConfig,
    ) -> Result<Self, PanelError> {
        config.validate()?;
        Ok(Self {
            stage: Arc::new(Stage::new(graph, loader, config.viewport)),
            config,
            registry: HashMap::new(),
            handles: Vec::new(),
        })
    }

    /// Sets the node every panel instance is attached under.
    ///
    /// Must be called exactly once, before the first `open_panel`.
    pub fn init(&self, parent: NodeRef) -> Result<(), PanelError> {
        let id = parent.id();
        self.stage
            .parent
            .set(parent)
            .map_err(|_| PanelError::AlreadyInitialized)?;
        info!(parent = id, "Panel runtime initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.stage.parent().is_some()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Registers panel type `P` and spawns its actor.
    ///
    /// `ctx` is injected into every hook of `P`. Each type can be registered
    /// once per runtime.
    pub fn register<P: Panel>(&mut self, spec: PanelSpec, ctx: P::Context) -> Result<PanelClient<P>, PanelError> {
        let key = TypeId::of::<P>();
        if self.registry.contains_key(&key) {
            return Err(PanelError::AlreadyRegistered(panel_name::<P>()));
        }

        info!(panel = %panel_name::<P>(), path = %spec.path, kind = ?spec.kind, z_index_base = spec.z_index_base, "Registering panel");
        let (actor, client) = PanelActor::<P>::new(spec, self.config.mailbox_capacity);
        self.handles.push(tokio::spawn(actor.run(self.stage.clone(), ctx)));
        self.registry.insert(key, Box::new(client.clone()));
        Ok(client)
    }

    pub fn is_registered<P: Panel>(&self) -> bool {
        self.registry.contains_key(&TypeId::of::<P>())
    }

    /// The client of a registered panel type.
    pub fn client<P: Panel>(&self) -> Result<&PanelClient<P>, PanelError> {
        self.registry
            .get(&TypeId::of::<P>())
            .and_then(|registration| registration.as_any().downcast_ref::<PanelClient<P>>())
            .ok_or_else(|| PanelError::NotRegistered(panel_name::<P>()))
    }

    /// Loads the panel's prefab unless it is already cached.
    pub async fn pre_panel<P: Panel>(&self) -> Result<(), PanelError> {
        self.client::<P>()?.preload().await
    }

    /// Opens panel `P`. Opening an open panel answers [`Transition::Rejected`].
    pub async fn open_panel<P: Panel>(&self, params: P::OpenParams) -> Result<Transition, PanelError> {
        self.client::<P>()?.open(params).await
    }

    /// Closes panel `P`. Closing a closed panel answers [`Transition::Rejected`].
    pub async fn close_panel<P: Panel>(&self, params: P::CloseParams) -> Result<Transition, PanelError> {
        self.client::<P>()?.close(params).await
    }

    pub async fn snapshot<P: Panel>(&self) -> Result<PanelSnapshot, PanelError> {
        self.client::<P>()?.snapshot().await
    }

    /// Stops every panel actor and waits for them to finish.
    ///
    /// Requests already queued are processed first. Every actor is awaited
    /// even if one of them panicked; the first failure is returned. Clients handed out by
    /// `register` answer `ActorClosed` afterwards.
    pub async fn shutdown(self) -> Result<(), PanelError> {
        info!(panels = self.registry.len(), "Shutting down panel runtime...");

        for registration in self.registry.values() {
            registration.stop().await;
        }
        drop(self.registry);

        let mut failure = None;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Panel actor failed");
                failure.get_or_insert(PanelError::ShutdownFailed(e.to_string()));
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        info!("Panel runtime shutdown complete.");
        Ok(())
    }
}

//! # UI System Lifecycle
//!
//! [`UiSystem`] is the orchestrator of the sample: it builds the engine,
//! sets the UI root as the panel parent, registers every panel type and shuts
//! the panel actors down at the end.
//!
//! ```rust,ignore
//! let ui = UiSystem::new(UiOptions::default())?;
//! ui.runtime.open_panel::<SettingsPanel>(SettingsTab::Audio).await?;
//! ui.shutdown().await?;
//! ```

use crate::panels::{ConfirmDialog, LoadingPanel, SettingsPanel, UiServices};
use crate::scene_tree::{SceneTree, TreeNode};
use panel_framework::{PanelError, PanelKind, PanelRuntime, PanelSpec, RuntimeConfig, SceneNode, Size};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const LOADING_PREFAB: &str = "prefab/ui/loading";
pub const SETTINGS_PREFAB: &str = "prefab/ui/settings";
pub const CONFIRM_PREFAB: &str = "prefab/ui/confirm";

/// How the sample system is built.
#[derive(Debug, Clone)]
pub struct UiOptions {
    pub viewport: Size,
    /// Simulated resource loading time.
    pub load_latency: Duration,
    /// Simulated open/close animation time.
    pub transition: Duration,
    pub runtime: RuntimeConfig,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 720.0),
            load_latency: Duration::from_millis(20),
            transition: Duration::from_millis(10),
            runtime: RuntimeConfig::default(),
        }
    }
}

pub struct UiSystem {
    pub runtime: PanelRuntime,
    pub tree: Arc<SceneTree>,
    pub root: Arc<TreeNode>,
    pub services: UiServices,
}

impl UiSystem {
    /// Builds the engine and registers all panels.
    ///
    /// Must be called from within a Tokio runtime: every registration spawns
    /// the panel's actor.
    pub fn new(options: UiOptions) -> Result<Self, PanelError> {
        let tree = SceneTree::with_latency(options.viewport, options.load_latency);
        tree.add_prefab(LOADING_PREFAB, LoadingPanel::NAME);
        tree.add_prefab(SETTINGS_PREFAB, SettingsPanel::NAME);
        tree.add_prefab(CONFIRM_PREFAB, ConfirmDialog::NAME);

        let root = tree.spawn_node("ui-root");
        let services = UiServices::new(options.transition);

        let mut runtime = PanelRuntime::with_config(tree.clone(), tree.clone(), options.runtime)?;
        runtime.init(root.clone())?;

        runtime.register::<LoadingPanel>(
            PanelSpec::new(LOADING_PREFAB).kind(PanelKind::New),
            services.clone(),
        )?;
        runtime.register::<SettingsPanel>(
            PanelSpec::new(SETTINGS_PREFAB).kind(PanelKind::Old),
            services.clone(),
        )?;
        runtime.register::<ConfirmDialog>(
            PanelSpec::new(CONFIRM_PREFAB)
                .kind(PanelKind::New)
                .z_index_base(ConfirmDialog::Z_INDEX_BASE),
            services.clone(),
        )?;

        info!(root = root.id(), "UI system ready");
        Ok(Self {
            runtime,
            tree,
            root,
            services,
        })
    }

    /// Name of the panel currently drawn on top, if any.
    pub fn topmost(&self) -> Option<String> {
        self.tree.topmost(self.root.id())
    }

    /// Visible panels, bottom to top.
    pub fn visible(&self) -> Vec<String> {
        self.tree.render_order(self.root.id())
    }

    /// Stops every panel actor.
    pub async fn shutdown(self) -> Result<(), PanelError> {
        info!("Shutting down UI system...");
        self.runtime.shutdown().await
    }
}

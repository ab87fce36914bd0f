//! # Panel Context
//!
//! One [`PanelContext`] exists per registered panel type. It holds the
//! immutable registration data ([`PanelSpec`]) together with the cached
//! resource, the cached live instance and the state guard. The context is
//! owned by exactly one [`PanelActor`](crate::actor::PanelActor), so none of
//! these fields need locking.

use crate::fsm::StateGuard;
use crate::message::PanelSnapshot;
use crate::panel::{Panel, PanelKind, PanelState};
use crate::scene::{AssetHandle, NodeRef};
use serde::{Deserialize, Serialize};

/// Registration data for a panel type.
///
/// ```
/// use panel_framework::{PanelKind, PanelSpec};
///
/// let spec = PanelSpec::new("prefab/dialog")
///     .kind(PanelKind::New)
///     .z_index_base(1000);
/// assert_eq!(spec.path, "prefab/dialog");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    /// Where the loader finds the panel's prefab.
    pub path: String,
    #[serde(default)]
    pub kind: PanelKind,
    /// Added to every draw order assigned to this panel.
    #[serde(default)]
    pub z_index_base: i64,
}

impl PanelSpec {
    /// A spec with kind `old` and base offset 0.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: PanelKind::default(),
            z_index_base: 0,
        }
    }

    pub fn kind(mut self, kind: PanelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn z_index_base(mut self, z_index_base: i64) -> Self {
        self.z_index_base = z_index_base;
        self
    }
}

/// A live panel: its behavior and the node it is bound to.
pub struct Mounted<P> {
    pub node: NodeRef,
    pub panel: P,
}

/// Per-panel state owned by the panel's actor.
pub struct PanelContext<P: Panel> {
    pub(crate) spec: PanelSpec,
    pub(crate) resource: Option<AssetHandle>,
    pub(crate) instance: Option<Mounted<P>>,
    pub(crate) state: StateGuard<PanelState>,
}

impl<P: Panel> PanelContext<P> {
    pub fn new(spec: PanelSpec) -> Self {
        Self {
            spec,
            resource: None,
            instance: None,
            state: PanelState::guard(),
        }
    }

    pub fn state(&self) -> PanelState {
        self.state.current()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        let node = self.instance.as_ref().map(|mounted| &mounted.node);
        PanelSnapshot {
            state: self.state(),
            kind: self.spec.kind,
            resource_loaded: self.resource.is_some(),
            node_id: node.map(|n| n.id()),
            node_active: node.map(|n| n.is_active()),
            z_index: node.map(|n| n.z_index()),
        }
    }
}

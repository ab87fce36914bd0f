//! In-memory scene graph used by the sample application.
//!
//! [`SceneTree`] plays the engine: it owns a catalog of prefabs (acting as the
//! resource loader, with optional simulated latency), instantiates nodes from
//! them and can report what is currently visible.

use async_trait::async_trait;
use panel_framework::{
    AssetHandle, AssetKind, LoadError, NodeRef, ResourceLoader, SceneError, SceneGraph, SceneNode,
    Size, Vec3,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A node template in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefab {
    pub name: String,
}

#[derive(Debug)]
pub struct TreeNode {
    id: u64,
    name: String,
    parent: Mutex<Option<u64>>,
    position: Mutex<Vec3>,
    size: Mutex<Size>,
    active: AtomicBool,
    z_index: AtomicI64,
    destroyed: AtomicBool,
}

impl TreeNode {
    fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            parent: Mutex::new(None),
            position: Mutex::new(Vec3::ZERO),
            size: Mutex::new(Size::default()),
            active: AtomicBool::new(true),
            z_index: AtomicI64::new(0),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<u64> {
        *self.parent.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn size(&self) -> Size {
        *self.size.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SceneNode for TreeNode {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_parent(&self, parent: &NodeRef) -> Result<(), SceneError> {
        if self.is_destroyed() {
            return Err(SceneError::NodeDestroyed(self.id));
        }
        if parent.is_destroyed() {
            return Err(SceneError::NodeDestroyed(parent.id()));
        }
        *self.parent.lock().unwrap_or_else(|e| e.into_inner()) = Some(parent.id());
        Ok(())
    }

    fn set_position(&self, position: Vec3) {
        *self.position.lock().unwrap_or_else(|e| e.into_inner()) = position;
    }

    fn set_size(&self, size: Size) {
        *self.size.lock().unwrap_or_else(|e| e.into_inner()) = size;
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && !self.is_destroyed()
    }

    fn set_z_index(&self, z_index: i64) {
        self.z_index.store(z_index, Ordering::SeqCst);
    }

    fn z_index(&self) -> i64 {
        self.z_index.load(Ordering::SeqCst)
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// The sample engine: prefab catalog, loader and node factory.
pub struct SceneTree {
    viewport: Size,
    latency: Duration,
    catalog: Mutex<HashMap<String, (AssetKind, Prefab)>>,
    nodes: Mutex<Vec<Arc<TreeNode>>>,
    next_id: AtomicU64,
}

impl SceneTree {
    pub fn new(viewport: Size) -> Arc<Self> {
        Self::with_latency(viewport, Duration::ZERO)
    }

    /// Every load sleeps for `latency` before answering.
    pub fn with_latency(viewport: Size, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            viewport,
            latency,
            catalog: Mutex::new(HashMap::new()),
            nodes: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Adds a prefab to the catalog under `path`.
    pub fn add_prefab(&self, path: &str, name: &str) {
        self.add_asset(path, AssetKind::Prefab, name);
    }

    pub fn add_asset(&self, path: &str, kind: AssetKind, name: &str) {
        self.catalog
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), (kind, Prefab { name: name.to_string() }));
    }

    /// Creates a named node outside the catalog (e.g. the UI root).
    pub fn spawn_node(&self, name: &str) -> Arc<TreeNode> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let node = Arc::new(TreeNode::new(id, name.to_string()));
        self.nodes.lock().unwrap_or_else(|e| e.into_inner()).push(node.clone());
        node
    }

    fn children_of(&self, parent: u64) -> Vec<Arc<TreeNode>> {
        self.nodes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|n| n.parent_id() == Some(parent) && !n.is_destroyed())
            .cloned()
            .collect()
    }

    /// Names of the visible children of `parent`, bottom to top.
    pub fn render_order(&self, parent: u64) -> Vec<String> {
        let mut visible: Vec<_> = self
            .children_of(parent)
            .into_iter()
            .filter(|n| n.is_active())
            .collect();
        visible.sort_by_key(|n| n.z_index());
        visible.into_iter().map(|n| n.name.clone()).collect()
    }

    /// Name of the visible child of `parent` drawn on top.
    pub fn topmost(&self, parent: u64) -> Option<String> {
        self.render_order(parent).pop()
    }

    /// Number of children of `parent` that still exist (visible or hidden).
    pub fn live_children(&self, parent: u64) -> usize {
        self.children_of(parent).len()
    }
}

#[async_trait]
impl ResourceLoader for SceneTree {
    async fn load(&self, path: &str, kind: AssetKind) -> Result<AssetHandle, LoadError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let entry = self
            .catalog
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned();
        let (found, prefab) = entry.ok_or_else(|| LoadError::NotFound(path.to_string()))?;
        if found != kind {
            return Err(LoadError::WrongKind {
                path: path.to_string(),
                expected: kind,
                found,
            });
        }
        Ok(AssetHandle::new(path, kind, prefab))
    }
}

impl SceneGraph for SceneTree {
    fn instantiate(&self, asset: &AssetHandle) -> Result<NodeRef, SceneError> {
        let prefab = asset
            .payload::<Prefab>()
            .ok_or_else(|| SceneError::NotInstantiable(asset.path().to_string()))?;
        Ok(self.spawn_node(&prefab.name))
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

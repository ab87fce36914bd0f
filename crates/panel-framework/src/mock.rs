//! # Mock Scene & Testing Guide
//!
//! [`MockScene`] implements both [`ResourceLoader`] and [`SceneGraph`]
//! entirely in memory, and [`MockNode`] records every mutation the runtime
//! makes. Together they let you test panels and the runtime itself without an
//! engine.
//!
//! ## What the mock gives you
//!
//! | Feature | API |
//! |---------|-----|
//! | **Call counting** | [`MockScene::load_count`], [`MockScene::instantiate_count`] |
//! | **Node inspection** | [`MockScene::node`], [`MockScene::live_nodes`] |
//! | **Error injection** | [`MockScene::fail_load`], [`MockScene::fail_instantiate`] |
//! | **Holding loads** | [`MockScene::gate_loads`] + [`MockScene::release_loads`] |
//!
//! ## Example
//!
//! ```rust
//! use panel_framework::mock::MockScene;
//! use panel_framework::{Panel, PanelRuntime, PanelSpec, NodeRef};
//! use async_trait::async_trait;
//!
//! struct Toast;
//!
//! #[async_trait]
//! impl Panel for Toast {
//!     type Context = ();
//!     type OpenParams = ();
//!     type CloseParams = ();
//!     type Error = std::io::Error;
//!
//!     fn attach(_: &NodeRef, _: &()) -> Result<Self, Self::Error> { Ok(Toast) }
//!     async fn on_open(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let scene = MockScene::new();
//!     let mut runtime = PanelRuntime::new(scene.clone(), scene.clone());
//!     runtime.init(scene.root()).unwrap();
//!     runtime.register::<Toast>(PanelSpec::new("prefab/toast"), ()).unwrap();
//!
//!     runtime.open_panel::<Toast>(()).await.unwrap();
//!     assert_eq!(scene.load_count(), 1);
//!     assert_eq!(scene.live_nodes().len(), 1);
//!
//!     runtime.shutdown().await.unwrap();
//! }
//! ```

use crate::scene::{
    AssetHandle, AssetKind, LoadError, NodeRef, ResourceLoader, SceneError, SceneGraph, SceneNode,
    Size, Vec3,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// The payload of every asset the mock loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPrefab {
    pub path: String,
}

/// A scene node that records what was done to it.
#[derive(Debug)]
pub struct MockNode {
    id: u64,
    prefab: Option<String>,
    parent: Mutex<Option<u64>>,
    position: Mutex<Vec3>,
    size: Mutex<Size>,
    active: AtomicBool,
    z_index: AtomicI64,
    destroyed: AtomicBool,
}

impl MockNode {
    fn new(id: u64, prefab: Option<String>) -> Self {
        Self {
            id,
            prefab,
            parent: Mutex::new(None),
            position: Mutex::new(Vec3::new(1.0, 1.0, 0.0)),
            size: Mutex::new(Size::default()),
            active: AtomicBool::new(true),
            z_index: AtomicI64::new(0),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Path of the prefab this node was instantiated from (`None` for the root).
    pub fn prefab(&self) -> Option<&str> {
        self.prefab.as_deref()
    }

    pub fn parent_id(&self) -> Option<u64> {
        *self.parent.lock().unwrap()
    }

    pub fn position(&self) -> Vec3 {
        *self.position.lock().unwrap()
    }

    pub fn size(&self) -> Size {
        *self.size.lock().unwrap()
    }
}

impl SceneNode for MockNode {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_parent(&self, parent: &NodeRef) -> Result<(), SceneError> {
        if parent.is_destroyed() {
            return Err(SceneError::NodeDestroyed(parent.id()));
        }
        *self.parent.lock().unwrap() = Some(parent.id());
        Ok(())
    }

    fn set_position(&self, position: Vec3) {
        *self.position.lock().unwrap() = position;
    }

    fn set_size(&self, size: Size) {
        *self.size.lock().unwrap() = size;
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn set_z_index(&self, z_index: i64) {
        self.z_index.store(z_index, Ordering::SeqCst);
    }

    fn z_index(&self) -> i64 {
        self.z_index.load(Ordering::SeqCst)
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// In-memory loader and scene graph.
#[derive(Debug)]
pub struct MockScene {
    viewport: Size,
    next_id: AtomicU64,
    nodes: Mutex<Vec<Arc<MockNode>>>,
    loads: Mutex<HashMap<String, usize>>,
    instantiations: AtomicUsize,
    failing_loads: Mutex<HashSet<String>>,
    fail_instantiate: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockScene {
    /// A scene with a 960x640 viewport.
    pub fn new() -> Arc<Self> {
        Self::with_viewport(Size::new(960.0, 640.0))
    }

    pub fn with_viewport(viewport: Size) -> Arc<Self> {
        Arc::new(Self {
            viewport,
            next_id: AtomicU64::new(1),
            nodes: Mutex::new(Vec::new()),
            loads: Mutex::new(HashMap::new()),
            instantiations: AtomicUsize::new(0),
            failing_loads: Mutex::new(HashSet::new()),
            fail_instantiate: AtomicBool::new(false),
            gate: Mutex::new(None),
        })
    }

    fn add_node(&self, prefab: Option<String>) -> Arc<MockNode> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let node = Arc::new(MockNode::new(id, prefab));
        self.nodes.lock().unwrap().push(node.clone());
        node
    }

    /// Creates a fresh root node to use as the panel parent.
    pub fn root(&self) -> NodeRef {
        self.add_node(None)
    }

    pub fn node(&self, id: u64) -> Option<Arc<MockNode>> {
        self.nodes.lock().unwrap().iter().find(|n| n.id == id).cloned()
    }

    /// Nodes instantiated from prefabs that have not been destroyed.
    pub fn live_nodes(&self) -> Vec<Arc<MockNode>> {
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.prefab.is_some() && !n.is_destroyed())
            .cloned()
            .collect()
    }

    /// Total number of `load` calls that reached the loader.
    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().values().sum()
    }

    pub fn load_count_for(&self, path: &str) -> usize {
        self.loads.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn instantiate_count(&self) -> usize {
        self.instantiations.load(Ordering::SeqCst)
    }

    /// Makes every load of `path` fail with [`LoadError::NotFound`].
    pub fn fail_load(&self, path: &str) {
        self.failing_loads.lock().unwrap().insert(path.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_loads.lock().unwrap().clear();
        self.fail_instantiate.store(false, Ordering::SeqCst);
    }

    pub fn fail_instantiate(&self, fail: bool) {
        self.fail_instantiate.store(fail, Ordering::SeqCst);
    }

    /// From now on every load waits for a permit from [`release_loads`](Self::release_loads).
    pub fn gate_loads(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets `count` held (or future) loads through.
    pub fn release_loads(&self, count: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(count);
        }
    }
}

#[async_trait]
impl ResourceLoader for MockScene {
    async fn load(&self, path: &str, kind: AssetKind) -> Result<AssetHandle, LoadError> {
        *self.loads.lock().unwrap().entry(path.to_string()).or_insert(0) += 1;

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| LoadError::Io("load gate closed".into()))?
                .forget();
        }

        if self.failing_loads.lock().unwrap().contains(path) {
            return Err(LoadError::NotFound(path.to_string()));
        }
        Ok(AssetHandle::new(path, kind, MockPrefab { path: path.to_string() }))
    }
}

impl SceneGraph for MockScene {
    fn instantiate(&self, asset: &AssetHandle) -> Result<NodeRef, SceneError> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        if self.fail_instantiate.load(Ordering::SeqCst) {
            return Err(SceneError::Custom("instantiate disabled".into()));
        }
        let prefab = asset
            .payload::<MockPrefab>()
            .ok_or_else(|| SceneError::NotInstantiable(asset.path().to_string()))?;
        Ok(self.add_node(Some(prefab.path.clone())))
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

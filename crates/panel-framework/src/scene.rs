//! # Scene Collaborators
//!
//! The panel runtime does not render anything itself. It sequences calls into
//! an engine through the traits defined here:
//!
//! - [`ResourceLoader`] turns a path into a loaded [`AssetHandle`] (async, fallible).
//! - [`SceneGraph`] instantiates nodes from an asset and reports the viewport size.
//! - [`SceneNode`] is a live node in the tree: parent, position, size, active
//!   flag, draw order and destruction.
//!
//! Nodes use interior mutability (`&self` setters) because engines hand out
//! shared node references; the runtime only ever mutates a node from the actor
//! that owns the panel bound to it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A position in local node space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Width and height of a node or of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The type descriptor passed to the loader alongside a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// A node template that can be instantiated into the scene.
    Prefab,
    Texture,
}

/// A loaded resource.
///
/// The payload is opaque to the runtime; only the engine that produced it
/// knows how to instantiate it. Cloning is cheap (reference counted).
#[derive(Clone)]
pub struct AssetHandle {
    path: Arc<str>,
    kind: AssetKind,
    payload: Arc<dyn Any + Send + Sync>,
}

impl AssetHandle {
    pub fn new<T: Any + Send + Sync>(path: impl Into<Arc<str>>, kind: AssetKind, payload: T) -> Self {
        Self {
            path: path.into(),
            kind,
            payload: Arc::new(payload),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Borrow the engine-specific payload.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Resource loading failures. Propagated to the caller untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("resource '{path}' is a {found:?}, expected {expected:?}")]
    WrongKind {
        path: String,
        expected: AssetKind,
        found: AssetKind,
    },
    #[error("io error: {0}")]
    Io(String),
}

/// Scene graph failures (instantiation and parenting).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("asset '{0}' cannot be instantiated")]
    NotInstantiable(String),
    #[error("node {0} has been destroyed")]
    NodeDestroyed(u64),
    #[error("{0}")]
    Custom(String),
}

/// A live node in the engine's scene tree.
pub trait SceneNode: Send + Sync + fmt::Debug {
    /// Engine-assigned identifier, stable for the node's lifetime.
    fn id(&self) -> u64;

    fn set_parent(&self, parent: &NodeRef) -> Result<(), SceneError>;

    fn set_position(&self, position: Vec3);

    fn set_size(&self, size: Size);

    fn set_active(&self, active: bool);

    fn is_active(&self) -> bool;

    /// Draw order among siblings; higher draws on top.
    fn set_z_index(&self, z_index: i64);

    fn z_index(&self) -> i64;

    /// Removes the node (and its children) from the tree.
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
}

/// Shared reference to a scene node.
pub type NodeRef = Arc<dyn SceneNode>;

/// Node creation side of the engine.
pub trait SceneGraph: Send + Sync {
    /// Creates a fresh, unparented node tree from a loaded asset.
    fn instantiate(&self, asset: &AssetHandle) -> Result<NodeRef, SceneError>;

    /// Current size of the visible area.
    fn viewport(&self) -> Size;
}

/// Asynchronous resource loading side of the engine.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, path: &str, kind: AssetKind) -> Result<AssetHandle, LoadError>;
}

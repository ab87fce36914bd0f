//! # Framework Errors
//!
//! This module defines the error types used throughout the panel framework.
//! A guard-rejected transition is **not** an error: it is reported as
//! [`Transition::Rejected`](crate::message::Transition::Rejected). Everything
//! here is a genuine failure scoped to a single panel operation.

use crate::scene::{LoadError, SceneError};
use std::fmt;

/// The lifecycle hook (or constructor) that produced a [`PanelError::Hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Attach,
    Create,
    Open,
    Close,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookKind::Attach => "attach",
            HookKind::Create => "on_create",
            HookKind::Open => "on_open",
            HookKind::Close => "on_close",
        };
        f.write_str(name)
    }
}

/// Errors that can occur within the panel framework.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Panel not registered: {0}")]
    NotRegistered(String),
    #[error("Panel already registered: {0}")]
    AlreadyRegistered(String),
    #[error("Panel runtime not initialized (no parent node)")]
    NotInitialized,
    #[error("Panel runtime already initialized")]
    AlreadyInitialized,
    #[error("Invalid runtime config: {0}")]
    InvalidConfig(String),
    #[error("Failed to load '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("{panel}::{hook} failed: {source}")]
    Hook {
        panel: String,
        hook: HookKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{panel}: draw order {order} plus base {base} overflows the z-index")]
    ZIndexOverflow { panel: String, order: i64, base: i64 },
    #[error("Panel actor closed")]
    ActorClosed,
    #[error("Panel actor dropped response channel")]
    ActorDropped,
    #[error("Shutdown failed: {0}")]
    ShutdownFailed(String),
}

impl PanelError {
    pub(crate) fn hook<E>(panel: impl Into<String>, hook: HookKind, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PanelError::Hook {
            panel: panel.into(),
            hook,
            source: Box::new(source),
        }
    }

    /// Returns the hook that failed, if this is a hook failure.
    pub fn failed_hook(&self) -> Option<HookKind> {
        match self {
            PanelError::Hook { hook, .. } => Some(*hook),
            _ => None,
        }
    }
}
